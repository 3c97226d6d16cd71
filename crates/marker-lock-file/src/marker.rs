//! Lock marker naming and the filesystem primitives acting on markers.
//!
//! A marker lives next to its resource as `<resource>.lock`. On Unix it is a
//! symbolic link to the resource; `symlink(2)` refuses to replace an existing
//! entry, which makes creation the atomic create-if-absent step everything
//! else relies on. Elsewhere it is an empty file opened with create-new.
//! Markers are always inspected without following them.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use marker_lock_core::error::{LockError, LockResult};

/// Suffix appended to the resource file name.
pub const MARKER_EXTENSION: &str = "lock";

/// Returns the marker path for `resource`.
///
/// # Errors
///
/// The resource must be an absolute path ending in a file name.
pub fn marker_path(resource: &Path) -> LockResult<PathBuf> {
    if !resource.is_absolute() {
        return Err(LockError::InvalidResource(format!(
            "'{}' is not absolute",
            resource.display()
        )));
    }

    let file_name = resource.file_name().ok_or_else(|| {
        LockError::InvalidResource(format!("'{}' has no file name", resource.display()))
    })?;

    let mut marker_name = OsString::with_capacity(file_name.len() + MARKER_EXTENSION.len() + 1);
    marker_name.push(file_name);
    marker_name.push(".");
    marker_name.push(MARKER_EXTENSION);
    Ok(resource.with_file_name(marker_name))
}

/// What an inspection saw of a marker.
///
/// Two stamps compare equal only if they describe the same marker object,
/// which is how a hijacker makes sure it is about to delete the marker it
/// aged rather than a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MarkerStamp {
    modified: SystemTime,
    #[cfg(unix)]
    inode: (u64, u64),
}

impl MarkerStamp {
    /// Age of the marker; zero if its timestamp lies in the future.
    pub(crate) fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.modified).unwrap_or(Duration::ZERO)
    }
}

/// Creates the marker, failing with `AlreadyExists` if one is present.
#[cfg(unix)]
pub(crate) fn create(resource: &Path, marker: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(resource, marker)
}

/// Creates the marker, failing with `AlreadyExists` if one is present.
#[cfg(not(unix))]
pub(crate) fn create(_resource: &Path, marker: &Path) -> io::Result<()> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(marker)
        .map(drop)
}

/// Reads the marker's own metadata.
pub(crate) fn inspect(marker: &Path) -> io::Result<MarkerStamp> {
    let metadata = std::fs::symlink_metadata(marker)?;
    Ok(MarkerStamp {
        modified: metadata.modified()?,
        #[cfg(unix)]
        inode: {
            use std::os::unix::fs::MetadataExt;
            (metadata.dev(), metadata.ino())
        },
    })
}

/// Deletes the marker.
pub(crate) fn remove(marker: &Path) -> io::Result<()> {
    std::fs::remove_file(marker)
}

/// Whether a marker is present, dangling or not.
pub(crate) fn exists(marker: &Path) -> bool {
    std::fs::symlink_metadata(marker).is_ok()
}
