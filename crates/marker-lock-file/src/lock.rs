//! Marker-based advisory lock implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use marker_lock_core::error::{LockError, LockResult};
use marker_lock_core::options::LockOptions;
use marker_lock_core::outcome::{AcquireOutcome, LockStatus, ReleaseOutcome};
use marker_lock_core::traits::AdvisoryLock;
use tokio::time::Instant;
use tracing::{Span, debug, info, instrument, warn};

use crate::backoff::Backoff;
use crate::marker::{self, MarkerStamp};

/// Consecutive "marker vanished before we could inspect it" retries allowed
/// before the loop backs off like ordinary contention.
const MAX_VANISHED_RETRIES: u32 = 16;

/// An advisory lock on one resource, held by the existence of
/// `<resource>.lock`.
///
/// The value only carries paths and options; every operation goes to the
/// filesystem, so independent processes sharing the storage see one lock.
#[derive(Debug, Clone)]
pub struct MarkerLock {
    /// Resource being locked. Never read or written.
    resource: PathBuf,
    /// Marker whose existence means "locked".
    marker: PathBuf,
    /// Resource file name, for details and logs.
    name: String,
    options: LockOptions,
}

/// States of one acquire call.
#[derive(Debug)]
enum State {
    Try,
    InspectStale,
    Hijack(MarkerStamp),
    Backoff,
    Done(LockResult<Acquisition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquisition {
    Created,
    Hijacked,
}

/// Result of replacing a stale marker.
#[derive(Debug, PartialEq, Eq)]
enum Hijack {
    Won,
    /// Someone else replaced or recreated the marker first.
    Lost,
}

impl MarkerLock {
    /// Creates a lock for the resource at `resource`.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidResource` if the path is not absolute or has
    /// no file name, and `LockError::InvalidOptions` if the backoff range is
    /// unusable.
    pub fn from_path(resource: impl Into<PathBuf>, options: LockOptions) -> LockResult<Self> {
        options.validate()?;
        let resource = resource.into();
        let marker = marker::marker_path(&resource)?;
        let name = resource
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            resource,
            marker,
            name,
            options,
        })
    }

    /// Returns the path of the lock marker.
    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    /// Runs the acquire state machine. With `budget == None` the call makes a
    /// single pass and reports contention instead of sleeping.
    async fn run(&self, budget: Option<Duration>) -> AcquireOutcome {
        let start = Instant::now();
        let mut backoff = budget.map(|budget| Backoff::new(&self.options, budget));
        let mut vanished = 0u32;
        let mut fault: Option<LockError> = None;
        let mut state = State::Try;

        loop {
            state = match state {
                State::Try => match marker::create(&self.resource, &self.marker) {
                    Ok(()) => State::Done(Ok(Acquisition::Created)),
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => State::InspectStale,
                    Err(e) => State::Done(Err(LockError::Marker {
                        path: self.marker.clone(),
                        source: e,
                    })),
                },
                State::InspectStale => match marker::inspect(&self.marker) {
                    Ok(stamp) => {
                        vanished = 0;
                        fault = None;
                        let age = stamp.age(SystemTime::now());
                        if age > self.options.stale_after {
                            warn!(
                                age_secs = age.as_secs(),
                                stale_after_secs = self.options.stale_after.as_secs(),
                                "breaking stale lock"
                            );
                            State::Hijack(stamp)
                        } else {
                            debug!(age_ms = age.as_millis() as u64, "lock is held");
                            State::Backoff
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        vanished += 1;
                        if vanished <= MAX_VANISHED_RETRIES {
                            State::Try
                        } else {
                            State::Backoff
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "cannot inspect existing lock marker");
                        fault = Some(LockError::Inspect {
                            name: self.name.clone(),
                            source: e,
                        });
                        State::Backoff
                    }
                },
                State::Hijack(stamp) => match self.hijack(&stamp) {
                    Ok(Hijack::Won) => State::Done(Ok(Acquisition::Hijacked)),
                    Ok(Hijack::Lost) => {
                        debug!("lost race for stale lock");
                        State::Try
                    }
                    Err(e) => State::Done(Err(LockError::HijackFailed {
                        name: self.name.clone(),
                        source: e,
                    })),
                },
                State::Backoff => {
                    let delay = backoff
                        .as_mut()
                        .and_then(|b| b.next_delay(&mut rand::thread_rng()));
                    match delay {
                        Some(delay) => {
                            tokio::time::sleep(delay).await;
                            State::Try
                        }
                        None => {
                            let error = self.give_up(backoff.as_ref(), fault.take(), start);
                            State::Done(Err(error))
                        }
                    }
                }
                State::Done(result) => return self.finish(result, backoff.as_ref(), start),
            };
        }
    }

    /// Deletes the stale marker described by `observed` and creates a fresh
    /// one.
    ///
    /// Delete and create are two steps. The marker is re-read first and left
    /// alone if it is no longer the one that was aged; if another caller
    /// creates a marker between our delete and create, our create fails and
    /// the hijack is lost.
    fn hijack(&self, observed: &MarkerStamp) -> std::io::Result<Hijack> {
        match marker::inspect(&self.marker) {
            Ok(current) if current != *observed => return Ok(Hijack::Lost),
            Ok(_) => match marker::remove(&self.marker) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        match marker::create(&self.resource, &self.marker) {
            Ok(()) => Ok(Hijack::Won),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Hijack::Lost),
            Err(e) => Err(e),
        }
    }

    fn give_up(
        &self,
        backoff: Option<&Backoff>,
        fault: Option<LockError>,
        start: Instant,
    ) -> LockError {
        match (backoff, fault) {
            // A pending inspection fault replaces the timeout detail.
            (_, Some(fault)) => fault,
            (Some(_), None) => LockError::Timeout {
                name: self.name.clone(),
                waited: start.elapsed(),
            },
            (None, None) => LockError::AlreadyLocked {
                name: self.name.clone(),
            },
        }
    }

    fn finish(
        &self,
        result: LockResult<Acquisition>,
        backoff: Option<&Backoff>,
        start: Instant,
    ) -> AcquireOutcome {
        let slept = backoff.is_some_and(|b| !b.waited().is_zero());
        let waited = if slept { start.elapsed() } else { Duration::ZERO };
        let span = Span::current();
        span.record("elapsed_ms", waited.as_millis() as u64);

        match result {
            Ok(acquisition) => {
                let hijacked = acquisition == Acquisition::Hijacked;
                span.record("acquired", true);
                span.record("hijacked", hijacked);
                if hijacked {
                    info!(waited_ms = waited.as_millis() as u64, "took over stale lock");
                } else if slept {
                    info!(waited_ms = waited.as_millis() as u64, "lock acquired after waiting");
                }
                AcquireOutcome::acquired(waited, hijacked)
            }
            Err(e) => {
                span.record("acquired", false);
                span.record("error", e.to_string());
                if matches!(e, LockError::Timeout { .. }) {
                    info!("{e}");
                }
                AcquireOutcome::failed(waited, &e)
            }
        }
    }
}

impl AdvisoryLock for MarkerLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> &Path {
        &self.resource
    }

    #[instrument(
        skip(self),
        fields(
            lock.name = %self.name,
            lock.path = %self.marker.display(),
            backend = "file",
            acquired = tracing::field::Empty,
            hijacked = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
            error = tracing::field::Empty
        )
    )]
    async fn acquire(&self, max_wait: Option<Duration>) -> AcquireOutcome {
        self.run(Some(max_wait.unwrap_or(self.options.max_wait))).await
    }

    #[instrument(
        skip(self),
        fields(
            lock.name = %self.name,
            lock.path = %self.marker.display(),
            backend = "file",
            acquired = tracing::field::Empty,
            hijacked = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
            error = tracing::field::Empty
        )
    )]
    async fn try_acquire(&self) -> AcquireOutcome {
        self.run(None).await
    }

    #[instrument(
        skip(self),
        fields(lock.name = %self.name, lock.path = %self.marker.display(), backend = "file")
    )]
    async fn release(&self) -> ReleaseOutcome {
        match marker::remove(&self.marker) {
            Ok(()) => {
                info!("lock released");
                ReleaseOutcome::released()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ReleaseOutcome::failed(&LockError::NotLocked {
                    name: self.name.clone(),
                })
            }
            Err(e) => {
                let err = LockError::Marker {
                    path: self.marker.clone(),
                    source: e,
                };
                warn!(error = %err, "cannot release lock");
                ReleaseOutcome::failed(&err)
            }
        }
    }

    fn status(&self) -> LockStatus {
        LockStatus {
            locked: marker::exists(&self.marker),
        }
    }
}
