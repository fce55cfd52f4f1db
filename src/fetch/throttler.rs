use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

const LOG_TARGET: &str = " throttler";

/// Bounds how many API requests are in flight and holds new ones back while rate limited.
///
/// Call [`Throttler::acquire`] before each unit of work and hold the permit until it
/// finishes. Any task that sees a rate-limit response can call [`Throttler::pause_until`]
/// to stop new work from starting until the limit resets. Overlapping pauses keep the
/// one that ends last.
#[derive(Debug)]
pub struct Throttler {
    semaphore: Arc<Semaphore>,
    paused: AtomicBool,
    resume: Notify,
    resume_at: Mutex<Option<Instant>>,
    max_pause: Duration,
}

impl Throttler {
    /// Pauses shorter than this over an active one are ignored.
    const MIN_PAUSE_EXTENSION: Duration = Duration::from_secs(1);

    /// Create a throttler allowing `max_concurrent` tasks at once; no single pause lasts longer than `max_pause`.
    #[must_use]
    pub fn new(max_concurrent: usize, max_pause: Duration) -> Arc<Self> {
        Arc::new(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            paused: AtomicBool::new(false),
            resume: Notify::new(),
            resume_at: Mutex::new(None),
            max_pause,
        })
    }

    /// Wait until unpaused, then acquire a concurrency slot.
    ///
    /// Returns `None` only if the throttler has been shut down.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        loop {
            if self.paused.load(Ordering::Acquire) {
                self.resume.notified().await;
                continue;
            }

            return Arc::clone(&self.semaphore).acquire_owned().await.ok();
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause dispatch until a rate limit resets, capped at the configured maximum.
    ///
    /// Returns `true` if a new pause was established.
    pub fn pause_until(self: &Arc<Self>, reset_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let wait = (reset_at - now).to_std().unwrap_or(Duration::ZERO).min(self.max_pause);
        if wait.is_zero() {
            return false;
        }

        log::info!(target: LOG_TARGET, "Rate limited, holding new requests for {}s", wait.as_secs());
        self.pause_for(wait)
    }

    /// Pause dispatching for `duration`, then automatically resume.
    ///
    /// Running tasks are not interrupted. Returns `true` only when a new pause is established.
    pub fn pause_for(self: &Arc<Self>, duration: Duration) -> bool {
        let new_resume_at = Instant::now() + duration;

        {
            let Ok(mut guard) = self.resume_at.lock() else {
                return false;
            };
            if guard.is_some_and(|existing| existing + Self::MIN_PAUSE_EXTENSION >= new_resume_at) {
                return false;
            }
            *guard = Some(new_resume_at);
        }

        self.paused.store(true, Ordering::Release);
        let this = Arc::clone(self);
        drop(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let should_resume = this.resume_at.lock().is_ok_and(|mut guard| {
                if guard.is_some_and(|t| Instant::now() >= t) {
                    *guard = None;
                    true
                } else {
                    false
                }
            });

            if should_resume {
                this.paused.store(false, Ordering::Release);
                this.resume.notify_waiters();
            }
        }));

        true
    }
}
