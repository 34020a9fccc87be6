//! In-process login item service.
//!
//! Behaves like the user launchd domain for a single app: enabling a helper
//! adds (or re-enables) exactly one job, disabling removes it. Mutations can be
//! made to fail so callers can exercise their error paths without touching
//! the real OS registry, and the next listing can be paused to interleave it
//! with work on another thread.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use super::{JobEntry, LoginItemService};
use crate::error::LoginItemError;
use crate::identifier::HelperIdentifier;

#[derive(Debug, Default)]
struct Inner {
    jobs: Vec<JobEntry>,
    /// When true, `jobs()` returns `None` as if the platform returned nothing.
    listing_unavailable: bool,
    fail_mutations: bool,
    mutation_count: usize,
}

/// Signals that a listing was taken, then waits to be released.
type ListingPause = (Sender<()>, Receiver<()>);

/// Login item registry held in memory.
#[derive(Debug, Default)]
pub struct InMemoryService {
    inner: Mutex<Inner>,
    pause: Mutex<Option<ListingPause>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given jobs already registered.
    pub fn with_jobs(jobs: Vec<JobEntry>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs,
                ..Inner::default()
            }),
            pause: Mutex::new(None),
        }
    }

    /// Makes every subsequent `set_enabled` call fail (or succeed again).
    pub fn set_fail_mutations(&self, fail: bool) {
        self.lock().fail_mutations = fail;
    }

    /// Makes `jobs()` return `None`.
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.lock().listing_unavailable = unavailable;
    }

    /// Pauses the next `jobs()` call after it has copied the registry: it sends
    /// on `listed`, then blocks until `release` receives (or its sender is
    /// dropped). The registry itself stays unlocked while paused.
    pub fn pause_next_listing(&self, listed: Sender<()>, release: Receiver<()>) {
        *self.pause.lock().unwrap_or_else(PoisonError::into_inner) = Some((listed, release));
    }

    /// Number of jobs labelled `identifier`.
    pub fn entry_count(&self, identifier: &HelperIdentifier) -> usize {
        self.lock()
            .jobs
            .iter()
            .filter(|job| job.label == identifier.as_str())
            .count()
    }

    /// Number of `set_enabled` calls that reached the registry, failed or not.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutation_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LoginItemService for InMemoryService {
    fn jobs(&self) -> Option<Vec<JobEntry>> {
        let listing = {
            let inner = self.lock();
            (!inner.listing_unavailable).then(|| inner.jobs.clone())
        };

        let pause = self
            .pause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((listed, release)) = pause {
            let _ = listed.send(());
            let _ = release.recv();
        }

        listing
    }

    fn set_enabled(
        &self,
        identifier: &HelperIdentifier,
        enabled: bool,
    ) -> Result<(), LoginItemError> {
        let mut inner = self.lock();
        inner.mutation_count += 1;

        if inner.fail_mutations {
            return Err(LoginItemError::Registration {
                identifier: identifier.to_string(),
                enabled,
            });
        }

        if enabled {
            match inner
                .jobs
                .iter_mut()
                .find(|job| job.label == identifier.as_str())
            {
                Some(job) => job.on_demand = true,
                None => inner.jobs.push(JobEntry::new(identifier.as_str(), true)),
            }
        } else {
            inner.jobs.retain(|job| job.label != identifier.as_str());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
