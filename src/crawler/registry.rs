//! Visited registry: the exactly-once gate in front of every fetch
//!
//! The visited set and the ordered result list live behind one mutex so that
//! a successful insertion and the matching append happen as a single step.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
struct RegistryState {
    /// Every URL that has been claimed by a caller
    visited: HashSet<String>,

    /// The same URLs, in the order they were first claimed
    results: Vec<String>,
}

/// Concurrency-safe set of visited URLs with exactly-once insertion
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    state: Mutex<RegistryState>,
}

impl VisitedRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL
    ///
    /// Returns `true` iff this call inserted the URL, in which case the caller
    /// owns scheduling the fetch for it. Every other caller, concurrent or
    /// later, gets `false` for the same URL.
    pub fn try_visit(&self, url: &Url) -> bool {
        let mut state = self.lock();
        if state.visited.contains(url.as_str()) {
            return false;
        }

        state.visited.insert(url.as_str().to_string());
        state.results.push(url.as_str().to_string());
        true
    }

    /// Returns true if the URL has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the result list in discovery order
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().results.clone()
    }

    /// Consumes the registry, returning the result list in discovery order
    pub fn into_results(self) -> Vec<String> {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .results
    }

    // A panic while holding the lock cannot leave the two collections out of
    // step (the push follows the insert with nothing fallible in between), so
    // poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
