//! Thread-safe record of filenames handled during this run
//!
//! The `ProcessedSet` guards the file processor against running the same
//! filename twice. It is backed by a `DashMap` so that the membership check and
//! the claim happen in a single entry operation: two triggers that deliver the
//! same filename at the same time cannot both get past the check.
//!
//! # Lifecycle
//!
//! ```text
//! absent ──try_claim──> InFlight ──commit──> Processed (never removed)
//!                          │
//!                          └──drop without commit──> absent
//! ```
//!
//! Nothing is persisted; a restart starts from an empty set.

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    InFlight,
    Processed,
}

/// Filenames claimed or fully processed by this process instance
#[derive(Debug, Default)]
pub struct ProcessedSet {
    files: DashMap<String, FileState>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
        }
    }

    /// Whether the filename has been fully processed
    pub fn contains(&self, filename: &str) -> bool {
        self.files
            .get(filename)
            .is_some_and(|state| *state == FileState::Processed)
    }

    /// Whether the filename is currently being processed
    pub fn is_in_flight(&self, filename: &str) -> bool {
        self.files
            .get(filename)
            .is_some_and(|state| *state == FileState::InFlight)
    }

    /// Record a filename as processed without running it
    pub fn mark_processed(&self, filename: &str) {
        self.files.insert(filename.to_string(), FileState::Processed);
    }

    /// Claim a filename for processing
    ///
    /// Returns `None` when the filename is already processed or claimed by
    /// another caller. The returned claim releases the filename when dropped
    /// unless [`Claim::commit`] was called.
    pub fn try_claim(&self, filename: &str) -> Option<Claim<'_>> {
        let mut claimed = false;
        self.files
            .entry(filename.to_string())
            .or_insert_with(|| {
                claimed = true;
                FileState::InFlight
            });

        claimed.then(|| Claim {
            set: self,
            filename: filename.to_string(),
            committed: false,
        })
    }
}

/// Exclusive hold on one filename while it is processed
#[derive(Debug)]
pub struct Claim<'a> {
    set: &'a ProcessedSet,
    filename: String,
    committed: bool,
}

impl Claim<'_> {
    /// Mark the claimed filename as processed for the rest of the run
    pub fn commit(mut self) {
        self.set
            .files
            .insert(self.filename.clone(), FileState::Processed);
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.set
                .files
                .remove_if(&self.filename, |_, state| *state == FileState::InFlight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_new_set_is_empty() {
        let set = ProcessedSet::new();
        assert!(!set.contains("a.csv"));
        assert!(!set.is_in_flight("a.csv"));
    }

    #[test]
    fn test_commit_marks_processed() {
        let set = ProcessedSet::new();

        let claim = set.try_claim("a.csv").unwrap();
        assert!(set.is_in_flight("a.csv"));
        assert!(!set.contains("a.csv"));

        claim.commit();
        assert!(set.contains("a.csv"));
        assert!(!set.is_in_flight("a.csv"));
        assert!(!set.contains("b.csv"));
    }

    #[test]
    fn test_dropped_claim_releases_filename() {
        let set = ProcessedSet::new();

        {
            let _claim = set.try_claim("a.csv").unwrap();
            assert!(set.try_claim("a.csv").is_none());
        }

        assert!(!set.contains("a.csv"));
        assert!(!set.is_in_flight("a.csv"));
        assert!(set.try_claim("a.csv").is_some());
    }

    #[test]
    fn test_processed_filename_cannot_be_claimed() {
        let set = ProcessedSet::new();
        set.mark_processed("a.csv");

        assert!(set.try_claim("a.csv").is_none());
        assert!(set.try_claim("b.csv").is_some());
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let set = Arc::new(ProcessedSet::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let set = Arc::clone(&set);
                let winners = Arc::clone(&winners);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if let Some(claim) = set.try_claim("race.csv") {
                        winners.fetch_add(1, Ordering::SeqCst);
                        claim.commit();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(set.contains("race.csv"));
    }
}
