//! Claim protocol: peek a `NEW` record, then try to take it
//!
//! Contention is resolved entirely by the store's conditional update. A
//! lost race is not an error; the loser simply peeks again and may land
//! on a different candidate.

use crate::storage::{QueueStore, QueuedUrl, StoreResult};

/// Result of asking the queue for the next URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The record is now `PROCESSING` and owned by the caller
    Claimed { url: QueuedUrl, lost_races: u32 },

    /// No `NEW` record was left
    QueueEmpty { lost_races: u32 },
}

impl ClaimOutcome {
    /// Number of candidates another worker took first
    pub fn lost_races(&self) -> u32 {
        match self {
            Self::Claimed { lost_races, .. } | Self::QueueEmpty { lost_races } => *lost_races,
        }
    }

    /// Returns the claimed URL, if any
    pub fn into_claimed(self) -> Option<QueuedUrl> {
        match self {
            Self::Claimed { url, .. } => Some(url),
            Self::QueueEmpty { .. } => None,
        }
    }
}

/// Produces the next URL this worker exclusively owns
///
/// # Algorithm
///
/// 1. `peek_next()`; if nothing is `NEW`, report `QueueEmpty`
/// 2. `claim(id)` on the candidate
/// 3. On a lost race go back to 1
/// 4. On success hand the record to the caller
///
/// Store errors are returned as-is; the caller decides how to back off.
pub fn claim_next<S: QueueStore + ?Sized>(store: &S) -> StoreResult<ClaimOutcome> {
    let mut lost_races = 0;

    loop {
        let candidate = match store.peek_next()? {
            Some(candidate) => candidate,
            None => return Ok(ClaimOutcome::QueueEmpty { lost_races }),
        };

        if store.claim(candidate.id)? {
            return Ok(ClaimOutcome::Claimed {
                url: candidate,
                lost_races,
            });
        }

        tracing::debug!(
            "{}: '{}' already taken by another worker",
            candidate.id,
            candidate.url
        );
        lost_races += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UrlStatus;
    use crate::storage::{SqliteQueue, StoreError, UrlRecord};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Store double replaying scripted peek and claim answers
    #[derive(Default)]
    struct ScriptedStore {
        peeks: Mutex<VecDeque<Option<QueuedUrl>>>,
        claims: Mutex<VecDeque<bool>>,
        claim_calls: AtomicUsize,
        unavailable: bool,
    }

    impl ScriptedStore {
        fn new(peeks: Vec<Option<QueuedUrl>>, claims: Vec<bool>) -> Self {
            Self {
                peeks: Mutex::new(peeks.into()),
                claims: Mutex::new(claims.into()),
                ..Default::default()
            }
        }
    }

    impl QueueStore for ScriptedStore {
        fn peek_next(&self) -> StoreResult<Option<QueuedUrl>> {
            if self.unavailable {
                return Err(StoreError::Unavailable("database is locked".to_string()));
            }
            Ok(self.peeks.lock().unwrap().pop_front().flatten())
        }

        fn claim(&self, _id: i64) -> StoreResult<bool> {
            self.claim_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.claims.lock().unwrap().pop_front().unwrap_or(false))
        }

        fn mark_done(&self, _id: i64, _http_code: u16) -> StoreResult<()> {
            unimplemented!()
        }

        fn mark_error(&self, _id: i64) -> StoreResult<()> {
            unimplemented!()
        }

        fn reset(&self) -> StoreResult<()> {
            unimplemented!()
        }

        fn insert_urls(&self, _urls: &[String]) -> StoreResult<usize> {
            unimplemented!()
        }

        fn get_record(&self, id: i64) -> StoreResult<UrlRecord> {
            Err(StoreError::NotFound(id))
        }

        fn list_records(&self) -> StoreResult<Vec<UrlRecord>> {
            Ok(Vec::new())
        }

        fn count_by_status(&self, _status: UrlStatus) -> StoreResult<u64> {
            Ok(0)
        }
    }

    /// Wraps a real store and counts claim outcomes
    struct CountingStore<S> {
        inner: S,
        claim_calls: AtomicUsize,
        claim_wins: AtomicUsize,
    }

    impl<S: QueueStore> QueueStore for CountingStore<S> {
        fn peek_next(&self) -> StoreResult<Option<QueuedUrl>> {
            self.inner.peek_next()
        }

        fn claim(&self, id: i64) -> StoreResult<bool> {
            self.claim_calls.fetch_add(1, Ordering::SeqCst);
            let won = self.inner.claim(id)?;
            if won {
                self.claim_wins.fetch_add(1, Ordering::SeqCst);
            }
            Ok(won)
        }

        fn mark_done(&self, id: i64, http_code: u16) -> StoreResult<()> {
            self.inner.mark_done(id, http_code)
        }

        fn mark_error(&self, id: i64) -> StoreResult<()> {
            self.inner.mark_error(id)
        }

        fn reset(&self) -> StoreResult<()> {
            self.inner.reset()
        }

        fn insert_urls(&self, urls: &[String]) -> StoreResult<usize> {
            self.inner.insert_urls(urls)
        }

        fn get_record(&self, id: i64) -> StoreResult<UrlRecord> {
            self.inner.get_record(id)
        }

        fn list_records(&self) -> StoreResult<Vec<UrlRecord>> {
            self.inner.list_records()
        }

        fn count_by_status(&self, status: UrlStatus) -> StoreResult<u64> {
            self.inner.count_by_status(status)
        }
    }

    fn queued(id: i64, url: &str) -> QueuedUrl {
        QueuedUrl {
            id,
            url: url.to_string(),
        }
    }

    #[test]
    fn test_empty_queue() {
        let store = ScriptedStore::new(vec![None], vec![]);
        let outcome = claim_next(&store).unwrap();
        assert_eq!(outcome, ClaimOutcome::QueueEmpty { lost_races: 0 });
        assert_eq!(store.claim_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_claims_first_candidate() {
        let store = ScriptedStore::new(vec![Some(queued(1, "a.com"))], vec![true]);
        let outcome = claim_next(&store).unwrap();
        assert_eq!(outcome.lost_races(), 0);
        assert_eq!(outcome.into_claimed(), Some(queued(1, "a.com")));
    }

    #[test]
    fn test_lost_race_repolls() {
        let store = ScriptedStore::new(
            vec![Some(queued(1, "a.com")), Some(queued(2, "b.com"))],
            vec![false, true],
        );

        let outcome = claim_next(&store).unwrap();

        assert_eq!(
            outcome,
            ClaimOutcome::Claimed {
                url: queued(2, "b.com"),
                lost_races: 1
            }
        );
        assert_eq!(store.claim_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lost_race_then_empty() {
        let store = ScriptedStore::new(vec![Some(queued(1, "a.com")), None], vec![false]);
        let outcome = claim_next(&store).unwrap();
        assert_eq!(outcome, ClaimOutcome::QueueEmpty { lost_races: 1 });
    }

    #[test]
    fn test_store_unavailable_propagates() {
        let store = ScriptedStore {
            unavailable: true,
            ..Default::default()
        };
        let err = claim_next(&store).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_two_workers_race_for_one_record() {
        let dir = TempDir::new().unwrap();
        let inner =
            SqliteQueue::new(&dir.path().join("urls.sqlite3"), Duration::from_secs(20)).unwrap();
        inner.insert_urls(&["only.com".to_string()]).unwrap();
        let store = Arc::new(CountingStore {
            inner,
            claim_calls: AtomicUsize::new(0),
            claim_wins: AtomicUsize::new(0),
        });

        // Both workers see the same candidate before either claims it
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let candidate = store.peek_next().unwrap().unwrap();
                    barrier.wait();
                    store.claim(candidate.id).unwrap()
                })
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(store.claim_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.claim_wins.load(Ordering::SeqCst), 1);
        assert_eq!(results.iter().filter(|won| **won).count(), 1);

        // The loser's next poll finds nothing left
        let outcome = claim_next(store.as_ref()).unwrap();
        assert_eq!(outcome, ClaimOutcome::QueueEmpty { lost_races: 0 });
    }
}
