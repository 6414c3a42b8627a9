//! Per-key call de-duplication.
//!
//! Concurrent callers of [`Group::work`] with the same key share one execution
//! of the work future and all receive a clone of its output.
//!
//! Each in-flight key maps to a `tokio::sync::OnceCell`. The first caller to
//! poll the cell runs the work; the others wait on the cell. If the running
//! caller is dropped before finishing, the cell stays empty and one of the
//! waiting callers runs the work instead, so a cancelled caller never fails
//! the callers that joined it. A key whose callers have all been dropped is
//! removed from the registry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::OnceCell;

/// Output of [`Group::work`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    /// `true` if another caller's execution produced the value.
    pub shared: bool,
}

/// One in-flight call and the number of callers attached to it.
#[derive(Debug)]
struct Call<T> {
    cell: Arc<OnceCell<T>>,
    callers: usize,
}

/// Registry of in-flight calls.
#[derive(Debug)]
pub struct Group<K, T> {
    calls: Mutex<HashMap<K, Call<T>>>,
}

impl<K, T> Default for Group<K, T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

/// A caller's attachment to an in-flight call. Detaches on drop, including
/// when the caller is cancelled or the work panics.
struct Registration<'a, K, T>
where
    K: Eq + Hash,
{
    group: &'a Group<K, T>,
    key: K,
    cell: Arc<OnceCell<T>>,
}

impl<K, T> Drop for Registration<'_, K, T>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.group.release(&self.key, &self.cell);
    }
}

impl<K, T> Group<K, T>
where
    K: Eq + Hash,
{
    /// Detaches one caller from `cell`.
    ///
    /// The key is removed once the call has produced a value or once no
    /// caller is left to run it. While a joiner remains on an empty cell the
    /// key stays, so that joiner can take the call over.
    fn release(&self, key: &K, cell: &Arc<OnceCell<T>>) {
        let mut calls = self.calls.lock();
        let Some(call) = calls.get_mut(key) else {
            return;
        };
        if !Arc::ptr_eq(&call.cell, cell) {
            return;
        }
        call.callers = call.callers.saturating_sub(1);
        if call.callers == 0 || call.cell.initialized() {
            calls.remove(key);
        }
    }

    /// Number of keys with a call in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<K, T> Group<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` unless a call for `key` is already in flight, in which case
    /// waits for that call and returns its output.
    ///
    /// The key is deregistered as soon as the call completes, or when every
    /// caller waiting on it has been dropped; a later call with the same key
    /// runs `work` again.
    pub async fn work<F, Fut>(&self, key: K, work: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let registration = {
            let mut calls = self.calls.lock();
            let call = calls.entry(key.clone()).or_insert_with(|| Call {
                cell: Arc::new(OnceCell::new()),
                callers: 0,
            });
            call.callers += 1;
            Registration {
                group: self,
                key,
                cell: Arc::clone(&call.cell),
            }
        };

        let executed = AtomicBool::new(false);
        let value = registration
            .cell
            .get_or_init(|| {
                executed.store(true, Ordering::Relaxed);
                work()
            })
            .await
            .clone();
        drop(registration);

        Outcome {
            value,
            shared: !executed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_one_execution() {
        let group = Arc::new(Group::<u64, u64>::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let group = Arc::clone(&group);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                group
                    .work(7, || async {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        42
                    })
                    .await
            }));
        }

        let mut shared = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            assert_eq!(outcome.value, 42);
            if outcome.shared {
                shared += 1;
            }
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(shared, 9);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_run_again() {
        let group = Group::<&str, u32>::new();
        let first = group.work("k", || async { 1 }).await;
        let second = group.work("k", || async { 2 }).await;
        assert_eq!(first.value, 1);
        assert_eq!(second.value, 2);
        assert!(!first.shared);
        assert!(!second.shared);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_share() {
        let group = Group::<u64, u64>::new();
        let (a, b) = tokio::join!(
            group.work(1, || async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                10
            }),
            group.work(2, || async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                20
            }),
        );
        assert_eq!((a.value, b.value), (10, 20));
        assert!(!a.shared && !b.shared);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_joiner_takes_over_when_runner_is_cancelled() {
        let group = Arc::new(Group::<u64, &'static str>::new());

        let runner = {
            let group = Arc::clone(&group);
            tokio::spawn(async move {
                group
                    .work(1, || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        "runner"
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let joiner = {
            let group = Arc::clone(&group);
            tokio::spawn(async move { group.work(1, || async { "joiner" }).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        runner.abort();
        let outcome = tokio::time::timeout(Duration::from_secs(5), joiner)
            .await
            .expect("joiner finishes after the runner is cancelled")
            .unwrap();
        assert_eq!(outcome.value, "joiner");
        assert!(!outcome.shared);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_runners_without_joiners_are_deregistered() {
        let group = Arc::new(Group::<u64, u64>::new());

        let runners: Vec<_> = (0..100)
            .map(|id| {
                let group = Arc::clone(&group);
                tokio::spawn(async move {
                    group
                        .work(id, || async move {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            id
                        })
                        .await
                })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(group.in_flight(), 100);

        for runner in runners {
            runner.abort();
            assert!(runner.await.unwrap_err().is_cancelled());
        }
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_panicking_work_is_deregistered() {
        let group = Arc::new(Group::<u64, u64>::new());

        let runner = {
            let group = Arc::clone(&group);
            tokio::spawn(async move {
                group
                    .work(3, || async { None::<u64>.expect("load failed") })
                    .await
            })
        };
        assert!(runner.await.unwrap_err().is_panic());
        assert_eq!(group.in_flight(), 0);

        let retry = group.work(3, || async { 30 }).await;
        assert_eq!(retry.value, 30);
        assert!(!retry.shared);
    }
}
