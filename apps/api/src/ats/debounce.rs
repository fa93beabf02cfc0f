//! Keyed debouncer: runs a job once input for a key has been quiet for `delay`.
//!
//! Every `schedule` supersedes the pending job for the same key. A job still sleeping is
//! aborted; one that wakes after being superseded sees a stale generation and exits.
//! Running jobs hold a per-key gate until they finish, so a newer job for the key and
//! `run_exclusive` callers only start once an in-flight job's effects have landed.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::debug;

type Gate = Arc<AsyncMutex<()>>;

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

struct Inner<K> {
    next_generation: u64,
    pending: HashMap<K, Pending>,
    gates: HashMap<K, Gate>,
}

impl<K: Eq + Hash + Clone> Inner<K> {
    fn is_current(&self, key: &K, generation: u64) -> bool {
        self.pending
            .get(key)
            .is_some_and(|p| p.generation == generation)
    }

    fn gate(&mut self, key: &K) -> Gate {
        Arc::clone(self.gates.entry(key.clone()).or_default())
    }
}

#[derive(Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Arc::new(Mutex::new(Inner {
                next_generation: 0,
                pending: HashMap::new(),
                gates: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        // Critical sections never panic mid-update; a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Schedules `job` for `key`, replacing whatever was pending for it.
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, key: K, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;

        if let Some(previous) = inner.pending.remove(&key) {
            previous.handle.abort();
            debug!(?key, superseded = previous.generation, "debounced job superseded");
        }

        let this = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(this.delay).await;

            let gate = {
                let mut inner = this.lock();
                if !inner.is_current(&task_key, generation) {
                    return;
                }
                inner.gate(&task_key)
            };

            {
                let _permit = gate.lock().await;
                let claimed = {
                    let mut inner = this.lock();
                    let current = inner.is_current(&task_key, generation);
                    if current {
                        inner.pending.remove(&task_key);
                    }
                    current
                };
                if claimed {
                    job().await;
                }
            }

            this.release_gate(&task_key, gate);
        });

        inner.pending.insert(key, Pending { generation, handle });
    }

    /// Drops the pending job for `key`, waits for any job already running for it, then
    /// runs `work` while holding the key's gate.
    pub async fn run_exclusive<Fut: Future>(&self, key: &K, work: Fut) -> Fut::Output {
        let gate = {
            let mut inner = self.lock();
            if let Some(previous) = inner.pending.remove(key) {
                previous.handle.abort();
                debug!(?key, superseded = previous.generation, "debounced job cancelled");
            }
            inner.gate(key)
        };

        let output = {
            let _permit = gate.lock().await;
            work.await
        };

        self.release_gate(key, gate);
        output
    }

    /// Forgets the gate for `key` once nothing pending or running still refers to it.
    fn release_gate(&self, key: &K, gate: Gate) {
        let mut inner = self.lock();
        drop(gate);
        let idle = !inner.pending.contains_key(key)
            && inner
                .gates
                .get(key)
                .is_some_and(|g| Arc::strong_count(g) == 1);
        if idle {
            inner.gates.remove(key);
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: &K) -> bool {
        self.lock().pending.contains_key(key)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    #[cfg(test)]
    fn gate_count(&self) -> usize {
        self.lock().gates.len()
    }
}
