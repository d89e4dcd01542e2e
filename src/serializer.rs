//! The keyed serializer: a registry of per-key FIFO queues and the runner
//! loop that drains them.
//!
//! # Ordering
//!
//! Submission appends to the key's queue; the queue's front task is the one
//! running. A task's outcome is forwarded to its submission *before* the
//! queue advances, so by the time a submitter observes task N settled,
//! task N+1 has not yet started. When the queue empties, its registry entry
//! is removed in the same critical section as the final dequeue — a drained
//! key is indistinguishable from one never submitted to.
//!
//! # Concurrency
//!
//! The registry is a `HashMap` behind a single [`parking_lot::Mutex`].
//! Critical sections are a few pointer moves and the lock is never held
//! across an `.await`. Each active key has exactly one runner task: it is
//! spawned on the 0 -> 1 queue transition and exits when it removes the
//! drained entry, so a new runner can only be spawned once the old one is
//! gone.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::key::SerializationKey;
use crate::submission::Submission;
use crate::task::{Job, QueuedTask, TaskState};

type Registry<K> = HashMap<K, VecDeque<QueuedTask>>;

/// Per-key exclusive execution serializer.
///
/// Operations submitted under the same key run one at a time in submission
/// order; operations under different keys run fully concurrently. See the
/// [crate-level documentation](crate) for the full contract.
///
/// # Thread Safety
///
/// `KeyedSerializer` is `Clone`; clones are cheap handles sharing one
/// registry and can be moved freely across tasks and threads.
///
/// # Examples
///
/// ```
/// use synq::KeyedSerializer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let serializer = KeyedSerializer::new();
///
/// let renamed = serializer.submit((7_u64, "rename"), || async {
///     // exclusive with every other (7, "rename") operation
///     "done"
/// });
/// assert_eq!(renamed.await.unwrap(), "done");
/// # }
/// ```
pub struct KeyedSerializer<K> {
    registry: Arc<Mutex<Registry<K>>>,
}

impl<K> Clone for KeyedSerializer<K> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<K> fmt::Debug for KeyedSerializer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedSerializer")
            .field("active_keys", &self.registry.lock().len())
            .finish()
    }
}

impl<K: SerializationKey> Default for KeyedSerializer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SerializationKey> KeyedSerializer<K> {
    /// Creates a serializer with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submits `operation` under `key` and returns its completion future.
    ///
    /// Returns synchronously after enqueueing; the caller suspends only by
    /// awaiting the returned [`Submission`]. The operation is invoked when
    /// it reaches the front of the key's queue — immediately if the queue
    /// was empty — and its output is forwarded to the submission verbatim.
    ///
    /// Submitting from inside a running operation is safe for any key,
    /// including the operation's own: the new task is enqueued and `submit`
    /// returns. Awaiting a same-key resubmission from inside the running
    /// operation deadlocks that key, since the new task cannot start until
    /// the current one settles.
    ///
    /// If the operation panics, the panic is caught and delivered to this
    /// submission alone as [`Error::OperationPanicked`]; the queue advances
    /// normally.
    ///
    /// # Panics
    ///
    /// Panics if called from outside a Tokio runtime, as the per-key runner
    /// is a spawned task.
    pub fn submit<F, Fut, T>(&self, key: K, operation: F) -> Submission<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            async move {
                // Both the closure call and the future it returns can
                // panic; contain either so the runner survives.
                let outcome = match std::panic::catch_unwind(AssertUnwindSafe(operation)) {
                    Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
                    Err(payload) => Err(payload),
                };
                let outcome = outcome.map_err(|payload| Error::from_panic(payload.as_ref()));
                // The submitter may have dropped its half; the task ran
                // to completion either way.
                let _ = tx.send(outcome);
            }
            .boxed()
        });

        let position = {
            let mut registry = self.registry.lock();
            let queue = registry.entry(key.clone()).or_default();
            queue.push_back(QueuedTask::new(job));
            queue.len() - 1
        };
        tracing::trace!(position, "task admitted");

        if position == 0 {
            self.spawn_runner(key);
        }
        Submission::new(rx, position)
    }

    /// Drives one key's queue to exhaustion, then removes its entry.
    fn spawn_runner(&self, key: K) {
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            loop {
                // Take the front task's job, marking the task running. The
                // entry stays at the front until the task settles, so depth
                // always counts it.
                let job = {
                    let mut registry = registry.lock();
                    let Some(queue) = registry.get_mut(&key) else { break };
                    let Some(task) = queue.front_mut() else { break };
                    debug_assert!(task.state.can_transition_to(&TaskState::Running));
                    task.state = TaskState::Running;
                    task.job.take()
                };
                let Some(job) = job else { break };

                tracing::trace!("task started");
                // The job settles its submission as its final act, so the
                // outcome is delivered before the queue advances.
                job().await;
                tracing::trace!("task settled");

                let more = {
                    let mut registry = registry.lock();
                    let Some(queue) = registry.get_mut(&key) else { break };
                    debug_assert!(queue
                        .front()
                        .is_some_and(|task| task.state.can_transition_to(&TaskState::Settled)));
                    queue.pop_front();
                    if queue.is_empty() {
                        registry.remove(&key);
                        tracing::debug!("queue drained, registry entry removed");
                        false
                    } else {
                        tracing::trace!(depth = queue.len(), "advancing to next task");
                        true
                    }
                };
                if !more {
                    break;
                }
            }
        });
    }

    /// Number of tasks currently pending or running under `key`.
    ///
    /// Returns 0 when the key has no active queue — including right after a
    /// full drain, which is indistinguishable from never having submitted.
    pub fn queue_depth(&self, key: &K) -> usize {
        self.registry.lock().get(key).map_or(0, VecDeque::len)
    }

    /// Whether `key` currently has an active queue.
    pub fn is_active(&self, key: &K) -> bool {
        self.registry.lock().contains_key(key)
    }

    /// Whether the task at the front of `key`'s queue has started.
    pub fn is_running(&self, key: &K) -> bool {
        self.registry
            .lock()
            .get(key)
            .and_then(VecDeque::front)
            .is_some_and(|task| task.state == TaskState::Running)
    }

    /// Whether no key has an active queue.
    pub fn is_idle(&self) -> bool {
        self.registry.lock().is_empty()
    }
}
