//! The completion future returned by
//! [`KeyedSerializer::submit`](crate::KeyedSerializer::submit).

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Completion future for one submitted operation.
///
/// Resolves with the operation's output once the task has had its turn and
/// run to completion, or with a serializer-level [`Error`] if the operation
/// panicked or was abandoned.
///
/// Dropping a `Submission` does not cancel anything: the task keeps its
/// place in its key's queue and runs regardless of observers.
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
/// let first = serializer.submit("key", || async { "a" });
/// let second = serializer.submit("key", || async { "b" });
///
/// assert_eq!(first.position(), 0);
/// assert_eq!(second.position(), 1);
/// assert_eq!(second.await.unwrap(), "b");
/// # }
/// ```
#[derive(Debug)]
#[must_use = "dropping a Submission discards the outcome; the task itself still runs"]
pub struct Submission<T> {
    outcome: oneshot::Receiver<Result<T>>,
    position: usize,
}

impl<T> Submission<T> {
    pub(crate) fn new(outcome: oneshot::Receiver<Result<T>>, position: usize) -> Self {
        Self { outcome, position }
    }

    /// Number of tasks that were ahead in the key's queue at admission.
    ///
    /// `0` means there was no backlog and the task started immediately.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T> Future for Submission<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.outcome).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Sender dropped without a verdict: the runner was torn down.
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}
