//! Serializer-level error types.
//!
//! The serializer is a pure sequencer: an operation's own failures (an `Err`
//! in its output type) are forwarded to its submitter verbatim and never
//! appear here. These variants cover only what the serializer itself can
//! observe go wrong while driving a task.

use std::any::Any;

use thiserror::Error;

/// Result alias for outcomes delivered through a
/// [`Submission`](crate::Submission).
pub type Result<T> = std::result::Result<T, Error>;

/// Errors the serializer can deliver in place of an operation's output.
#[derive(Error, Debug)]
pub enum Error {
    /// The operation panicked while running.
    ///
    /// The panic is contained to the submission it belongs to; the key's
    /// queue advances normally afterwards.
    #[error("operation panicked: {message}")]
    OperationPanicked {
        /// The panic payload rendered as text, when it was a string.
        message: String,
    },

    /// The outcome channel closed before a verdict was delivered.
    ///
    /// Only happens when the runner task is torn down mid-flight, e.g. the
    /// runtime shut down while the operation was still running.
    #[error("task was abandoned before it settled")]
    Abandoned,
}

impl Error {
    /// Builds an [`Error::OperationPanicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::OperationPanicked { message }
    }
}
