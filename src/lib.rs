//! Per-key serialization of asynchronous operations.
//!
//! [`KeyedSerializer`] guarantees that operations submitted under the same
//! key run one at a time, in exact submission order, while operations under
//! different keys run fully concurrently. It is the async analogue of a
//! per-key mutex with FIFO fairness: a lazily created queue per key, drained
//! by a single runner task, and removed the instant it empties.
//!
//! # Guarantees
//!
//! - **FIFO per key**: for a fixed key, operations run to completion in the
//!   exact order their [`submit`](KeyedSerializer::submit) calls were made.
//!   Operation N+1 does not begin until operation N has fully settled.
//! - **Cross-key independence**: keys impose no ordering on each other; a
//!   backlog under one key never delays another key's first operation.
//! - **Failure isolation**: a failing operation delivers its failure only to
//!   its own [`Submission`]; the next queued operation still starts. This
//!   holds even if the operation panics.
//! - **Drain cleanup**: the bookkeeping for a key disappears as soon as its
//!   last task settles. Submitting again afterwards behaves exactly like
//!   first-time use.
//!
//! # Examples
//!
//! Same key, strict serial order:
//!
//! ```
//! use synq::KeyedSerializer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let serializer = KeyedSerializer::new();
//!
//! let first = serializer.submit("checkout", || async { "one" });
//! let second = serializer.submit("checkout", || async { "two" });
//!
//! // `second` was queued behind `first` and will not start until
//! // `first` has settled.
//! assert_eq!(second.position(), 1);
//! assert_eq!(first.await.unwrap(), "one");
//! assert_eq!(second.await.unwrap(), "two");
//! # }
//! ```
//!
//! Distinct keys are unrelated and overlap freely:
//!
//! ```
//! use synq::KeyedSerializer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let serializer = KeyedSerializer::new();
//!
//! let a = serializer.submit("tenant-a", || async { 1 });
//! let b = serializer.submit("tenant-b", || async { 2 });
//!
//! // Both started immediately; neither waited on the other.
//! assert_eq!(a.position(), 0);
//! assert_eq!(b.position(), 0);
//! assert_eq!(a.await.unwrap() + b.await.unwrap(), 3);
//! # }
//! ```
//!
//! # Keys
//!
//! Any `Eq + Hash + Clone + Send + 'static` value is a key — see
//! [`SerializationKey`]. Serializing "this method on this object" is a
//! matter of composing a key from both identities, e.g.
//! `(object_id, "method_name")`; no hidden per-object state is involved.
//!
//! # Runtime
//!
//! The serializer drives each key's queue with a spawned Tokio task, so
//! [`submit`](KeyedSerializer::submit) must be called from within a Tokio
//! runtime.

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod serializer;
pub mod submission;
pub mod task;

pub use error::{Error, Result};
pub use key::SerializationKey;
pub use serializer::KeyedSerializer;
pub use submission::Submission;
pub use task::TaskState;
