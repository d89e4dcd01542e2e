//! Key bounds for serialization domains.
//!
//! A key names one serialization domain: tasks sharing a key are mutually
//! exclusive in time, tasks under different keys are unrelated. Composite
//! domains — the classic case being "this method on this object" — are
//! plain composite values:
//!
//! ```
//! fn takes_key<K: synq::SerializationKey>(_key: K) {}
//!
//! takes_key("refresh");
//! takes_key(42_u64);
//! takes_key((7_usize, "rename"));
//! ```

use std::hash::Hash;

/// Bounds required of a serialization-domain key.
///
/// Blanket-implemented for every qualifying type; there is nothing to
/// implement by hand. `Clone` and `Send + 'static` are needed because the
/// key travels into the per-key runner task; `Eq + Hash` because the
/// registry is a hash map.
pub trait SerializationKey: Eq + Hash + Clone + Send + 'static {}

impl<K> SerializationKey for K where K: Eq + Hash + Clone + Send + 'static {}
