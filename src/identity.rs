//! Vertex identity: maps application vertex values to internal keys.
//!
//! Keys are SipHash-1-3 digests computed with fixed zero keys, so the same
//! value maps to the same key in every process. Distinct values are assumed
//! to map to distinct keys; collisions are not detected here.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexKey(u64);

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

pub fn vertex_id<V: Hash + ?Sized>(value: &V) -> VertexKey {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    value.hash(&mut hasher);
    VertexKey(hasher.finish())
}
