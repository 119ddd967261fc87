//! Id generation and content hashing.
//!
//! The core never generates ids or digests — it validates and stores
//! caller-supplied ones. These are the collaborators the CLI injects.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fresh unique anchor id.
pub fn new_anchor_id() -> String {
    format!("anchor-{}", Uuid::new_v4())
}

/// Fresh unique link id.
pub fn new_link_id() -> String {
    format!("link-{}", Uuid::new_v4())
}

/// Stable, deterministic SHA-256 hex digest of `content`.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
