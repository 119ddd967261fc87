use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Version tag emitted in every export (see [`crate::export`]).
pub const LATTICE_VERSION: &str = "1.0.0-synapse";

/// Hard ceiling on traversal / render depth, regardless of caller input.
pub const MAX_TRAVERSAL_DEPTH: usize = 64;

/// Labels longer than this are truncated at pin time.
pub const MAX_LABEL_LEN: usize = 256;

/// Default anchor capacity of a [`crate::store::MemoryStore`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// Recall tiers live in `[0, MAX_RECALL_TIER]`.
pub const MAX_RECALL_TIER: u8 = 7;

// ─────────────────────────────────────────────
// Anchor
// ─────────────────────────────────────────────

/// A node in the memory lattice.
///
/// Identity and attributes (`id`, `label`, `content_hash`, `recall_tier`,
/// `pinned_at`) are fixed at pin time. The adjacency sets and the recall
/// flag are mutated only by the owning [`crate::store::MemoryStore`] —
/// anchors reference links by id, never by pointer, so the store stays
/// the single owner of every entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    /// Unique identifier, caller-supplied (the core never generates ids).
    pub id: String,

    /// Human-readable label, truncated to [`MAX_LABEL_LEN`] chars.
    pub label: String,

    /// Opaque content digest. May be empty.
    pub content_hash: String,

    /// Priority/category tag, clamped to `[0, 7]`.
    pub recall_tier: u8,

    /// Unix timestamp (milliseconds) of creation. Immutable.
    pub pinned_at: i64,

    /// Ids of links where this anchor is the source.
    /// Sorted set — traversal and render enumerate neighbors in link-id order.
    pub out_links: BTreeSet<String>,

    /// Ids of links where this anchor is the target.
    pub in_links: BTreeSet<String>,

    /// Whether a recall has been stored for this anchor. Transitions
    /// false → true exactly once.
    pub recall_stored: bool,

    /// The hash supplied with the recall, kept alongside the flag.
    pub recall_hash: Option<String>,
}

impl Anchor {
    /// Construct a fresh anchor; clamps the tier and truncates the label.
    pub fn new(id: String, label: &str, content_hash: String, tier: u8) -> Self {
        let label = if label.chars().count() > MAX_LABEL_LEN {
            label.chars().take(MAX_LABEL_LEN).collect()
        } else {
            label.to_string()
        };
        Self {
            id,
            label,
            content_hash,
            recall_tier: tier.min(MAX_RECALL_TIER),
            pinned_at: now_unix_ms(),
            out_links: BTreeSet::new(),
            in_links: BTreeSet::new(),
            recall_stored: false,
            recall_hash: None,
        }
    }

    /// True iff the anchor has no links in either direction.
    pub fn is_orphan(&self) -> bool {
        self.out_links.is_empty() && self.in_links.is_empty()
    }
}

// ─────────────────────────────────────────────
// Link
// ─────────────────────────────────────────────

/// A directed edge between two anchors. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier, caller-supplied.
    pub id: String,

    /// Source anchor id. Must exist at forge time; not re-validated after.
    pub from: String,

    /// Target anchor id. Must exist at forge time.
    pub to: String,

    /// Non-negative integer tag classifying the link.
    pub kind: u32,

    /// Unix timestamp (milliseconds) of creation. Immutable.
    pub forged_at: i64,

    /// Opaque configuration digest. May be empty.
    pub config_hash: String,
}

impl Link {
    pub fn new(id: String, from: String, to: String, kind: u32, config_hash: String) -> Self {
        Self {
            id,
            from,
            to,
            kind,
            forged_at: now_unix_ms(),
            config_hash,
        }
    }
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

fn now_unix_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
