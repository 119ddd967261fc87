use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::LatticeError;
use crate::model::{Anchor, Link, DEFAULT_CAPACITY};

// ─────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────

/// Owner of every anchor and link in the lattice.
///
/// Readers go straight through the sharded maps without any global lock;
/// anchors and links come back as clones, so callers can never mutate
/// internal state through a snapshot.
///
/// ## Write protocol
/// Every write (`pin_anchor`, `forge_link`, `store_recall`) serializes on
/// one store-wide mutex:
/// 1. Validate under the mutex (capacity, identity, endpoint existence).
/// 2. Insert into the id→entity map.
/// 3. Append to the insertion-order list / update both adjacency sets.
///
/// The mutex makes the capacity-check-then-insert and the two-sided
/// adjacency update atomic with respect to other writers. A `forge_link`
/// touches the two endpoint anchors one at a time, so a self-loop never
/// re-enters the same map entry.
pub struct MemoryStore {
    anchors: DashMap<String, Anchor>,
    links: DashMap<String, Link>,

    /// Anchor ids in pin order. Deterministic iteration for scans,
    /// rendering and export.
    pin_order: RwLock<Vec<String>>,

    /// Link ids in forge order. Keeps the export stable.
    forge_order: RwLock<Vec<String>>,

    /// Serializes composite writes (see the write protocol above).
    write_lock: Mutex<()>,

    /// Generation counter. Advanced explicitly via [`MemoryStore::advance_epoch`],
    /// never as a side effect of a write.
    epoch: AtomicU64,

    capacity: usize,
}

impl MemoryStore {
    /// Create a store holding at most `capacity` anchors.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            anchors: DashMap::new(),
            links: DashMap::new(),
            pin_order: RwLock::new(Vec::new()),
            forge_order: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
            epoch: AtomicU64::new(0),
            capacity,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    // ── Anchor operations ──────────────────────────────

    /// Pin a new anchor into the lattice.
    ///
    /// The tier is clamped to `[0, 7]` and the label truncated to 256
    /// chars (see [`Anchor::new`]). Returns a clone of the stored anchor.
    pub fn pin_anchor(
        &self,
        id: &str,
        label: &str,
        content_hash: &str,
        tier: u8,
    ) -> Result<Anchor, LatticeError> {
        let _guard = self.write_lock.lock();

        if self.anchors.len() >= self.capacity {
            return Err(LatticeError::CapacityExceeded { capacity: self.capacity });
        }
        if id.is_empty() {
            return Err(LatticeError::InvalidArgument("anchor id must not be empty".into()));
        }
        if self.anchors.contains_key(id) {
            return Err(LatticeError::DuplicateId(id.to_string()));
        }

        let anchor = Anchor::new(id.to_string(), label, content_hash.to_string(), tier);
        self.anchors.insert(id.to_string(), anchor.clone());
        self.pin_order.write().push(id.to_string());

        debug!(id, tier = anchor.recall_tier, "anchor pinned");
        Ok(anchor)
    }

    /// Look up an anchor by id. Returns a clone; `None` on miss.
    pub fn get_anchor(&self, id: &str) -> Option<Anchor> {
        self.anchors.get(id).map(|a| a.clone())
    }

    /// Mark a recall as stored for `id`, retaining the supplied hash.
    ///
    /// The transition is one-way: a second call fails with
    /// [`LatticeError::AlreadyStored`].
    pub fn store_recall(&self, id: &str, hash: &str) -> Result<(), LatticeError> {
        let _guard = self.write_lock.lock();

        let mut anchor = self
            .anchors
            .get_mut(id)
            .ok_or_else(|| LatticeError::NotFound(format!("anchor {id}")))?;
        if anchor.recall_stored {
            return Err(LatticeError::AlreadyStored(id.to_string()));
        }
        anchor.recall_stored = true;
        anchor.recall_hash = Some(hash.to_string());

        debug!(id, "recall stored");
        Ok(())
    }

    // ── Link operations ────────────────────────────────

    /// Forge a directed link between two existing anchors.
    ///
    /// Registers the link id in the source's `out_links` and the target's
    /// `in_links` under the write lock, so the adjacency sets are always
    /// exactly the set of links touching each anchor.
    pub fn forge_link(
        &self,
        id: &str,
        from: &str,
        to: &str,
        kind: u32,
        config_hash: &str,
    ) -> Result<Link, LatticeError> {
        let _guard = self.write_lock.lock();

        if id.is_empty() {
            return Err(LatticeError::InvalidArgument("link id must not be empty".into()));
        }
        if from.is_empty() || to.is_empty() {
            return Err(LatticeError::InvalidArgument(
                "link endpoints must not be empty".into(),
            ));
        }
        if self.links.contains_key(id) {
            return Err(LatticeError::DuplicateId(id.to_string()));
        }
        if !self.anchors.contains_key(from) {
            return Err(LatticeError::NotFound(format!("anchor {from}")));
        }
        if !self.anchors.contains_key(to) {
            return Err(LatticeError::NotFound(format!("anchor {to}")));
        }

        let link = Link::new(
            id.to_string(),
            from.to_string(),
            to.to_string(),
            kind,
            config_hash.to_string(),
        );
        self.links.insert(id.to_string(), link.clone());
        self.forge_order.write().push(id.to_string());

        // One endpoint at a time — the guard is dropped before the second
        // lookup, so a self-loop (from == to) cannot deadlock.
        if let Some(mut src) = self.anchors.get_mut(from) {
            src.out_links.insert(id.to_string());
        }
        if let Some(mut dst) = self.anchors.get_mut(to) {
            dst.in_links.insert(id.to_string());
        }

        debug!(id, from, to, kind, "link forged");
        Ok(link)
    }

    /// Look up a link by id. Returns a clone; `None` on miss.
    pub fn get_link(&self, id: &str) -> Option<Link> {
        self.links.get(id).map(|l| l.clone())
    }

    // ── Epoch ──────────────────────────────────────────

    /// Advance the lattice generation counter and return the new value.
    /// Has no other side effect — callers decide when time moves forward.
    pub fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    // ── Snapshots / stats ──────────────────────────────

    /// All anchors, cloned, in pin order.
    pub fn anchors_in_pin_order(&self) -> Vec<Anchor> {
        let order = self.pin_order.read();
        order
            .iter()
            .filter_map(|id| self.anchors.get(id).map(|a| a.clone()))
            .collect()
    }

    /// All links, cloned, in forge order.
    pub fn links_in_forge_order(&self) -> Vec<Link> {
        let order = self.forge_order.read();
        order
            .iter()
            .filter_map(|id| self.links.get(id).map(|l| l.clone()))
            .collect()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
