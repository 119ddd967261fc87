//! Read-only query and traversal engine over a [`MemoryStore`].
//!
//! Every method is a pure function of the store's current contents:
//! results are clones, scans run in pin order, and traversal enumerates
//! neighbors in sorted link-id order, so output is deterministic for a
//! given store state.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Anchor, Link, MAX_TRAVERSAL_DEPTH};
use crate::store::MemoryStore;

// ─────────────────────────────────────────────
// Visited-set pool
// ─────────────────────────────────────────────

// Thread-local pool of reusable HashSet<String> instances. Each traversal
// acquires a pre-allocated set and returns it when done, skipping the
// allocator on a warm pool.
thread_local! {
    static VISITED_POOL: RefCell<Vec<HashSet<String>>> = RefCell::new(Vec::with_capacity(4));
}

#[inline]
fn acquire_visited() -> HashSet<String> {
    VISITED_POOL.with(|pool| pool.borrow_mut().pop().unwrap_or_default())
}

#[inline]
fn release_visited(mut set: HashSet<String>) {
    set.clear();
    VISITED_POOL.with(|pool| {
        let mut p = pool.borrow_mut();
        // Cap pool depth at 8 sets per thread.
        if p.len() < 8 {
            p.push(set);
        }
    });
}

// ─────────────────────────────────────────────
// Traversal direction
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Out,
    In,
}

// ─────────────────────────────────────────────
// SynapseService
// ─────────────────────────────────────────────

/// Stateless reader over a borrowed [`MemoryStore`].
pub struct SynapseService<'a> {
    store: &'a MemoryStore,
}

impl<'a> SynapseService<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    // ── Filters ────────────────────────────────────────

    /// Anchors whose label contains `needle`, case-insensitively.
    /// An empty needle matches every anchor. Results come back in pin order.
    pub fn find_by_label_contains(&self, needle: &str) -> Vec<Anchor> {
        if needle.is_empty() {
            return self.store.anchors_in_pin_order();
        }
        let needle = needle.to_lowercase();
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .filter(|a| a.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Anchors with exactly the given recall tier, in pin order.
    pub fn find_by_recall_tier(&self, tier: u8) -> Vec<Anchor> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .filter(|a| a.recall_tier == tier)
            .collect()
    }

    /// Anchors filtered by their recall-stored flag, in pin order.
    pub fn find_by_recall_stored(&self, stored: bool) -> Vec<Anchor> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .filter(|a| a.recall_stored == stored)
            .collect()
    }

    /// First anchor (in pin order) whose content hash equals `hash`.
    /// Content hashes are not required to be unique.
    pub fn find_by_content_hash(&self, hash: &str) -> Option<Anchor> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .find(|a| a.content_hash == hash)
    }

    // ── Link scans ─────────────────────────────────────

    /// All links whose source is `id`, in forge order.
    pub fn links_from(&self, id: &str) -> Vec<Link> {
        self.store
            .links_in_forge_order()
            .into_iter()
            .filter(|l| l.from == id)
            .collect()
    }

    /// All links whose target is `id`, in forge order.
    pub fn links_to(&self, id: &str) -> Vec<Link> {
        self.store
            .links_in_forge_order()
            .into_iter()
            .filter(|l| l.to == id)
            .collect()
    }

    // ── Traversal ──────────────────────────────────────

    /// Breadth-first traversal following out-links from `start`.
    ///
    /// Bounded by `min(max_depth, 64)` levels; each anchor is visited at
    /// most once (first-seen wins). A missing start anchor yields an empty
    /// result rather than an error. Within a level, neighbors are expanded
    /// in sorted link-id order, so the discovery order is deterministic.
    pub fn traverse_out(&self, start: &str, max_depth: usize) -> Vec<Anchor> {
        self.traverse(start, max_depth, Direction::Out)
    }

    /// Breadth-first traversal following in-links (edges reversed).
    pub fn traverse_in(&self, start: &str, max_depth: usize) -> Vec<Anchor> {
        self.traverse(start, max_depth, Direction::In)
    }

    fn traverse(&self, start: &str, max_depth: usize, dir: Direction) -> Vec<Anchor> {
        let Some(root) = self.store.get_anchor(start) else {
            return Vec::new();
        };
        let depth_cap = max_depth.min(MAX_TRAVERSAL_DEPTH);

        let mut visited = acquire_visited();
        let mut order: Vec<Anchor> = Vec::new();

        // queue entries: (anchor, depth)
        let mut queue: VecDeque<(Anchor, usize)> = VecDeque::new();
        visited.insert(root.id.clone());
        queue.push_back((root, 0));

        while let Some((anchor, depth)) = queue.pop_front() {
            let link_ids = match dir {
                Direction::Out => anchor.out_links.clone(),
                Direction::In => anchor.in_links.clone(),
            };
            order.push(anchor);

            if depth >= depth_cap {
                continue;
            }

            // BTreeSet enumeration: sorted link ids.
            for link_id in &link_ids {
                let Some(link) = self.store.get_link(link_id) else {
                    continue;
                };
                let neighbor_id = match dir {
                    Direction::Out => &link.to,
                    Direction::In => &link.from,
                };
                if visited.contains(neighbor_id) {
                    continue;
                }
                if let Some(neighbor) = self.store.get_anchor(neighbor_id) {
                    visited.insert(neighbor_id.clone());
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        release_visited(visited);
        order
    }

    // ── Degrees / ordering ─────────────────────────────

    /// Map of anchor id → outgoing degree, for every anchor.
    pub fn degree_out(&self) -> HashMap<String, usize> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .map(|a| (a.id, a.out_links.len()))
            .collect()
    }

    /// Map of anchor id → incoming degree, for every anchor.
    pub fn degree_in(&self) -> HashMap<String, usize> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .map(|a| (a.id, a.in_links.len()))
            .collect()
    }

    /// All anchors sorted by pin timestamp. The sort is stable, so anchors
    /// pinned in the same millisecond keep their pin order.
    pub fn sort_by_pinned_time(&self, ascending: bool) -> Vec<Anchor> {
        let mut anchors = self.store.anchors_in_pin_order();
        if ascending {
            anchors.sort_by(|a, b| a.pinned_at.cmp(&b.pinned_at));
        } else {
            anchors.sort_by(|a, b| b.pinned_at.cmp(&a.pinned_at));
        }
        anchors
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
