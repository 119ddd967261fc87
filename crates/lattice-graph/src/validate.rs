//! Structural integrity checks over a [`MemoryStore`].

use std::collections::HashSet;

use crate::store::MemoryStore;

/// Stateless validator over a borrowed [`MemoryStore`].
pub struct LatticeValidator<'a> {
    store: &'a MemoryStore,
}

impl<'a> LatticeValidator<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// True iff every link's endpoints resolve to existing anchors.
    ///
    /// The store never dangles links today (there is no removal
    /// operation), but a future removal path must keep this holding.
    pub fn all_links_have_anchors(&self) -> bool {
        self.store
            .links_in_forge_order()
            .iter()
            .all(|l| self.store.get_anchor(&l.from).is_some() && self.store.get_anchor(&l.to).is_some())
    }

    /// Ids of anchors with no links in either direction, in pin order.
    pub fn orphan_anchors(&self) -> Vec<String> {
        self.store
            .anchors_in_pin_order()
            .into_iter()
            .filter(|a| a.is_orphan())
            .map(|a| a.id)
            .collect()
    }

    /// Total number of links in the lattice.
    pub fn total_edges(&self) -> usize {
        self.store.link_count()
    }

    /// True iff no cycle is reachable from `start` via out-links.
    ///
    /// Iterative depth-first search with an explicit recursion-stack set:
    /// an edge back to an anchor currently on the stack is a cycle. The
    /// frame stack lives on the heap, so chain length is bounded by the
    /// store, not by the thread stack. The check is reachability-scoped —
    /// cycles disjoint from `start`'s reachable set are not detected. A
    /// missing start anchor is trivially acyclic.
    pub fn is_acyclic_from(&self, start: &str) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut on_stack: HashSet<String> = HashSet::new();

        // frames: (anchor id, post-visit). A pre-visit frame expands the
        // anchor; its paired post-visit frame pops it off the DFS stack.
        let mut frames: Vec<(String, bool)> = vec![(start.to_string(), false)];

        while let Some((id, post)) = frames.pop() {
            if post {
                on_stack.remove(&id);
                continue;
            }
            if visited.contains(&id) {
                continue; // already fully explored, no cycle below
            }
            visited.insert(id.clone());
            on_stack.insert(id.clone());
            frames.push((id.clone(), true));

            let Some(anchor) = self.store.get_anchor(&id) else {
                continue;
            };
            for link_id in &anchor.out_links {
                if let Some(link) = self.store.get_link(link_id) {
                    if on_stack.contains(&link.to) {
                        return false; // back-edge
                    }
                    if !visited.contains(&link.to) {
                        frames.push((link.to, false));
                    }
                }
            }
        }
        true
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_is_clean() {
        let s = MemoryStore::new();
        let v = LatticeValidator::new(&s);
        assert!(v.all_links_have_anchors());
        assert!(v.orphan_anchors().is_empty());
        assert_eq!(v.total_edges(), 0);
    }

    #[test]
    fn linked_anchors_are_not_orphans() {
        let s = MemoryStore::new();
        for id in ["a", "b", "c"] {
            s.pin_anchor(id, id, "", 0).unwrap();
        }
        s.forge_link("l-ab", "a", "b", 0, "").unwrap();
        s.forge_link("l-bc", "b", "c", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(v.orphan_anchors().is_empty());

        s.pin_anchor("d", "isolated", "", 0).unwrap();
        assert_eq!(v.orphan_anchors(), vec!["d"]);
    }

    #[test]
    fn total_edges_counts_links() {
        let s = MemoryStore::new();
        s.pin_anchor("a", "a", "", 0).unwrap();
        s.pin_anchor("b", "b", "", 0).unwrap();
        s.forge_link("l1", "a", "b", 0, "").unwrap();
        s.forge_link("l2", "b", "a", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert_eq!(v.total_edges(), 2);
        assert!(v.all_links_have_anchors());
    }

    #[test]
    fn two_cycle_is_detected() {
        let s = MemoryStore::new();
        s.pin_anchor("a", "a", "", 0).unwrap();
        s.pin_anchor("b", "b", "", 0).unwrap();
        s.forge_link("l-ab", "a", "b", 0, "").unwrap();
        s.forge_link("l-ba", "b", "a", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(!v.is_acyclic_from("a"));
        assert!(!v.is_acyclic_from("b"));
    }

    #[test]
    fn chain_without_back_edge_is_acyclic() {
        let s = MemoryStore::new();
        for id in ["a", "b", "c"] {
            s.pin_anchor(id, id, "", 0).unwrap();
        }
        s.forge_link("l-ab", "a", "b", 0, "").unwrap();
        s.forge_link("l-bc", "b", "c", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(v.is_acyclic_from("a"));
    }

    #[test]
    fn diamond_is_acyclic_despite_shared_node() {
        // a → b → d and a → c → d: d is reached twice but never while on
        // the stack through the same path — not a cycle.
        let s = MemoryStore::new();
        for id in ["a", "b", "c", "d"] {
            s.pin_anchor(id, id, "", 0).unwrap();
        }
        s.forge_link("l-ab", "a", "b", 0, "").unwrap();
        s.forge_link("l-ac", "a", "c", 0, "").unwrap();
        s.forge_link("l-bd", "b", "d", 0, "").unwrap();
        s.forge_link("l-cd", "c", "d", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(v.is_acyclic_from("a"));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let s = MemoryStore::new();
        s.pin_anchor("a", "a", "", 0).unwrap();
        s.forge_link("l-aa", "a", "a", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(!v.is_acyclic_from("a"));
    }

    #[test]
    fn cycle_disjoint_from_start_is_not_seen() {
        let s = MemoryStore::new();
        for id in ["a", "x", "y"] {
            s.pin_anchor(id, id, "", 0).unwrap();
        }
        // Cycle x ⇄ y, unreachable from a.
        s.forge_link("l-xy", "x", "y", 0, "").unwrap();
        s.forge_link("l-yx", "y", "x", 0, "").unwrap();

        let v = LatticeValidator::new(&s);
        assert!(v.is_acyclic_from("a")); // reachability-scoped
        assert!(!v.is_acyclic_from("x"));
    }

    #[test]
    fn acyclic_check_handles_deep_chains() {
        // Far deeper than any thread stack would tolerate recursively;
        // the explicit frame stack must walk it without overflowing.
        let n = 10_000;
        let s = MemoryStore::with_capacity(n + 1);
        for i in 0..=n {
            s.pin_anchor(&format!("n{i:05}"), "n", "", 0).unwrap();
        }
        for i in 0..n {
            s.forge_link(&format!("l{i:05}"), &format!("n{i:05}"), &format!("n{:05}", i + 1), 0, "")
                .unwrap();
        }

        let v = LatticeValidator::new(&s);
        assert!(v.is_acyclic_from("n00000"));

        // Close the loop back to the head: the same deep walk now ends in
        // a back-edge.
        s.forge_link("l-back", &format!("n{n:05}"), "n00000", 0, "").unwrap();
        assert!(!v.is_acyclic_from("n00000"));
    }

    #[test]
    fn missing_start_is_trivially_acyclic() {
        let s = MemoryStore::new();
        let v = LatticeValidator::new(&s);
        assert!(v.is_acyclic_from("ghost"));
    }
}
