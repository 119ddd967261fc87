//! Depth-first text rendering of reachable subgraphs.
//!
//! Rendering is lossy by design: the output is a human-readable dump,
//! not a serialization format (use [`crate::export`] for that).

use std::collections::HashSet;

use crate::model::{Anchor, MAX_TRAVERSAL_DEPTH};
use crate::store::MemoryStore;

/// Stateless text renderer over a borrowed [`MemoryStore`].
pub struct LatticeRenderer<'a> {
    store: &'a MemoryStore,
    max_depth: usize,
    indent_unit: String,
}

impl<'a> LatticeRenderer<'a> {
    /// `max_depth` is capped at 64 regardless of the configured value.
    pub fn new(store: &'a MemoryStore, max_depth: usize, indent_unit: &str) -> Self {
        Self {
            store,
            max_depth: max_depth.min(MAX_TRAVERSAL_DEPTH),
            indent_unit: indent_unit.to_string(),
        }
    }

    /// Renderer with the defaults the CLI uses: depth 64, two-space indent.
    pub fn with_defaults(store: &'a MemoryStore) -> Self {
        Self::new(store, MAX_TRAVERSAL_DEPTH, "  ")
    }

    /// Pre-order depth-first dump of everything reachable from `start`
    /// via out-links. Children are indented one unit per depth level.
    /// Anchors already printed in this traversal are skipped, so cyclic
    /// lattices render in finite form. Missing start → empty string.
    pub fn render_from(&self, start: &str) -> String {
        let mut out = String::new();
        let mut printed: HashSet<String> = HashSet::new();
        self.render_node(start, 0, &mut printed, &mut out);
        out
    }

    /// One tree per anchor, in pin order, each under a `--- Root: {id} ---`
    /// header. Roots are separated by a blank line.
    pub fn render_full_map(&self) -> String {
        let blocks: Vec<String> = self
            .store
            .anchors_in_pin_order()
            .iter()
            .map(|a| format!("--- Root: {} ---\n{}", a.id, self.render_from(&a.id)))
            .collect();
        blocks.join("\n")
    }

    fn render_node(
        &self,
        id: &str,
        depth: usize,
        printed: &mut HashSet<String>,
        out: &mut String,
    ) {
        if depth > self.max_depth || printed.contains(id) {
            return;
        }
        let Some(anchor) = self.store.get_anchor(id) else {
            return;
        };
        printed.insert(id.to_string());

        out.push_str(&self.indent_unit.repeat(depth));
        out.push_str(&format_line(&anchor));
        out.push('\n');

        // Sorted link ids — child order is deterministic.
        for link_id in &anchor.out_links {
            if let Some(link) = self.store.get_link(link_id) {
                self.render_node(&link.to, depth + 1, printed, out);
            }
        }
    }
}

fn format_line(anchor: &Anchor) -> String {
    format!("[T{}] {} ({})", anchor.recall_tier, anchor.label, anchor.id)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
