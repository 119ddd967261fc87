//! # lattice-graph
//!
//! In-memory directed memory-graph engine for MindLattice.
//!
//! Provides the core data model and the stateless readers over it:
//! - [`model::Anchor`] — labeled node with recall tier and adjacency sets
//! - [`model::Link`]   — directed typed edge between two anchors
//! - [`store::MemoryStore`]       — thread-safe owner of all entities
//! - [`query::SynapseService`]    — search, BFS traversal, degree stats
//! - [`render::LatticeRenderer`]  — depth-first text visualization
//! - [`validate::LatticeValidator`] — dangling/orphan/cycle checks
//! - [`export::RecallSerializer`] — deterministic JSON export
//!
//! The store is the single source of truth; every other component borrows
//! it read-only. Ids are caller-supplied — the core validates and stores
//! them but never generates them.

pub mod error;
pub mod export;
pub mod model;
pub mod query;
pub mod render;
pub mod store;
pub mod validate;

pub use error::LatticeError;
pub use export::{LatticeExport, LinkExport, NodeExport, RecallSerializer};
pub use model::{
    Anchor, Link, DEFAULT_CAPACITY, LATTICE_VERSION, MAX_LABEL_LEN, MAX_RECALL_TIER,
    MAX_TRAVERSAL_DEPTH,
};
pub use query::SynapseService;
pub use render::LatticeRenderer;
pub use store::MemoryStore;
pub use validate::LatticeValidator;

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end scenario: pin a/b/c, link a→b and b→c, traverse, then
    /// check orphan reporting as an isolated anchor arrives.
    #[test]
    fn lattice_scenario() {
        let store = MemoryStore::new();
        store.pin_anchor("a", "a", "", 0).unwrap();
        store.pin_anchor("b", "b", "", 0).unwrap();
        store.pin_anchor("c", "c", "", 0).unwrap();
        store.forge_link("l-ab", "a", "b", 0, "").unwrap();
        store.forge_link("l-bc", "b", "c", 0, "").unwrap();

        let query = SynapseService::new(&store);
        let reached: Vec<String> = query
            .traverse_out("a", 2)
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(reached, vec!["a", "b", "c"]);

        let validator = validate::LatticeValidator::new(&store);
        assert!(validator.orphan_anchors().is_empty());
        assert!(validator.is_acyclic_from("a"));

        store.pin_anchor("d", "d", "", 0).unwrap();
        assert_eq!(validator.orphan_anchors(), vec!["d"]);
        assert_eq!(validator.total_edges(), 2);
    }
}
