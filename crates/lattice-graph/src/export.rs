//! JSON export of the whole lattice.
//!
//! The export is the one machine-readable surface of the core: an
//! external importer can rebuild an equivalent anchor/link set from it.
//! Anchors are emitted in pin order and links in forge order, so the
//! same store state always produces the same document.

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;
use crate::model::LATTICE_VERSION;
use crate::store::MemoryStore;

// ─────────────────────────────────────────────
// Export shape
// ─────────────────────────────────────────────

/// Top-level export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeExport {
    pub version: String,
    pub epoch: u64,
    pub nodes: Vec<NodeExport>,
    pub links: Vec<LinkExport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExport {
    pub id: String,
    pub label: String,
    pub content_hash: String,
    pub tier: u8,
    pub recall_stored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkExport {
    pub id: String,
    pub from: String,
    pub to: String,
    pub kind: u32,
}

// ─────────────────────────────────────────────
// RecallSerializer
// ─────────────────────────────────────────────

/// Stateless exporter over a borrowed [`MemoryStore`].
pub struct RecallSerializer<'a> {
    store: &'a MemoryStore,
}

impl<'a> RecallSerializer<'a> {
    pub fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Snapshot the store into the export shape.
    pub fn snapshot(&self) -> LatticeExport {
        let nodes = self
            .store
            .anchors_in_pin_order()
            .into_iter()
            .map(|a| NodeExport {
                id: a.id,
                label: a.label,
                content_hash: a.content_hash,
                tier: a.recall_tier,
                recall_stored: a.recall_stored,
            })
            .collect();

        let links = self
            .store
            .links_in_forge_order()
            .into_iter()
            .map(|l| LinkExport { id: l.id, from: l.from, to: l.to, kind: l.kind })
            .collect();

        LatticeExport {
            version: LATTICE_VERSION.to_string(),
            epoch: self.store.epoch(),
            nodes,
            links,
        }
    }

    /// Serialize the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LatticeError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> MemoryStore {
        let s = MemoryStore::new();
        s.pin_anchor("a", "alpha", "h-a", 1).unwrap();
        s.pin_anchor("b", "beta", "h-b", 2).unwrap();
        s.forge_link("l-ab", "a", "b", 3, "cfg").unwrap();
        s.store_recall("a", "r-a").unwrap();
        s.advance_epoch();
        s
    }

    #[test]
    fn snapshot_carries_version_and_epoch() {
        let s = sample_store();
        let snap = RecallSerializer::new(&s).snapshot();
        assert_eq!(snap.version, LATTICE_VERSION);
        assert_eq!(snap.epoch, 1);
    }

    #[test]
    fn snapshot_orders_nodes_by_pin_and_links_by_forge() {
        let s = MemoryStore::new();
        s.pin_anchor("z", "z", "", 0).unwrap();
        s.pin_anchor("a", "a", "", 0).unwrap();
        s.forge_link("l-2", "z", "a", 0, "").unwrap();
        s.forge_link("l-1", "a", "z", 0, "").unwrap();

        let snap = RecallSerializer::new(&s).snapshot();
        let node_ids: Vec<&str> = snap.nodes.iter().map(|n| n.id.as_str()).collect();
        let link_ids: Vec<&str> = snap.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(node_ids, vec!["z", "a"]);
        assert_eq!(link_ids, vec!["l-2", "l-1"]);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let s = sample_store();
        let json = RecallSerializer::new(&s).to_json().unwrap();
        assert!(json.contains("\"contentHash\""));
        assert!(json.contains("\"recallStored\""));
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"epoch\""));
    }

    #[test]
    fn json_escapes_special_characters() {
        let s = MemoryStore::new();
        s.pin_anchor("a", "line\nbreak \"quoted\" back\\slash\rcr", "", 0).unwrap();

        let json = RecallSerializer::new(&s).to_json().unwrap();
        assert!(json.contains("line\\nbreak"));
        assert!(json.contains("\\\"quoted\\\""));
        assert!(json.contains("back\\\\slash"));
        assert!(json.contains("\\rcr"));
    }

    #[test]
    fn export_roundtrips_through_an_importer() {
        let s = sample_store();
        let json = RecallSerializer::new(&s).to_json().unwrap();

        let back: LatticeExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes.len(), 2);
        assert_eq!(back.links.len(), 1);
        assert_eq!(back.nodes[0].id, "a");
        assert!(back.nodes[0].recall_stored);
        assert_eq!(back.links[0].from, "a");
        assert_eq!(back.links[0].kind, 3);
    }

    #[test]
    fn same_state_exports_identical_documents() {
        let s = sample_store();
        let ser = RecallSerializer::new(&s);
        assert_eq!(ser.to_json().unwrap(), ser.to_json().unwrap());
    }
}
