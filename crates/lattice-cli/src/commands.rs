//! Command parsing and dispatch for the `mindmaster` binary.
//!
//! Commands are thin wrappers: they generate ids and digests, call the
//! core, and format the plain-data results the core hands back.

use std::fmt::Write as _;

use lattice_graph::{
    LatticeError, LatticeRenderer, LatticeValidator, MemoryStore, RecallSerializer,
    SynapseService, MAX_TRAVERSAL_DEPTH,
};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::ident;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage: {0}")]
    Usage(String),
}

// ─────────────────────────────────────────────
// Command
// ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pin { label: String, tier: u8 },
    Link { from: String, to: String, kind: u32 },
    Recall { id: String },
    Find { needle: String },
    Traverse { id: String, depth: usize, inward: bool },
    Render { id: Option<String> },
    Validate,
    Export { path: Option<String> },
    Epoch,
    Stats,
    Help,
}

impl Command {
    /// Parse one input line into a command.
    ///
    /// `pin` takes an optional leading tier: `pin 3 my label words`.
    pub fn parse(line: &str) -> Result<Self, CliError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| CliError::Usage("empty command, try `help`".into()))?;
        let rest: Vec<&str> = tokens.collect();

        match verb {
            "pin" => {
                if rest.is_empty() {
                    return Err(CliError::Usage("pin [tier] <label...>".into()));
                }
                let (tier, label_tokens) = match rest[0].parse::<u8>() {
                    Ok(t) if rest.len() > 1 => (t, &rest[1..]),
                    _ => (0, &rest[..]),
                };
                Ok(Command::Pin { label: label_tokens.join(" "), tier })
            }
            "link" => {
                if rest.len() < 2 {
                    return Err(CliError::Usage("link <from> <to> [kind]".into()));
                }
                let kind = match rest.get(2) {
                    Some(k) => k
                        .parse()
                        .map_err(|_| CliError::Usage("link kind must be a non-negative integer".into()))?,
                    None => 0,
                };
                Ok(Command::Link { from: rest[0].into(), to: rest[1].into(), kind })
            }
            "recall" => match rest.first() {
                Some(id) => Ok(Command::Recall { id: (*id).into() }),
                None => Err(CliError::Usage("recall <id>".into())),
            },
            "find" => Ok(Command::Find { needle: rest.join(" ") }),
            "traverse" | "traverse-in" => {
                let id = rest
                    .first()
                    .ok_or_else(|| CliError::Usage("traverse <id> [depth]".into()))?;
                let depth = match rest.get(1) {
                    Some(d) => d
                        .parse()
                        .map_err(|_| CliError::Usage("traverse depth must be an integer".into()))?,
                    None => MAX_TRAVERSAL_DEPTH,
                };
                Ok(Command::Traverse {
                    id: (*id).into(),
                    depth,
                    inward: verb == "traverse-in",
                })
            }
            "render" => Ok(Command::Render { id: rest.first().map(|s| (*s).into()) }),
            "validate" => Ok(Command::Validate),
            "export" => Ok(Command::Export { path: rest.first().map(|s| (*s).into()) }),
            "epoch" => Ok(Command::Epoch),
            "stats" => Ok(Command::Stats),
            "help" => Ok(Command::Help),
            other => Err(CliError::Usage(format!("unknown command `{other}`, try `help`"))),
        }
    }
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

/// Execute a command against the store; returns the text to print.
pub fn execute(store: &MemoryStore, config: &Config, cmd: Command) -> Result<String, CliError> {
    match cmd {
        Command::Pin { label, tier } => {
            let id = ident::new_anchor_id();
            let content_hash = ident::hash_content(&label);
            let anchor = store.pin_anchor(&id, &label, &content_hash, tier)?;
            info!(id = %anchor.id, "pinned");
            Ok(format!("pinned {} [T{}] {}", anchor.id, anchor.recall_tier, anchor.label))
        }
        Command::Link { from, to, kind } => {
            let id = ident::new_link_id();
            let config_hash = ident::hash_content(&format!("{from}->{to}#{kind}"));
            let link = store.forge_link(&id, &from, &to, kind, &config_hash)?;
            info!(id = %link.id, "forged");
            Ok(format!("forged {} {} -> {} (kind {})", link.id, link.from, link.to, link.kind))
        }
        Command::Recall { id } => {
            let anchor = store
                .get_anchor(&id)
                .ok_or_else(|| LatticeError::NotFound(format!("anchor {id}")))?;
            let hash = ident::hash_content(&anchor.label);
            store.store_recall(&id, &hash)?;
            Ok(format!("recall stored for {id} ({hash})"))
        }
        Command::Find { needle } => {
            let query = SynapseService::new(store);
            let hits = query.find_by_label_contains(&needle);
            if hits.is_empty() {
                return Ok("no matches".into());
            }
            let mut out = String::new();
            for a in hits {
                let _ = writeln!(out, "[T{}] {} ({})", a.recall_tier, a.label, a.id);
            }
            Ok(out)
        }
        Command::Traverse { id, depth, inward } => {
            let query = SynapseService::new(store);
            let visited = if inward {
                query.traverse_in(&id, depth)
            } else {
                query.traverse_out(&id, depth)
            };
            if visited.is_empty() {
                return Ok(format!("anchor {id} not found"));
            }
            let ids: Vec<String> = visited.into_iter().map(|a| a.id).collect();
            Ok(ids.join(" -> "))
        }
        Command::Render { id } => {
            let renderer = LatticeRenderer::new(store, config.render_depth, "  ");
            match id {
                Some(id) => Ok(renderer.render_from(&id)),
                None => Ok(renderer.render_full_map()),
            }
        }
        Command::Validate => {
            let validator = LatticeValidator::new(store);
            let orphans = validator.orphan_anchors();
            let cyclic: Vec<String> = store
                .anchors_in_pin_order()
                .into_iter()
                .filter(|a| !validator.is_acyclic_from(&a.id))
                .map(|a| a.id)
                .collect();

            let mut out = String::new();
            let _ = writeln!(out, "links anchored: {}", validator.all_links_have_anchors());
            let _ = writeln!(out, "total edges:    {}", validator.total_edges());
            let _ = writeln!(out, "orphans:        {}", if orphans.is_empty() { "none".into() } else { orphans.join(", ") });
            let _ = writeln!(out, "cycles from:    {}", if cyclic.is_empty() { "none".into() } else { cyclic.join(", ") });
            Ok(out)
        }
        Command::Export { path } => {
            let path = path.unwrap_or_else(|| config.export_path.clone());
            let json = RecallSerializer::new(store).to_json()?;
            std::fs::write(&path, &json)?;
            info!(%path, "exported");
            Ok(format!("exported {} anchors to {path}", store.anchor_count()))
        }
        Command::Epoch => Ok(format!("epoch advanced to {}", store.advance_epoch())),
        Command::Stats => Ok(format!(
            "anchors: {}/{}  links: {}  epoch: {}",
            store.anchor_count(),
            store.capacity(),
            store.link_count(),
            store.epoch(),
        )),
        Command::Help => Ok(HELP.to_string()),
    }
}

const HELP: &str = "\
commands:
  pin [tier] <label...>     pin a new anchor (tier 0-7, defaults to 0)
  link <from> <to> [kind]   forge a directed link between two anchors
  recall <id>               store a recall for an anchor (one-way)
  find <substring>          case-insensitive label search
  traverse <id> [depth]     BFS over out-links (depth capped at 64)
  traverse-in <id> [depth]  BFS over in-links
  render [id]               text tree from an anchor, or the full map
  validate                  integrity report (dangling, orphans, cycles)
  export [path]             write the lattice as JSON
  epoch                     advance the generation counter
  stats                     store counters
  help                      this text";

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pin_with_and_without_tier() {
        assert_eq!(
            Command::parse("pin 3 deep memory").unwrap(),
            Command::Pin { label: "deep memory".into(), tier: 3 }
        );
        assert_eq!(
            Command::parse("pin plain label").unwrap(),
            Command::Pin { label: "plain label".into(), tier: 0 }
        );
        // A lone number is a label, not a tier.
        assert_eq!(
            Command::parse("pin 7").unwrap(),
            Command::Pin { label: "7".into(), tier: 0 }
        );
    }

    #[test]
    fn parse_link_defaults_kind_to_zero() {
        assert_eq!(
            Command::parse("link a b").unwrap(),
            Command::Link { from: "a".into(), to: "b".into(), kind: 0 }
        );
        assert_eq!(
            Command::parse("link a b 4").unwrap(),
            Command::Link { from: "a".into(), to: "b".into(), kind: 4 }
        );
    }

    #[test]
    fn parse_traverse_directions() {
        assert_eq!(
            Command::parse("traverse a 2").unwrap(),
            Command::Traverse { id: "a".into(), depth: 2, inward: false }
        );
        assert_eq!(
            Command::parse("traverse-in a").unwrap(),
            Command::Traverse { id: "a".into(), depth: MAX_TRAVERSAL_DEPTH, inward: true }
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(Command::parse("").unwrap_err(), CliError::Usage(_)));
        assert!(matches!(Command::parse("frobnicate").unwrap_err(), CliError::Usage(_)));
        assert!(matches!(Command::parse("link a").unwrap_err(), CliError::Usage(_)));
        assert!(matches!(Command::parse("recall").unwrap_err(), CliError::Usage(_)));
    }

    #[test]
    fn pin_then_stats_reflects_count() {
        let store = MemoryStore::new();
        let cfg = Config::default();

        let out = execute(&store, &cfg, Command::parse("pin 2 alpha").unwrap()).unwrap();
        assert!(out.starts_with("pinned anchor-"));
        assert!(out.contains("[T2] alpha"));

        let stats = execute(&store, &cfg, Command::Stats).unwrap();
        assert!(stats.contains("anchors: 1/"));
    }

    #[test]
    fn recall_command_is_one_way() {
        let store = MemoryStore::new();
        let cfg = Config::default();
        store.pin_anchor("a", "alpha", "", 0).unwrap();

        execute(&store, &cfg, Command::Recall { id: "a".into() }).unwrap();
        let err = execute(&store, &cfg, Command::Recall { id: "a".into() }).unwrap_err();
        assert!(matches!(err, CliError::Lattice(LatticeError::AlreadyStored(_))));
    }

    #[test]
    fn validate_reports_orphans_and_cycles() {
        let store = MemoryStore::new();
        let cfg = Config::default();
        store.pin_anchor("a", "a", "", 0).unwrap();
        store.pin_anchor("b", "b", "", 0).unwrap();
        store.pin_anchor("lone", "lone", "", 0).unwrap();
        store.forge_link("l-ab", "a", "b", 0, "").unwrap();
        store.forge_link("l-ba", "b", "a", 0, "").unwrap();

        let report = execute(&store, &cfg, Command::Validate).unwrap();
        assert!(report.contains("orphans:        lone"));
        assert!(report.contains("cycles from:    a, b"));
        assert!(report.contains("links anchored: true"));
    }

    #[test]
    fn export_writes_parseable_json_file() {
        let store = MemoryStore::new();
        let cfg = Config::default();
        store.pin_anchor("a", "alpha", "", 1).unwrap();
        store.pin_anchor("b", "beta", "", 2).unwrap();
        store.forge_link("l-ab", "a", "b", 0, "").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let msg = execute(
            &store,
            &cfg,
            Command::Export { path: Some(path.to_string_lossy().into_owned()) },
        )
        .unwrap();
        assert!(msg.contains("exported 2 anchors"));

        let text = std::fs::read_to_string(&path).unwrap();
        let back: lattice_graph::LatticeExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.nodes.len(), 2);
        assert_eq!(back.links.len(), 1);
    }

    #[test]
    fn epoch_command_advances() {
        let store = MemoryStore::new();
        let cfg = Config::default();
        assert!(execute(&store, &cfg, Command::Epoch).unwrap().contains("1"));
        assert_eq!(store.epoch(), 1);
    }
}
