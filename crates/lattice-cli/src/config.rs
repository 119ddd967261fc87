//! CLI configuration loaded from environment variables.
//!
//! All settings have safe defaults. Override any variable at process
//! startup — no config file required.
//!
//! | Variable                | Default               | Description                                 |
//! |-------------------------|-----------------------|---------------------------------------------|
//! | `MINDMASTER_CAPACITY`   | `4096`                | Maximum anchors held by the store           |
//! | `MINDMASTER_LOG_LEVEL`  | `info`                | tracing filter (trace/debug/info/warn/error)|
//! | `MINDMASTER_RENDER_DEPTH` | `64`                | Render depth cap (hard limit stays 64)      |
//! | `MINDMASTER_EXPORT_PATH` | `lattice-export.json`| Default path for `export`                   |

use lattice_graph::{DEFAULT_CAPACITY, MAX_TRAVERSAL_DEPTH};

/// Runtime configuration for the `mindmaster` binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum anchors the store will hold.
    pub capacity: usize,

    /// Tracing filter string, e.g. `"lattice_graph=debug,info"`.
    pub log_level: String,

    /// Depth passed to the renderer (clamped to 64 by the core).
    pub render_depth: usize,

    /// Where `export` writes when no path is given.
    pub export_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            capacity: env_parse("MINDMASTER_CAPACITY", DEFAULT_CAPACITY),
            log_level: std::env::var("MINDMASTER_LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            render_depth: env_parse("MINDMASTER_RENDER_DEPTH", MAX_TRAVERSAL_DEPTH),
            export_path: std::env::var("MINDMASTER_EXPORT_PATH")
                .unwrap_or_else(|_| "lattice-export.json".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            log_level: "info".into(),
            render_depth: MAX_TRAVERSAL_DEPTH,
            export_path: "lattice-export.json".into(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_core_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.render_depth, MAX_TRAVERSAL_DEPTH);
        assert_eq!(cfg.log_level, "info");
    }
}
