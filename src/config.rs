/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Name advertised in the UCI `id name` line.
    pub name: String,
    /// Author advertised in the UCI `id author` line.
    pub author: String,
    /// Search depth used when no limit is given.
    pub default_depth: u32,
    /// Time budget in milliseconds applied to searches that give no
    /// `movetime` of their own; 0 = unlimited.
    pub default_movetime_ms: u64,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        EngineConfig {
            name: std::env::var("IRONPAWN_NAME").unwrap_or_else(|_| "ironpawn".to_string()),
            author: std::env::var("IRONPAWN_AUTHOR")
                .unwrap_or_else(|_| "the ironpawn developers".to_string()),
            default_depth: std::env::var("IRONPAWN_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
            default_movetime_ms: std::env::var("IRONPAWN_MOVETIME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            name: "ironpawn".to_string(),
            author: "the ironpawn developers".to_string(),
            default_depth: 4,
            default_movetime_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.name, "ironpawn");
        assert_eq!(config.default_depth, 4);
        assert_eq!(config.default_movetime_ms, 0);
    }

    #[test]
    fn from_env_defaults() {
        // Without the env vars set, fall back to defaults.
        let config = EngineConfig::from_env();
        assert_eq!(config.default_depth, 4);
        assert_eq!(config.default_movetime_ms, 0);
    }
}
