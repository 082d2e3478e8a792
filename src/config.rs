use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the newsroom site, e.g. "http://127.0.0.1:5000/"
    pub base_url: String,
    /// Page loaded on startup, resolved against `base_url`
    pub start_path: String,
    /// How long a notification stays on screen
    pub notification_timeout_ms: u64,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout. Requests wait for the network layer when unset.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Extra `module=level` directives, e.g. {"reqwest": "warn"}
    pub module_levels: HashMap<String, String>,
    pub log_directory: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            start_path: "/".to_string(),
            notification_timeout_ms: 3500,
            network: NetworkConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            user_agent: concat!("newsroom-tui/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            module_levels: HashMap::new(),
            log_directory: None,
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl LoggingConfig {
    /// Filter directives in `EnvFilter` syntax.
    pub fn filter_directives(&self) -> String {
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort();
        let mut filter = self.level.clone();
        for (module, level) in modules {
            filter.push_str(&format!(",{}={}", module, level));
        }
        filter
    }
}

impl AppConfig {
    pub fn load() -> Self {
        // Look for config.ron in current directory or next to executable
        let mut candidates = vec![PathBuf::from("config.ron")];

        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        for path in candidates {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match Self::parse(&content) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse config at {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site_behaviour() {
        let config = AppConfig::default();
        assert_eq!(config.notification_timeout(), Duration::from_millis(3500));
        assert_eq!(config.network.request_timeout(), None);
        assert_eq!(config.start_path, "/");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config = AppConfig::parse(
            r#"(
    // Local dev server
    base_url: "http://localhost:8080/",
    network: (request_timeout_secs: Some(30)),
)"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/");
        assert_eq!(config.network.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.network.user_agent.starts_with("newsroom-tui/"));
        assert_eq!(config.notification_timeout_ms, 3500);
    }

    #[test]
    fn filter_directives_include_module_levels() {
        let mut logging = LoggingConfig::default();
        logging
            .module_levels
            .insert("reqwest".to_string(), "warn".to_string());
        logging
            .module_levels
            .insert("hyper".to_string(), "error".to_string());

        assert_eq!(logging.filter_directives(), "info,hyper=error,reqwest=warn");
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(AppConfig::parse("(base_url: 42)").is_err());
    }
}
