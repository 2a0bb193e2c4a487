use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub analysis: AnalysisConfig,
    pub credits: CreditsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Without a url the service keeps accounts and history in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// External bill analysis endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    /// Credits granted when an account is first seen
    pub signup_grant: i64,
    /// Credits consumed per completed analysis
    pub cost_per_analysis: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig::default(),
            analysis: AnalysisConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_secs: 60,
            },
            credits: CreditsConfig {
                signup_grant: 5,
                cost_per_analysis: 1,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then `medbill.toml` if present, then
    /// `MEDBILL__*` environment variables. `DATABASE_URL` wins for the database.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port)?
            .set_default("analysis.base_url", defaults.analysis.base_url)?
            .set_default("analysis.timeout_secs", defaults.analysis.timeout_secs)?
            .set_default("credits.signup_grant", defaults.credits.signup_grant)?
            .set_default("credits.cost_per_analysis", defaults.credits.cost_per_analysis)?
            .add_source(File::with_name("medbill").required(false))
            .add_source(Environment::with_prefix("MEDBILL").separator("__").try_parsing(true))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// Trailing slashes are stripped so paths can be appended directly.
    pub fn analysis_base_url(&self) -> &str {
        self.analysis.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grants_five_credits() {
        let config = AppConfig::default();
        assert_eq!(config.credits.signup_grant, 5);
        assert_eq!(config.credits.cost_per_analysis, 1);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let mut config = AppConfig::default();
        config.analysis.base_url = "https://analysis.example.com/".to_string();
        assert_eq!(config.analysis_base_url(), "https://analysis.example.com");
    }
}
