use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Next BRUSS
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NextBrussConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings (optional; in-memory store when absent)
    pub database: Option<DatabaseConfig>,
    /// Read cache settings
    pub cache: CacheConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Session settings
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database URL (SQLite file path or connection string)
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Enable automatic migrations
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// Upper bound on staleness for entries nobody invalidated
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    pub max_sessions: u64,
    pub session_idle_minutes: u64,
    /// Pre-registered sessions, for development and demos only
    #[serde(default)]
    pub static_sessions: Vec<StaticSession>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StaticSession {
    pub token: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl Default for NextBrussConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1:3000".to_string(),
            },
            database: None,
            cache: CacheConfig {
                max_capacity: 10_000,
                ttl_seconds: 300, // 5 minutes
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
            auth: AuthConfig {
                cookie_name: "bruss_session".to_string(),
                max_sessions: 5_000,
                session_idle_minutes: 480, // one shift
                static_sessions: Vec::new(),
            },
        }
    }
}

impl NextBrussConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (next-bruss.toml, .next-bruss-rc, or an explicit path)
    /// 3. Environment variables (prefixed with NEXT_BRUSS_, nested with `__`)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None => {
                if Path::new("next-bruss.toml").exists() {
                    builder = builder.add_source(File::with_name("next-bruss"));
                }
                if Path::new(".next-bruss-rc").exists() {
                    builder = builder.add_source(
                        File::with_name(".next-bruss-rc").format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // Override with environment variables
        builder = builder.add_source(
            Environment::with_prefix("NEXT_BRUSS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let config = NextBrussConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: NextBrussConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(
            file.path(),
            r#"
[server]
bind_address = "0.0.0.0:8080"

[database]
url = "sqlite://bruss.db"
max_connections = 4
auto_migrate = true

[[auth.static_sessions]]
token = "dev-quality"
email = "quality@bruss.example"
roles = ["quality"]
"#,
        )
        .unwrap();

        let config = NextBrussConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database.as_ref().unwrap().max_connections, 4);
        assert_eq!(config.auth.static_sessions.len(), 1);
        assert_eq!(config.auth.cookie_name, "bruss_session");
        assert_eq!(config.cache.ttl_seconds, 300);
    }
}
