//! Layered server configuration.
//!
//! Defaults, then `config.toml`, then `PERSONA__SECTION__KEY` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

static DEFAULT_DATA_FILE: &str = "~/.local/share/persona-calendar/data.json";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ListenConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
    pub timezone: String,
    pub google: GoogleConfig,
    pub kis: KisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_file: String,
    pub seed_default_personas: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub calendar_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KisConfig {
    pub app_key: Option<String>,
    pub secret_key: Option<String>,
    pub base_url: String,
}

impl ServerConfig {
    /// `<config_dir>/persona-calendar/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("persona-calendar");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from [`ServerConfig::default_path`] when none is
    /// given. A missing file is fine; the defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        Self::load_layers(&path, Self::environment())
    }

    /// `PERSONA__SERVER__PORT=8080` sets `server.port`.
    fn environment() -> Environment {
        Environment::with_prefix("PERSONA")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layers(path: &Path, environment: Environment) -> Result<Self> {
        Self::builder()?
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Defaults only.
    pub fn defaults() -> Result<Self> {
        Self::builder()?
            .build()?
            .try_deserialize()
            .context("Invalid default configuration")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4100)?
            .set_default("storage.data_file", DEFAULT_DATA_FILE)?
            .set_default("storage.seed_default_personas", true)?
            .set_default("log.level", "info")?
            .set_default("log.format", "compact")?
            .set_default("timezone", persona_core::time::KST)?
            .set_default("google.calendar_id", "primary")?
            .set_default("kis.base_url", "https://openapi.koreainvestment.com:9443")?)
    }

    pub fn data_file(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.storage.data_file).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Treat empty strings the same as unset.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl GoogleConfig {
    /// Remote sync is on only when there is at least an access token.
    pub fn credentials(&self) -> Option<persona_provider_google::GoogleCredentials> {
        let access_token = present(&self.access_token)?;
        Some(persona_provider_google::GoogleCredentials {
            client_id: present(&self.client_id).unwrap_or_default().to_string(),
            client_secret: present(&self.client_secret).unwrap_or_default().to_string(),
            access_token: access_token.to_string(),
            refresh_token: present(&self.refresh_token).unwrap_or_default().to_string(),
        })
    }
}

impl KisConfig {
    /// `(app_key, secret_key)` when both are set to something real.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let app_key = present(&self.app_key)?;
        let secret_key = present(&self.secret_key)?;
        (app_key != "YOUR_KIS_APP_KEY_HERE").then_some((app_key, secret_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::defaults().unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:4100");
        assert_eq!(config.timezone, "Asia/Seoul");
        assert_eq!(config.google.calendar_id, "primary");
        assert!(config.storage.seed_default_personas);
        assert!(config.google.credentials().is_none());
        assert!(config.kis.credentials().is_none());
        assert!(!config.data_file().to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[log]
format = "json"

[kis]
app_key = "key"
secret_key = "secret"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.log.format, "json");
        assert_eq!(config.kis.credentials(), Some(("key", "secret")));
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[storage]
data_file = "/srv/from-file.json"
"#,
        )
        .unwrap();

        let vars: config::Map<String, String> = [
            ("PERSONA__SERVER__PORT", "9090"),
            ("PERSONA__STORAGE__DATA_FILE", "/tmp/from-env.json"),
            ("PERSONA__LOG__LEVEL", "debug"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let environment = ServerConfig::environment().source(Some(vars));

        let config = ServerConfig::load_layers(&path, environment).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.data_file(), PathBuf::from("/tmp/from-env.json"));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_placeholder_kis_key_is_ignored() {
        let kis = KisConfig {
            app_key: Some("YOUR_KIS_APP_KEY_HERE".to_string()),
            secret_key: Some("s".to_string()),
            base_url: String::new(),
        };
        assert!(kis.credentials().is_none());
    }

    #[test]
    fn test_google_needs_an_access_token() {
        let google = GoogleConfig {
            client_id: Some("id".to_string()),
            client_secret: None,
            access_token: Some("  ".to_string()),
            refresh_token: None,
            calendar_id: "primary".to_string(),
        };
        assert!(google.credentials().is_none());

        let google = GoogleConfig {
            access_token: Some("ya29".to_string()),
            ..google
        };
        let creds = google.credentials().unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "");
    }
}
