/// Console configuration
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sfscon_admin_client::ClientConfig;
use sfscon_admin_views::ExportPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file picked up from the working directory when no
/// `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "sfscon-admin.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default = "default_session")]
    pub session: SessionSettings,

    #[serde(default = "default_export")]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Directory holding the stored token
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Send the active search term along with CSV exports
    #[serde(default)]
    pub include_search: bool,
}

impl AdminConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` must exist when given; otherwise `sfscon-admin.toml` is read if
    /// present. Environment variables prefixed with `SFSCON_ADMIN_` override
    /// both, with `__` between section and key
    /// (`SFSCON_ADMIN_API__BASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SFSCON_ADMIN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Replace the API base URL, e.g. from a command-line flag.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!(
                "API base URL must start with http:// or https:// (got {:?}, set SFSCON_ADMIN_API__BASE_URL)",
                self.api.base_url
            );
        }

        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }

        if self.api.connect_timeout_secs == 0 {
            bail!("api.connect_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url.trim())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
            .with_connect_timeout(Duration::from_secs(self.api.connect_timeout_secs))
    }

    pub fn export_policy(&self) -> ExportPolicy {
        ExportPolicy {
            include_search: self.export.include_search,
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        base_url: default_base_url(),
        timeout_secs: default_timeout_secs(),
        connect_timeout_secs: default_connect_timeout_secs(),
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_session() -> SessionSettings {
    SessionSettings {
        data_dir: default_data_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.sfscon-admin")
}

fn default_export() -> ExportSettings {
    ExportSettings {
        output_dir: default_output_dir(),
        include_search: false,
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            session: default_session(),
            export: default_export(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AdminConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.export_policy().include_search);
        assert_eq!(config.client_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_file_fills_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://admin.example.org\"\n\n[export]\ninclude_search = true"
        )
        .unwrap();

        let config = AdminConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://admin.example.org");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.export.include_search);
        assert_eq!(config.session.data_dir, PathBuf::from("./.sfscon-admin"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AdminConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_validation() {
        let config = AdminConfig::default().with_base_url(Some("admin.example.org".into()));
        assert!(config.validate().is_err());

        let mut config = AdminConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_override() {
        let config = AdminConfig::default().with_base_url(Some("https://x.example".into()));
        assert_eq!(config.client_config().url, "https://x.example");

        let config = AdminConfig::default().with_base_url(None);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }
}
