//! Configuration system for DocQuery.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.
//! Configuration is loaded from `~/.config/docquery/config.toml` and/or `.docquery/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::{Language, LanguagePair};

/// Port the document backend listens on.
pub const DEFAULT_BACKEND_PORT: u16 = 8000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocQueryConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where and how to reach the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Explicit base URL. When unset it is derived from `client_host` and `port`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Host the client itself is reached on.
    pub client_host: String,
    pub port: u16,
    /// Timeout of the one-shot reachability probe.
    pub probe_timeout_secs: u64,
    /// Optional timeout for query/analysis/translate calls. Unset means the
    /// call holds the busy flag until the backend answers or fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            client_host: "localhost".to_string(),
            port: DEFAULT_BACKEND_PORT,
            probe_timeout_secs: 5,
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Resolve the backend base URL, without a trailing slash.
    ///
    /// Loopback client hosts target `localhost`; any other host is reused so a
    /// backend reachable over the LAN is addressed without hard-coding an IP.
    pub fn resolve_base_url(&self) -> Result<String, ConfigError> {
        if let Some(explicit) = &self.base_url {
            let parsed = url::Url::parse(explicit).map_err(|e| ConfigError::Invalid {
                message: format!("backend.base_url '{explicit}': {e}"),
            })?;
            return Ok(parsed.as_str().trim_end_matches('/').to_string());
        }

        let host = self.client_host.trim();
        if host.is_empty() {
            return Err(ConfigError::Invalid {
                message: "backend.client_host must not be empty".into(),
            });
        }

        if is_loopback_host(host) {
            return Ok(format!("http://localhost:{}", self.port));
        }

        let host = match host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{v6}]"),
            _ => host.to_string(),
        };
        let candidate = format!("http://{}:{}", host, self.port);
        url::Url::parse(&candidate).map_err(|e| ConfigError::Invalid {
            message: format!("backend.client_host '{}': {e}", self.client_host),
        })?;
        Ok(candidate)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn is_loopback_host(host: &str) -> bool {
    let trimmed = host.trim_start_matches('[').trim_end_matches(']');
    if trimmed.eq_ignore_ascii_case("localhost") {
        return true;
    }
    trimmed
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}

/// Translation toggle and language pair. Only consulted when `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub source_lang: Language,
    pub target_lang: Language,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source_lang: Language::De,
            target_lang: Language::En,
        }
    }
}

impl TranslationConfig {
    pub fn languages(&self) -> LanguagePair {
        LanguagePair {
            source: self.source_lang,
            target: self.target_lang,
        }
    }
}

/// Presentation settings for the CLI front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Print results as JSON instead of text.
    pub json_output: bool,
    /// Pages listed per document before collapsing into "+N more".
    pub max_page_chips: usize,
    /// Column width for wrapped answer text.
    pub wrap_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            json_output: false,
            max_page_chips: 10,
            wrap_width: 100,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `DOCQUERY_`)
/// 3. Workspace-local config (`.docquery/config.toml`)
/// 4. User config (`~/.config/docquery/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&DocQueryConfig>,
) -> Result<DocQueryConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(DocQueryConfig::default()));

    if let Some(config_dir) = directories::ProjectDirs::from("dev", "docquery", "docquery") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = ws.join(".docquery").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // DOCQUERY_BACKEND__PORT, DOCQUERY_TRANSLATION__SOURCE_LANG, etc.
    figment = figment.merge(Env::prefixed("DOCQUERY_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Check whether any DocQuery configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "docquery", "docquery")
        && config_dir.config_dir().join("config.toml").exists()
    {
        return true;
    }

    workspace
        .map(|ws| ws.join(".docquery").join("config.toml").exists())
        .unwrap_or(false)
}

/// Write the default configuration to `<workspace>/.docquery/config.toml`.
///
/// Returns `Ok(None)` when a file is already present; it is never overwritten.
pub fn write_default_config(workspace: &Path) -> Result<Option<std::path::PathBuf>, ConfigError> {
    let config_dir = workspace.join(".docquery");
    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        return Ok(None);
    }
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Invalid {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;
    let toml_str =
        toml::to_string_pretty(&DocQueryConfig::default()).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
    std::fs::write(&config_path, toml_str).map_err(|e| ConfigError::Invalid {
        message: format!("cannot write {}: {e}", config_path.display()),
    })?;
    Ok(Some(config_path))
}
