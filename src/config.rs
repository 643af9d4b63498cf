use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ChatWidgetError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";
pub const DEFAULT_CONTEXT_KEY: &str = "ayurDoshaResult";
pub const DEFAULT_APOLOGY_MESSAGE: &str = "Sorry, I'm having trouble connecting right now.";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_chat_path() -> String {
    DEFAULT_CHAT_PATH.to_string()
}

fn default_context_key() -> String {
    DEFAULT_CONTEXT_KEY.to_string()
}

fn default_apology_message() -> String {
    DEFAULT_APOLOGY_MESSAGE.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WidgetConfig {
    #[serde(default = "default_server_url", alias = "server")]
    pub server_url: String,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    #[serde(default = "default_context_key")]
    pub context_key: String,
    /// Local storage file. `None` resolves under the app root.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default = "default_apology_message")]
    pub apology_message: String,
    /// Chat requests carry no deadline unless this is set.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// Escape raw backend replies before formatting instead of trusting them as markup.
    #[serde(default)]
    pub escape_backend_markup: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::convention_defaults()
    }
}

impl WidgetConfig {
    pub fn convention_defaults() -> Self {
        Self {
            server_url: default_server_url(),
            chat_path: default_chat_path(),
            context_key: default_context_key(),
            storage_path: None,
            apology_message: default_apology_message(),
            request_timeout_seconds: None,
            escape_backend_markup: false,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ChatWidgetError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: WidgetConfig = serde_json::from_str(&raw)
            .map_err(|e| ChatWidgetError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`WidgetConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::convention_defaults())
            }
            Err(err) => Err(ChatWidgetError::Config(format!(
                "failed to stat {}: {err}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let server = self.server_url.trim();
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(ChatWidgetError::Config(format!(
                "server_url must be an http(s) url, got `{}`",
                self.server_url
            )));
        }
        if self.context_key.trim().is_empty() {
            return Err(ChatWidgetError::Config(
                "context_key cannot be empty".to_string(),
            ));
        }
        if self.request_timeout_seconds == Some(0) {
            return Err(ChatWidgetError::Config(
                "request_timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn chat_url(&self) -> String {
        let chat_path = self.chat_path.trim();
        if chat_path.starts_with("http://") || chat_path.starts_with("https://") {
            return chat_path.to_string();
        }
        let base = self.server_url.trim().trim_end_matches('/');
        let path = chat_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(crate::runtime_paths::default_storage_path)
    }
}
