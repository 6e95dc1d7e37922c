use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfidanteError, Result};
use crate::types::ContactDetails;

/// Top-level configuration for the Confidante site services.
///
/// Loaded from `~/.confidante/config.toml` by default. Every section has
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidanteConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub blog: BlogConfig,
}

impl ConfidanteConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConfidanteConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfidanteError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second accepted on `/api/*` routes.
    pub rate_limit_per_sec: u64,
    /// Extra CORS origins. Localhost on `port` and `port + 1` is always allowed.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            rate_limit_per_sec: 50,
            allowed_origins: Vec::new(),
        }
    }
}

/// Chat widget pacing and session limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Delay before the greeting appears in a new session.
    pub greeting_delay_ms: u64,
    /// Delay between a user selection and the bot reply.
    pub response_delay_ms: u64,
    /// Settle delay after an email reply before the mail composer opens.
    pub email_action_delay_ms: u64,
    /// Settle delay after a phone reply before dialing.
    pub phone_action_delay_ms: u64,
    /// Settle delay after a form reply before scrolling to the form.
    pub form_action_delay_ms: u64,
    /// Maximum number of concurrently open chat sessions.
    pub max_sessions: usize,
    /// Seconds without a selection or lookup before a session is closed.
    /// Zero keeps sessions until they are closed explicitly.
    pub idle_timeout_secs: u64,
    /// Optional path to a dialogue JSON file replacing the embedded graph.
    pub dialogue_path: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting_delay_ms: 2000,
            response_delay_ms: 800,
            email_action_delay_ms: 2000,
            phone_action_delay_ms: 2000,
            form_action_delay_ms: 1000,
            max_sessions: 1000,
            idle_timeout_secs: 1800,
            dialogue_path: None,
        }
    }
}

/// Contact coordinates used by the contact endpoint and chat actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Address echoed back to the contact form as `recipientEmail`.
    pub recipient_email: String,
    pub mail_to: String,
    pub mail_subject: String,
    pub phone_number: String,
    pub form_element_id: String,
}

impl ContactConfig {
    pub fn details(&self) -> ContactDetails {
        ContactDetails {
            mail_to: self.mail_to.clone(),
            mail_subject: self.mail_subject.clone(),
            phone_number: self.phone_number.clone(),
            form_element_id: self.form_element_id.clone(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient_email: "rakshat6501@gmail.com".to_string(),
            mail_to: "helpatconfidante@gmail.com".to_string(),
            mail_subject: "Inquiry from Confidante Website".to_string(),
            phone_number: "+919839154888".to_string(),
            form_element_id: "contact-form".to_string(),
        }
    }
}

/// Blog catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Default number of related posts returned for a post.
    pub related_limit: usize,
    /// Optional path to a posts JSON file replacing the embedded catalog.
    pub posts_path: Option<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            related_limit: 3,
            posts_path: None,
        }
    }
}
