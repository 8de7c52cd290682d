use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Siteline service.
///
/// Loaded from `~/.siteline/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitelineConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chatbot: ChatbotConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub company: CompanyConfig,
}

impl SitelineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SitelineConfig = toml::from_str(&content)?;
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
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Directory for the SQLite database.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            log_level: "info".to_string(),
            data_dir: "~/.siteline/data".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Origins allowed by CORS (the marketing site that embeds the widget).
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Requests per second accepted on the public form and chat routes.
    /// 0 disables limiting.
    pub rate_limit_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_body_bytes: 64 * 1024,
            rate_limit_per_sec: 50,
        }
    }
}

/// Chatbot conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatbotConfig {
    /// First turn of every transcript.
    pub system_prompt: String,
    /// Maximum turns retained per transcript, system turn included.
    pub max_transcript_turns: usize,
    /// Maximum inbound message length in characters.
    pub max_message_length: usize,
    /// Session used when a request omits its session id.
    pub default_session_id: String,
    /// Idle minutes before a session expires. 0 disables expiry.
    pub session_ttl_minutes: u32,
    /// Seconds between background eviction sweeps.
    pub eviction_interval_secs: u64,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_transcript_turns: 20,
            max_message_length: 2000,
            default_session_id: "default".to_string(),
            session_ttl_minutes: 120,
            eviction_interval_secs: 60,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are the friendly website assistant for an IT services \
company offering website design and development, e-commerce, web applications, hosting, \
maintenance and SEO. Answer briefly and helpfully. When a visitor wants a new website, \
encourage them to share their project details so the team can prepare a proposal. \
Never invent prices; point visitors to the contact page for a quote.";

/// Completion-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Path to the provider credentials file (base_url, api_key, ...).
    pub config_path: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            config_path: "~/.siteline/provider.toml".to_string(),
            timeout_secs: 8,
        }
    }
}

/// Outbound email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Whether notification email is sent at all.
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Transport security: "starttls", "tls" or "none".
    pub tls: String,
    pub username: String,
    /// Name of the environment variable holding the SMTP password.
    pub password_env: String,
    /// "From" identity, e.g. `Website <noreply@example.com>`.
    pub from: String,
    /// Addresses that receive lead and form notifications.
    pub notification_recipients: Vec<String>,
    /// Delivery timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            tls: "starttls".to_string(),
            username: String::new(),
            password_env: "SITELINE_SMTP_PASSWORD".to_string(),
            from: "Website <noreply@example.com>".to_string(),
            notification_recipients: vec!["sales@example.com".to_string()],
            timeout_secs: 8,
        }
    }
}

/// Public contact details quoted in fallback and completion replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub contact_url: String,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Siteline IT Services".to_string(),
            phone: "+44 20 7946 0958".to_string(),
            email: "hello@example.com".to_string(),
            contact_url: "/contact".to_string(),
        }
    }
}
