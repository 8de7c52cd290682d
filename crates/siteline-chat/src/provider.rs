//! Text-completion provider and its lazily validated gate.
//!
//! The provider is configured from its own TOML file (`base_url`, `api_key`,
//! optional `model`, `chat_id`, `user_id`). [`ProviderGate`] validates that
//! file at most once per process; concurrent first callers share the same
//! validation run. A failed validation is not fatal: the gate reports the
//! provider as unavailable and the router answers with canned replies.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use siteline_core::types::ChatTurn;

use crate::error::ChatError;

/// Produces one assistant completion for a transcript.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError>;
}

// =============================================================================
// Settings
// =============================================================================

/// Contents of the provider configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl ProviderSettings {
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatError::ProviderConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| ChatError::ProviderConfig(format!("invalid {}: {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ChatError::ProviderConfig("base_url is empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ChatError::ProviderConfig(format!(
                "base_url must be an http(s) URL, got {base_url}"
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(ChatError::ProviderConfig("api_key is empty".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// HTTP provider
// =============================================================================

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-style `/chat/completions` client.
pub struct HttpCompletionProvider {
    settings: ProviderSettings,
    client: Client,
}

impl HttpCompletionProvider {
    pub fn new(settings: ProviderSettings, timeout: Duration) -> Result<Self, ChatError> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ChatError::ProviderConfig(format!("HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, turns: &'a [ChatTurn]) -> CompletionRequest<'a> {
        CompletionRequest {
            messages: turns
                .iter()
                .map(|t| WireMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
            model: self.settings.model.as_deref(),
            chat_id: self.settings.chat_id.as_deref(),
            user: self.settings.user_id.as_deref(),
        }
    }
}

fn parse_completion(body: CompletionResponse) -> Result<String, ChatError> {
    let text = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ChatError::Provider("no choices in response".to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::Provider("empty completion".to_string()));
    }
    Ok(text.to_string())
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.settings.api_key)
            .json(&self.build_request(turns))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!("HTTP {status}: {error_text}")));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Provider(format!("invalid response: {e}")))?;
        parse_completion(body)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Outcome of provider validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    pub error: Option<String>,
}

enum GateSource {
    File { path: PathBuf, timeout: Duration },
    Ready(Arc<dyn CompletionProvider>),
    Disabled(String),
}

type Validated = Result<Arc<dyn CompletionProvider>, String>;

/// Validate-once access to the completion provider.
pub struct ProviderGate {
    source: GateSource,
    cell: OnceCell<Validated>,
}

impl ProviderGate {
    /// Validate the provider file at `path` on first use.
    pub fn from_file(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::with_source(GateSource::File {
            path: path.into(),
            timeout,
        })
    }

    /// Use an already-built provider.
    pub fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_source(GateSource::Ready(provider))
    }

    /// A gate that always reports the provider unavailable.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::with_source(GateSource::Disabled(reason.into()))
    }

    fn with_source(source: GateSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    async fn validated(&self) -> &Validated {
        self.cell
            .get_or_init(|| async {
                let result = match &self.source {
                    GateSource::File { path, timeout } => ProviderSettings::load(path)
                        .and_then(|settings| HttpCompletionProvider::new(settings, *timeout))
                        .map(|p| Arc::new(p) as Arc<dyn CompletionProvider>)
                        .map_err(|e| e.to_string()),
                    GateSource::Ready(provider) => Ok(provider.clone()),
                    GateSource::Disabled(reason) => Err(reason.clone()),
                };
                match &result {
                    Ok(_) => info!("Completion provider available"),
                    Err(e) => warn!(error = %e, "Completion provider unavailable; using fallback replies"),
                }
                result
            })
            .await
    }

    /// The provider, if validation succeeded.
    pub async fn provider(&self) -> Option<Arc<dyn CompletionProvider>> {
        self.validated().await.as_ref().ok().cloned()
    }

    pub async fn availability(&self) -> Availability {
        match self.validated().await {
            Ok(_) => Availability {
                available: true,
                error: None,
            },
            Err(e) => Availability {
                available: false,
                error: Some(e.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteline_core::types::Role;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_provider_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn make_settings() -> ProviderSettings {
        ProviderSettings {
            base_url: "https://llm.example.com/v1/".to_string(),
            api_key: "sk-test".to_string(),
            model: Some("small".to_string()),
            chat_id: None,
            user_id: Some("site".to_string()),
        }
    }

    #[test]
    fn test_settings_load_valid_file() {
        let file = write_provider_file(
            "base_url = \"https://llm.example.com/v1\"\napi_key = \"sk-abc\"\nchat_id = \"c1\"\n",
        );
        let settings = ProviderSettings::load(file.path()).unwrap();
        assert_eq!(settings.api_key, "sk-abc");
        assert_eq!(settings.chat_id.as_deref(), Some("c1"));
        assert!(settings.model.is_none());
    }

    #[test]
    fn test_settings_validation_errors() {
        let file = write_provider_file("base_url = \"https://x\"\napi_key = \"  \"\n");
        let err = ProviderSettings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("api_key is empty"));

        let mut settings = make_settings();
        settings.base_url = "ftp://x".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_missing_file() {
        let err = ProviderSettings::load(Path::new("/nonexistent/provider.toml")).unwrap_err();
        assert!(matches!(err, ChatError::ProviderConfig(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let provider =
            HttpCompletionProvider::new(make_settings(), Duration::from_secs(1)).unwrap();
        assert_eq!(provider.chat_url(), "https://llm.example.com/v1/chat/completions");

        let turns = vec![ChatTurn::system("sys"), ChatTurn::user("hi")];
        let body = serde_json::to_value(provider.build_request(&turns)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["model"], "small");
        assert_eq!(body["user"], "site");
        assert!(body.get("chat_id").is_none());
    }

    #[test]
    fn test_parse_completion() {
        let body: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" Hello! "}}]}"#,
        )
        .unwrap();
        assert_eq!(parse_completion(body).unwrap(), "Hello!");

        let empty: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert!(parse_completion(empty).is_err());

        let none: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parse_completion(none).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_errors() {
        let mut settings = make_settings();
        settings.base_url = "http://127.0.0.1:1".to_string();
        let provider = HttpCompletionProvider::new(settings, Duration::from_secs(2)).unwrap();
        let result = provider.complete(&[ChatTurn::user("hi")]).await;
        assert!(matches!(result, Err(ChatError::Provider(_))));
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for CountingProvider {
        async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(turns[0].role, Role::System);
            Ok("ok".to_string())
        }
    }

    #[tokio::test]
    async fn test_gate_from_missing_file_is_unavailable() {
        let gate = ProviderGate::from_file("/nonexistent/provider.toml", Duration::from_secs(1));
        let availability = gate.availability().await;
        assert!(!availability.available);
        assert!(availability.error.unwrap().contains("cannot read"));
        assert!(gate.provider().await.is_none());
    }

    #[tokio::test]
    async fn test_gate_from_valid_file() {
        let file = write_provider_file("base_url = \"http://localhost:9\"\napi_key = \"k\"\n");
        let gate = ProviderGate::from_file(file.path(), Duration::from_secs(1));
        assert_eq!(
            gate.availability().await,
            Availability {
                available: true,
                error: None
            }
        );
    }

    #[tokio::test]
    async fn test_gate_validates_once() {
        let file = write_provider_file("base_url = \"http://localhost:9\"\napi_key = \"k\"\n");
        let path = file.path().to_path_buf();
        let gate = ProviderGate::from_file(&path, Duration::from_secs(1));
        assert!(gate.availability().await.available);

        // Later edits are not picked up: the first result is memoised.
        std::fs::write(&path, "garbage").unwrap();
        assert!(gate.availability().await.available);
    }

    #[tokio::test]
    async fn test_gate_with_provider_and_disabled() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let gate = ProviderGate::with_provider(provider.clone());
        let p = gate.provider().await.unwrap();
        assert_eq!(p.complete(&[ChatTurn::system("s")]).await.unwrap(), "ok");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let disabled = ProviderGate::disabled("no credentials");
        let availability = disabled.availability().await;
        assert!(!availability.available);
        assert_eq!(availability.error.as_deref(), Some("no credentials"));
    }
}
