//! Completion/fallback routing for messages outside the lead flow.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::fallback::FallbackResponder;
use crate::provider::ProviderGate;
use crate::transcript::Transcript;

/// Answers free-form messages with the provider, or a canned reply when the
/// provider is unavailable or fails. Never returns an error.
pub struct CompletionRouter {
    gate: Arc<ProviderGate>,
    fallback: FallbackResponder,
}

impl CompletionRouter {
    pub fn new(gate: Arc<ProviderGate>, fallback: FallbackResponder) -> Self {
        Self { gate, fallback }
    }

    pub fn gate(&self) -> &ProviderGate {
        &self.gate
    }

    /// Append the user turn, produce a reply, append the assistant turn.
    pub async fn respond(&self, transcript: &mut Transcript, message: &str) -> String {
        transcript.push_user(message);

        let reply = match self.gate.provider().await {
            Some(provider) => match provider.complete(transcript.turns()).await {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => {
                    warn!("Completion provider returned an empty reply; using fallback");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Completion provider failed; using fallback");
                    None
                }
            },
            None => None,
        };

        let reply = reply.unwrap_or_else(|| {
            debug!("Answering with fallback reply");
            self.fallback.respond(message)
        });

        transcript.push_assistant(reply.clone());
        reply
    }
}
