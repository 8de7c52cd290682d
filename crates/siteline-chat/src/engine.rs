//! Chat engine: the per-message entry point wiring sessions, the lead flow,
//! the completion router and the notifier together.

use std::sync::Arc;

use tracing::{debug, info, warn};

use siteline_core::config::SitelineConfig;
use siteline_notify::Notifier;

use crate::archive::LeadArchive;
use crate::error::ChatError;
use crate::fallback::FallbackResponder;
use crate::lead::{LeadFlow, LeadOutcome};
use crate::provider::{Availability, ProviderGate};
use crate::router::CompletionRouter;
use crate::session::{Session, SessionLocks, SessionStore};

/// Engine limits and defaults.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub max_transcript_turns: usize,
    pub max_message_length: usize,
    pub default_session_id: String,
}

impl ChatSettings {
    pub fn from_config(config: &SitelineConfig) -> Self {
        Self {
            system_prompt: config.chatbot.system_prompt.clone(),
            max_transcript_turns: config.chatbot.max_transcript_turns,
            max_message_length: config.chatbot.max_message_length,
            default_session_id: config.chatbot.default_session_id.clone(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&SitelineConfig::default())
    }
}

/// Reply to one inbound message plus the session state after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
    pub message_count: usize,
    pub lead_collection_mode: bool,
    pub lead_step: u8,
}

pub struct ChatEngine {
    settings: ChatSettings,
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    flow: LeadFlow,
    router: CompletionRouter,
    notifier: Arc<Notifier>,
    archive: Option<Arc<dyn LeadArchive>>,
}

impl ChatEngine {
    pub fn new(
        settings: ChatSettings,
        store: Arc<dyn SessionStore>,
        flow: LeadFlow,
        router: CompletionRouter,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            settings,
            store,
            locks: SessionLocks::new(),
            flow,
            router,
            notifier,
            archive: None,
        }
    }

    /// Assemble an engine from the application config.
    pub fn from_config(
        config: &SitelineConfig,
        store: Arc<dyn SessionStore>,
        gate: Arc<ProviderGate>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self::new(
            ChatSettings::from_config(config),
            store,
            LeadFlow::new(config.company.clone()),
            CompletionRouter::new(gate, FallbackResponder::new(config.company.clone())),
            notifier,
        )
    }

    /// Archive completed leads before they are dispatched.
    pub fn with_archive(mut self, archive: Arc<dyn LeadArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    fn resolve_session_id<'a>(&'a self, session_id: Option<&'a str>) -> &'a str {
        match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                debug!(
                    session_id = %self.settings.default_session_id,
                    "Request without session id; using shared default session"
                );
                &self.settings.default_session_id
            }
        }
    }

    /// Handle one inbound message for a session.
    ///
    /// Only empty or over-long messages produce an error; provider and
    /// notification failures degrade to a reply.
    pub async fn handle_message(
        &self,
        session_id: Option<&str>,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.settings.max_message_length {
            return Err(ChatError::MessageTooLong(self.settings.max_message_length));
        }

        let sid = self.resolve_session_id(session_id);
        let _guard = self.locks.acquire(sid).await?;

        let mut session = match self.store.get(sid).await? {
            Some(session) => session,
            None => {
                debug!(session_id = %sid, "Creating session");
                Session::new(
                    sid,
                    &self.settings.system_prompt,
                    self.settings.max_transcript_turns,
                )
            }
        };

        let response = match self.flow.advance(&mut session.lead, message) {
            LeadOutcome::Reply(text) => text,
            LeadOutcome::Completed => self.complete_lead(&mut session).await,
            LeadOutcome::NotEngaged => self.router.respond(&mut session.transcript, message).await,
        };

        let reply = ChatReply {
            session_id: sid.to_string(),
            response,
            message_count: session.transcript.len(),
            lead_collection_mode: session.lead.is_lead_collection,
            lead_step: session.lead.current_step,
        };

        session.touch();
        self.store.put(session).await?;
        Ok(reply)
    }

    async fn complete_lead(&self, session: &mut Session) -> String {
        let sid = session.id.as_str();
        info!(session_id = %sid, "Lead collection complete");

        let archived = match &self.archive {
            Some(archive) => match archive.archive(sid, &session.lead) {
                Ok(id) => Some((archive, id)),
                Err(e) => {
                    warn!(session_id = %sid, error = %e, "Failed to archive lead");
                    None
                }
            },
            None => None,
        };

        let notified = self.notifier.dispatch_lead(sid, &session.lead).await;
        if !notified {
            warn!(session_id = %sid, "Lead notification failed; sending degraded confirmation");
        }

        if let Some((archive, id)) = archived {
            if let Err(e) = archive.mark_notified(id, notified) {
                warn!(session_id = %sid, lead_id = %id, error = %e, "Failed to update archived lead");
            }
        }

        let message = self.flow.closing_message(&session.lead, notified);
        LeadFlow::reset(&mut session.lead);
        message
    }

    /// Drop the transcript and lead record for a session.
    pub async fn clear_session(&self, session_id: Option<&str>) -> Result<bool, ChatError> {
        let sid = self.resolve_session_id(session_id);
        let guard = self.locks.acquire(sid).await?;
        let removed = self.store.remove(sid).await;
        drop(guard);
        self.locks.release(sid);
        let removed = removed?;
        info!(session_id = %sid, removed, "Session cleared");
        Ok(removed)
    }

    /// Current state of a session, if it exists and has not expired.
    pub async fn session(&self, session_id: &str) -> Result<Option<Session>, ChatError> {
        self.store.get(session_id).await
    }

    /// Remove expired sessions and their idle locks.
    pub async fn evict_expired(&self) -> Result<usize, ChatError> {
        let evicted = self.store.evict_expired().await?;
        self.locks.prune();
        Ok(evicted)
    }

    pub async fn active_sessions(&self) -> Result<usize, ChatError> {
        self.store.len().await
    }

    pub async fn provider_availability(&self) -> Availability {
        self.router.gate().availability().await
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use siteline_core::types::{ChatTurn, Role, NOT_PROVIDED};
    use siteline_notify::{EmailSender, OutboundEmail};
    use siteline_storage::{Database, LeadRepository};

    use crate::provider::CompletionProvider;
    use crate::session::InMemorySessionStore;

    struct RecordingSender {
        sent: Mutex<Vec<OutboundEmail>>,
        succeed: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: &OutboundEmail) -> bool {
            self.sent.lock().unwrap().push(email.clone());
            self.succeed
        }
    }

    struct EchoProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {}", turns.last().unwrap().content))
        }
    }

    fn make_engine(gate: ProviderGate, email_ok: bool) -> (ChatEngine, Arc<RecordingSender>) {
        let config = SitelineConfig::default();
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            succeed: email_ok,
        });
        let notifier = Arc::new(Notifier::from_config(sender.clone(), &config.email));
        let engine = ChatEngine::from_config(
            &config,
            Arc::new(InMemorySessionStore::new(config.chatbot.session_ttl_minutes)),
            Arc::new(gate),
            notifier,
        );
        (engine, sender)
    }

    const ANSWERS: [&str; 9] = [
        "Jane Doe",
        "jane@example.com",
        "skip",
        "Doe Bakery",
        "business website",
        "online booking",
        "£1,000-£3,000",
        "within 1 month",
        "none",
    ];

    #[tokio::test]
    async fn test_rejects_empty_and_long_messages() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        assert!(matches!(
            engine.handle_message(Some("s"), "").await,
            Err(ChatError::EmptyMessage)
        ));
        let long = "a".repeat(2001);
        assert!(matches!(
            engine.handle_message(Some("s"), &long).await,
            Err(ChatError::MessageTooLong(2000))
        ));
        assert_eq!(engine.active_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_free_form_message_uses_provider() {
        let provider = Arc::new(EchoProvider {
            calls: AtomicUsize::new(0),
        });
        let (engine, _) = make_engine(ProviderGate::with_provider(provider.clone()), true);

        let reply = engine.handle_message(Some("s1"), "What is SEO?").await.unwrap();
        assert_eq!(reply.response, "echo: What is SEO?");
        assert_eq!(reply.message_count, 3);
        assert!(!reply.lead_collection_mode);
        assert_eq!(reply.lead_step, 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_lead_flow() {
        let (engine, sender) = make_engine(ProviderGate::disabled("off"), true);
        let sid = Some("visitor-42");

        let reply = engine
            .handle_message(sid, "I need a website for my shop")
            .await
            .unwrap();
        assert!(reply.response.contains("what's your name?"));
        assert!(reply.lead_collection_mode);
        assert_eq!(reply.lead_step, 1);

        let reply = engine.handle_message(sid, "Jane Doe").await.unwrap();
        assert!(reply.response.contains("Jane Doe"));
        assert!(reply.response.contains("email address"));
        assert_eq!(reply.lead_step, 2);

        let reply = engine.handle_message(sid, "not-an-email").await.unwrap();
        assert!(reply.response.starts_with("I didn't quite catch that."));
        assert_eq!(reply.lead_step, 2);

        let reply = engine.handle_message(sid, "jane@example.com").await.unwrap();
        assert!(reply.response.contains("jane@example.com"));
        assert!(reply.response.contains("phone number"));
        assert_eq!(reply.lead_step, 3);

        let reply = engine.handle_message(sid, "skip").await.unwrap();
        assert_eq!(reply.lead_step, 4);
        let session = engine.session("visitor-42").await.unwrap().unwrap();
        assert_eq!(session.lead.phone.as_deref(), Some(NOT_PROVIDED));

        let mut last = reply;
        for (i, answer) in ANSWERS[3..].iter().enumerate() {
            last = engine.handle_message(sid, answer).await.unwrap();
            if i < 5 {
                assert_eq!(last.lead_step, (i + 5) as u8);
                assert!(last.lead_collection_mode);
            }
        }
        assert!(last.response.contains("Jane Doe"));
        assert!(last.response.contains("sent your project details"));
        assert_eq!(last.lead_step, 0);
        assert!(!last.lead_collection_mode);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Website Lead: Jane Doe - Doe Bakery");
    }

    #[tokio::test]
    async fn test_failed_notification_gives_degraded_closing() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), false);
        engine.handle_message(None, "build a website").await.unwrap();
        let mut last = None;
        for answer in ANSWERS {
            last = Some(engine.handle_message(None, answer).await.unwrap());
        }
        let last = last.unwrap();
        assert!(last.response.contains("recorded your project details"));
        assert!(last.response.contains("jane@example.com"));
        assert_eq!(last.lead_step, 0);
    }

    #[tokio::test]
    async fn test_completed_lead_is_archived() {
        let config = SitelineConfig::default();
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            succeed: true,
        });
        let repo = Arc::new(LeadRepository::new(Arc::new(Database::in_memory().unwrap())));
        let engine = ChatEngine::from_config(
            &config,
            Arc::new(InMemorySessionStore::without_expiry()),
            Arc::new(ProviderGate::disabled("off")),
            Arc::new(Notifier::from_config(sender, &config.email)),
        )
        .with_archive(repo.clone());

        engine.handle_message(Some("a"), "need a website").await.unwrap();
        for answer in ANSWERS {
            engine.handle_message(Some("a"), answer).await.unwrap();
        }

        let rows = repo.list_recent(10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].session_id, "a");
        assert!(rows[0].notified);
        assert_eq!(rows[0].lead.company_name.as_deref(), Some("Doe Bakery"));
    }

    #[tokio::test]
    async fn test_clear_session_starts_fresh() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        engine.handle_message(Some("x"), "hello").await.unwrap();
        engine.handle_message(Some("x"), "need a website").await.unwrap();
        engine.handle_message(Some("x"), "Jane Doe").await.unwrap();

        assert_eq!(engine.locks.len(), 1);
        assert!(engine.clear_session(Some("x")).await.unwrap());
        assert!(engine.session("x").await.unwrap().is_none());
        assert!(engine.locks.is_empty());

        let reply = engine.handle_message(Some("x"), "need a website").await.unwrap();
        assert_eq!(reply.message_count, 1);
        assert_eq!(reply.lead_step, 1);
        let session = engine.session("x").await.unwrap().unwrap();
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript.turns()[0].role, Role::System);
        assert!(session.lead.name.is_none());
    }

    #[tokio::test]
    async fn test_clear_unknown_session() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        assert!(!engine.clear_session(Some("nobody")).await.unwrap());
        assert!(engine.locks.is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_id_uses_default() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        let reply = engine.handle_message(None, "hello").await.unwrap();
        assert_eq!(reply.session_id, "default");
        let reply = engine.handle_message(Some("  "), "hello").await.unwrap();
        assert_eq!(reply.session_id, "default");
        assert_eq!(reply.message_count, 5);
        assert!(engine.session("default").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        engine.handle_message(Some("a"), "need a website").await.unwrap();
        let reply = engine.handle_message(Some("b"), "Jane Doe").await.unwrap();
        assert!(!reply.lead_collection_mode);

        let a = engine.session("a").await.unwrap().unwrap();
        assert_eq!(a.lead.current_step, 1);
        assert_eq!(engine.active_sessions().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_same_session_requests_are_serialised() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        let engine = Arc::new(engine);
        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .handle_message(Some("shared"), &format!("question {i}"))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        // Every turn pair survived: no lost updates.
        let session = engine.session("shared").await.unwrap().unwrap();
        assert_eq!(session.transcript.len(), 17);
    }

    #[tokio::test]
    async fn test_evict_expired_reports_count() {
        let (engine, _) = make_engine(ProviderGate::disabled("off"), true);
        engine.handle_message(Some("a"), "hello").await.unwrap();
        assert_eq!(engine.evict_expired().await.unwrap(), 0);
        assert_eq!(engine.active_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_provider_availability_exposed() {
        let (engine, _) = make_engine(ProviderGate::disabled("missing file"), true);
        let availability = engine.provider_availability().await;
        assert!(!availability.available);
        assert_eq!(availability.error.as_deref(), Some("missing file"));
    }
}
