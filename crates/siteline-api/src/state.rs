//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use siteline_chat::{AnswerExtractor, ChatEngine};
use siteline_core::config::SitelineConfig;
use siteline_notify::Notifier;
use siteline_storage::{ApplicationRepository, ContactRepository, Database};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SitelineConfig>,
    pub engine: Arc<ChatEngine>,
    pub contacts: Arc<ContactRepository>,
    pub applications: Arc<ApplicationRepository>,
    /// Used for form-field email validation.
    pub extractor: Arc<AnswerExtractor>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: SitelineConfig, engine: ChatEngine, database: Arc<Database>) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            contacts: Arc::new(ContactRepository::new(Arc::clone(&database))),
            applications: Arc::new(ApplicationRepository::new(database)),
            extractor: Arc::new(AnswerExtractor::new()),
            start_time: Instant::now(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        self.engine.notifier()
    }
}
