//! Chatbot core for Siteline.
//!
//! Routes each inbound message either through the guided nine-step lead
//! collection flow or to a text-completion provider, falling back to canned
//! replies when the provider is unavailable. Sessions live in a pluggable
//! store with per-session serialisation and idle expiry.

pub mod archive;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod intent;
pub mod lead;
pub mod provider;
pub mod router;
pub mod session;
pub mod steps;
pub mod transcript;

pub use archive::LeadArchive;
pub use engine::{ChatEngine, ChatReply, ChatSettings};
pub use error::ChatError;
pub use extract::{AnswerExtractor, Extraction};
pub use fallback::FallbackResponder;
pub use intent::{FallbackIntent, IntentDetector};
pub use lead::{LeadFlow, LeadOutcome};
pub use provider::{
    Availability, CompletionProvider, HttpCompletionProvider, ProviderGate, ProviderSettings,
};
pub use router::CompletionRouter;
pub use session::{InMemorySessionStore, Session, SessionLocks, SessionStore};
pub use steps::{StepQuestion, STEP_QUESTIONS};
pub use transcript::Transcript;
