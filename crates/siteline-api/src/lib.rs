//! Siteline API crate - axum HTTP surface for the chatbot and site forms.
//!
//! Exposes the chatbot conversation endpoints, the contact and careers
//! form endpoints, and a health check.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
