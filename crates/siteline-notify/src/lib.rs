//! Outbound notifications for Siteline.
//!
//! Renders lead and form summaries as plaintext + HTML email and hands them
//! to a pluggable [`EmailSender`]. Delivery failures are reported as `false`,
//! never as errors, so callers can degrade gracefully.

pub mod error;
pub mod notifier;
pub mod sender;
pub mod templates;

pub use error::NotifyError;
pub use notifier::Notifier;
pub use sender::{DisabledEmailSender, EmailSender, OutboundEmail, SmtpEmailSender};
pub use templates::EmailTemplates;
