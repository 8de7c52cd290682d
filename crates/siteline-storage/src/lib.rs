//! Siteline storage crate - SQLite persistence sink.
//!
//! Provides a WAL-mode SQLite database with migrations and repositories for
//! contact-form submissions, job applications, and archived chatbot leads.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{ApplicationRepository, ContactRepository, LeadArchiveRow, LeadRepository};
