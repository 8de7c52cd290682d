pub mod config;
pub mod error;
pub mod types;

pub use config::SitelineConfig;
pub use error::{Result, SitelineError};
pub use types::*;
