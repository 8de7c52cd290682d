//! Siteline application binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Open the SQLite database
//! 3. Build the email sender, notifier and completion-provider gate
//! 4. Start the background session eviction loop
//! 5. Start the axum API server

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use siteline_api::routes;
use siteline_api::state::AppState;
use siteline_chat::{ChatEngine, InMemorySessionStore, ProviderGate};
use siteline_core::config::{expand_home, EmailConfig, SitelineConfig};
use siteline_notify::{DisabledEmailSender, EmailSender, Notifier, SmtpEmailSender};
use siteline_storage::{Database, LeadRepository};

use crate::cli::CliArgs;

fn build_email_sender(config: &EmailConfig) -> Arc<dyn EmailSender> {
    if !config.enabled {
        tracing::info!("Email notifications disabled in config");
        return Arc::new(DisabledEmailSender::new("email disabled in config"));
    }
    match SmtpEmailSender::from_config(config) {
        Ok(sender) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP sender ready");
            Arc::new(sender)
        }
        Err(e) => {
            tracing::warn!(error = %e, "SMTP misconfigured; notifications will not be sent");
            Arc::new(DisabledEmailSender::new(e.to_string()))
        }
    }
}

/// Periodically drop expired sessions and idle locks.
async fn session_eviction_loop(engine: Arc<ChatEngine>, interval_secs: u64) {
    tracing::info!(interval_secs, "Session eviction loop started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        interval.tick().await;
        match engine.evict_expired().await {
            Ok(0) => {}
            Ok(evicted) => tracing::debug!(evicted, "Expired sessions evicted"),
            Err(e) => tracing::warn!(error = %e, "Session eviction failed"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = SitelineConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Siteline v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = expand_home(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("siteline.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Notifications and completion provider.
    let notifier = Arc::new(Notifier::from_config(
        build_email_sender(&config.email),
        &config.email,
    ));
    let provider_path = expand_home(&config.provider.config_path);
    let gate = Arc::new(ProviderGate::from_file(
        provider_path,
        Duration::from_secs(config.provider.timeout_secs),
    ));

    // Chat engine.
    let store = Arc::new(InMemorySessionStore::new(config.chatbot.session_ttl_minutes));
    let engine = ChatEngine::from_config(&config, store, gate, notifier)
        .with_archive(Arc::new(LeadRepository::new(Arc::clone(&db))));

    let state = AppState::new(config.clone(), engine, db);

    // === Background tasks ===

    if config.chatbot.session_ttl_minutes == 0 {
        tracing::info!("Session expiry disabled; sessions live until cleared");
    }
    // Prunes idle session locks even when expiry is off.
    let engine = Arc::clone(&state.engine);
    let every = config.chatbot.eviction_interval_secs;
    tokio::spawn(async move {
        session_eviction_loop(engine, every).await;
    });

    // === API server ===

    let addr = format!("{}:{}", config.general.host, config.general.port);
    let router = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind - is another instance running?");
            tracing::error!("Try: SITELINE_PORT={} siteline", config.general.port.saturating_add(1));
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
