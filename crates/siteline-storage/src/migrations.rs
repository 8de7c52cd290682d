//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use siteline_core::error::SitelineError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), SitelineError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| SitelineError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| SitelineError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: form submissions and archived chatbot leads.
fn apply_v1(conn: &Connection) -> Result<(), SitelineError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id          TEXT PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL,
            phone       TEXT,
            company     TEXT,
            subject     TEXT,
            message     TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_contact_created
            ON contact_submissions (created_at DESC);

        CREATE TABLE IF NOT EXISTS job_applications (
            id            TEXT PRIMARY KEY NOT NULL,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL,
            phone         TEXT,
            position      TEXT NOT NULL,
            cover_letter  TEXT,
            resume_url    TEXT,
            created_at    INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_applications_position
            ON job_applications (position, created_at DESC);

        CREATE TABLE IF NOT EXISTS chat_leads (
            id          TEXT PRIMARY KEY NOT NULL,
            session_id  TEXT NOT NULL,
            name        TEXT NOT NULL DEFAULT '',
            email       TEXT NOT NULL DEFAULT '',
            payload     TEXT NOT NULL,
            notified    INTEGER NOT NULL DEFAULT 0,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_leads_created
            ON chat_leads (created_at DESC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| SitelineError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}
