//! Repository implementations for SQLite-backed persistence.
//!
//! Provides ContactRepository, ApplicationRepository, and LeadRepository
//! that operate on the Database struct using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use siteline_core::error::SitelineError;
use siteline_core::types::{ContactSubmission, JobApplication, LeadRecord};

use crate::db::Database;

fn storage_err(e: rusqlite::Error) -> SitelineError {
    SitelineError::Storage(e.to_string())
}

fn parse_id(raw: &str) -> Result<Uuid, SitelineError> {
    Uuid::parse_str(raw).map_err(|e| SitelineError::Storage(format!("Invalid row id: {}", e)))
}

fn from_epoch(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

// =============================================================================
// Contact submissions
// =============================================================================

/// Repository for contact-form submissions.
pub struct ContactRepository {
    db: Arc<Database>,
}

impl ContactRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new submission.
    pub fn save(&self, submission: &ContactSubmission) -> Result<(), SitelineError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contact_submissions (id, name, email, phone, company, subject, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    submission.id.to_string(),
                    submission.name,
                    submission.email,
                    submission.phone,
                    submission.company,
                    submission.subject,
                    submission.message,
                    submission.created_at.timestamp(),
                ],
            )
            .map_err(|e| SitelineError::Storage(format!("Failed to save contact submission: {}", e)))?;
            Ok(())
        })
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<ContactSubmission>, SitelineError> {
        self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, phone, company, subject, message, created_at
                     FROM contact_submissions WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    row_to_contact,
                )
                .optional()
                .map_err(storage_err)?;
            row.transpose()
        })
    }

    pub fn count(&self) -> Result<u64, SitelineError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM contact_submissions", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(storage_err)
        })
    }
}

fn row_to_contact(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<ContactSubmission, SitelineError>> {
    let id: String = row.get(0)?;
    let created_at: i64 = row.get(7)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let phone = row.get(3)?;
    let company = row.get(4)?;
    let subject = row.get(5)?;
    let message = row.get(6)?;
    Ok(parse_id(&id).map(|id| ContactSubmission {
        id,
        name,
        email,
        phone,
        company,
        subject,
        message,
        created_at: from_epoch(created_at),
    }))
}

// =============================================================================
// Job applications
// =============================================================================

/// Repository for careers-page job applications.
pub struct ApplicationRepository {
    db: Arc<Database>,
}

impl ApplicationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, application: &JobApplication) -> Result<(), SitelineError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO job_applications (id, name, email, phone, position, cover_letter, resume_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    application.id.to_string(),
                    application.name,
                    application.email,
                    application.phone,
                    application.position,
                    application.cover_letter,
                    application.resume_url,
                    application.created_at.timestamp(),
                ],
            )
            .map_err(|e| SitelineError::Storage(format!("Failed to save job application: {}", e)))?;
            Ok(())
        })
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<JobApplication>, SitelineError> {
        self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name, email, phone, position, cover_letter, resume_url, created_at
                     FROM job_applications WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    row_to_application,
                )
                .optional()
                .map_err(storage_err)?;
            row.transpose()
        })
    }
}

fn row_to_application(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<JobApplication, SitelineError>> {
    let id: String = row.get(0)?;
    let created_at: i64 = row.get(7)?;
    let name = row.get(1)?;
    let email = row.get(2)?;
    let phone = row.get(3)?;
    let position = row.get(4)?;
    let cover_letter = row.get(5)?;
    let resume_url = row.get(6)?;
    Ok(parse_id(&id).map(|id| JobApplication {
        id,
        name,
        email,
        phone,
        position,
        cover_letter,
        resume_url,
        created_at: from_epoch(created_at),
    }))
}

// =============================================================================
// Archived chatbot leads
// =============================================================================

/// A completed chatbot lead as stored in `chat_leads`.
#[derive(Debug, Clone)]
pub struct LeadArchiveRow {
    pub id: Uuid,
    pub session_id: String,
    pub lead: LeadRecord,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for completed chatbot leads.
///
/// The full record is stored as JSON; name and email are denormalised for
/// lookup.
pub struct LeadRepository {
    db: Arc<Database>,
}

impl LeadRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Archive a completed lead and return its row id.
    pub fn archive(&self, session_id: &str, lead: &LeadRecord) -> Result<Uuid, SitelineError> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_string(lead)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_leads (id, session_id, name, email, payload, notified, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
                rusqlite::params![
                    id.to_string(),
                    session_id,
                    lead.name.as_deref().unwrap_or_default(),
                    lead.email.as_deref().unwrap_or_default(),
                    payload,
                    Utc::now().timestamp(),
                ],
            )
            .map_err(|e| SitelineError::Storage(format!("Failed to archive lead: {}", e)))?;
            Ok(id)
        })
    }

    /// Record whether the notification email for a lead went out.
    pub fn mark_notified(&self, id: Uuid, notified: bool) -> Result<(), SitelineError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE chat_leads SET notified = ?1 WHERE id = ?2",
                rusqlite::params![notified as i32, id.to_string()],
            )
            .map_err(storage_err)?;
            Ok(())
        })
    }

    pub fn list_recent(&self, limit: u64) -> Result<Vec<LeadArchiveRow>, SitelineError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, payload, notified, created_at
                     FROM chat_leads ORDER BY created_at DESC LIMIT ?1",
                )
                .map_err(storage_err)?;
            let rows = stmt
                .query_map(rusqlite::params![limit], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i32>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .map_err(storage_err)?;

            let mut out = Vec::new();
            for row in rows {
                let (id, session_id, payload, notified, created_at) = row.map_err(storage_err)?;
                out.push(LeadArchiveRow {
                    id: parse_id(&id)?,
                    session_id,
                    lead: serde_json::from_str(&payload)?,
                    notified: notified != 0,
                    created_at: from_epoch(created_at),
                });
            }
            Ok(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteline_core::types::LeadField;

    fn make_db() -> Arc<Database> {
        Arc::new(Database::in_memory().unwrap())
    }

    fn make_contact(name: &str, created_at: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            company: Some("Acme".to_string()),
            subject: Some("Quote".to_string()),
            message: "We need a new site".to_string(),
            created_at,
        }
    }

    #[test]
    fn test_contact_save_and_find() {
        let repo = ContactRepository::new(make_db());
        let submission = make_contact("Alice", Utc::now());
        repo.save(&submission).unwrap();

        let found = repo.find_by_id(submission.id).unwrap().unwrap();
        assert_eq!(found.id, submission.id);
        assert_eq!(found.name, "Alice");
        assert_eq!(found.company.as_deref(), Some("Acme"));
        assert_eq!(found.phone, None);
        assert_eq!(found.created_at.timestamp(), submission.created_at.timestamp());
    }

    #[test]
    fn test_contact_find_missing_returns_none() {
        let repo = ContactRepository::new(make_db());
        assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_contact_count() {
        let repo = ContactRepository::new(make_db());
        assert_eq!(repo.count().unwrap(), 0);
        repo.save(&make_contact("Old", from_epoch(1_700_000_000))).unwrap();
        repo.save(&make_contact("New", from_epoch(1_700_000_500))).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_contact_duplicate_id_rejected() {
        let repo = ContactRepository::new(make_db());
        let submission = make_contact("Dup", Utc::now());
        repo.save(&submission).unwrap();
        let err = repo.save(&submission).unwrap_err();
        assert!(matches!(err, SitelineError::Storage(_)));
    }

    #[test]
    fn test_application_save_and_find() {
        let repo = ApplicationRepository::new(make_db());
        let app = JobApplication {
            id: Uuid::new_v4(),
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            phone: Some("07700 900123".to_string()),
            position: "Frontend Developer".to_string(),
            cover_letter: None,
            resume_url: Some("https://example.com/cv.pdf".to_string()),
            created_at: Utc::now(),
        };
        repo.save(&app).unwrap();

        let found = repo.find_by_id(app.id).unwrap().unwrap();
        assert_eq!(found.position, "Frontend Developer");
        assert_eq!(found.resume_url, app.resume_url);
    }

    #[test]
    fn test_lead_archive_and_mark_notified() {
        let repo = LeadRepository::new(make_db());
        let mut lead = LeadRecord::default();
        lead.set(LeadField::Name, "Jane Doe".to_string());
        lead.set(LeadField::Email, "jane@example.com".to_string());
        lead.current_step = 10;

        let id = repo.archive("visitor-1", &lead).unwrap();
        let rows = repo.list_recent(5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].session_id, "visitor-1");
        assert_eq!(rows[0].lead, lead);
        assert!(!rows[0].notified);

        repo.mark_notified(id, true).unwrap();
        assert!(repo.list_recent(5).unwrap()[0].notified);
    }
}
