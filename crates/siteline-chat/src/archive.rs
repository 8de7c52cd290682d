//! Archival of completed leads.

use uuid::Uuid;

use siteline_core::types::LeadRecord;
use siteline_storage::LeadRepository;

use crate::error::ChatError;

/// Durable record of completed leads, written before the team is notified.
pub trait LeadArchive: Send + Sync {
    fn archive(&self, session_id: &str, lead: &LeadRecord) -> Result<Uuid, ChatError>;

    fn mark_notified(&self, id: Uuid, notified: bool) -> Result<(), ChatError>;
}

impl LeadArchive for LeadRepository {
    fn archive(&self, session_id: &str, lead: &LeadRecord) -> Result<Uuid, ChatError> {
        Ok(LeadRepository::archive(self, session_id, lead)?)
    }

    fn mark_notified(&self, id: Uuid, notified: bool) -> Result<(), ChatError> {
        Ok(LeadRepository::mark_notified(self, id, notified)?)
    }
}
