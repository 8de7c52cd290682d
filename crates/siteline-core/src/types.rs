//! Shared domain types for the Siteline workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Conversation
// =============================================================================

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Lead record
// =============================================================================

/// Placeholder recorded when a visitor declines to give a phone number.
pub const NOT_PROVIDED: &str = "Not provided";

/// Placeholder used in summaries for empty optional fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Step value recorded once all nine answers have been collected.
pub const LEAD_COMPLETE_STEP: u8 = 10;

/// The nine fields collected by the guided lead flow, in question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadField {
    Name,
    Email,
    Phone,
    CompanyName,
    WebsiteType,
    Features,
    Budget,
    Timeline,
    AdditionalInfo,
}

impl LeadField {
    /// All fields in step order (step 1 first).
    pub const ALL: [LeadField; 9] = [
        LeadField::Name,
        LeadField::Email,
        LeadField::Phone,
        LeadField::CompanyName,
        LeadField::WebsiteType,
        LeadField::Features,
        LeadField::Budget,
        LeadField::Timeline,
        LeadField::AdditionalInfo,
    ];

    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            LeadField::Name => "Name",
            LeadField::Email => "Email",
            LeadField::Phone => "Phone",
            LeadField::CompanyName => "Company",
            LeadField::WebsiteType => "Website type",
            LeadField::Features => "Features",
            LeadField::Budget => "Budget",
            LeadField::Timeline => "Timeline",
            LeadField::AdditionalInfo => "Additional information",
        }
    }
}

/// Answers accumulated by one lead-collection episode plus its control state.
///
/// `current_step` is 0 when idle, 1..=9 while awaiting the answer to that
/// step, and [`LEAD_COMPLETE_STEP`] for the instant between the last answer
/// and the reset back to idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub website_type: Option<String>,
    pub features: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub additional_info: Option<String>,
    pub current_step: u8,
    pub is_lead_collection: bool,
}

impl LeadRecord {
    /// Store an extracted answer in the named field.
    pub fn set(&mut self, field: LeadField, value: String) {
        let slot = match field {
            LeadField::Name => &mut self.name,
            LeadField::Email => &mut self.email,
            LeadField::Phone => &mut self.phone,
            LeadField::CompanyName => &mut self.company_name,
            LeadField::WebsiteType => &mut self.website_type,
            LeadField::Features => &mut self.features,
            LeadField::Budget => &mut self.budget,
            LeadField::Timeline => &mut self.timeline,
            LeadField::AdditionalInfo => &mut self.additional_info,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: LeadField) -> Option<&str> {
        let slot = match field {
            LeadField::Name => &self.name,
            LeadField::Email => &self.email,
            LeadField::Phone => &self.phone,
            LeadField::CompanyName => &self.company_name,
            LeadField::WebsiteType => &self.website_type,
            LeadField::Features => &self.features,
            LeadField::Budget => &self.budget,
            LeadField::Timeline => &self.timeline,
            LeadField::AdditionalInfo => &self.additional_info,
        };
        slot.as_deref()
    }

    /// Field value for display, with `placeholder` substituted when empty.
    pub fn display<'a>(&'a self, field: LeadField, placeholder: &'a str) -> &'a str {
        match self.get(field) {
            Some(v) if !v.trim().is_empty() => v,
            _ => placeholder,
        }
    }
}

// =============================================================================
// Form submissions
// =============================================================================

/// A contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A job application submitted through the careers page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
