//! Notification dispatcher: renders summaries and hands them to the sender.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use siteline_core::config::EmailConfig;
use siteline_core::types::{
    ContactSubmission, JobApplication, LeadField, LeadRecord, NOT_SPECIFIED,
};

use crate::sender::{EmailSender, OutboundEmail};
use crate::templates::{EmailTemplates, RenderedBody};

/// Sends lead and form notifications to the configured recipients.
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    from: String,
    recipients: Vec<String>,
    templates: EmailTemplates,
}

impl Notifier {
    pub fn new(sender: Arc<dyn EmailSender>, from: String, recipients: Vec<String>) -> Self {
        Self {
            sender,
            from,
            recipients,
            templates: EmailTemplates::new(),
        }
    }

    /// Build a notifier addressed per the `[email]` config section.
    pub fn from_config(sender: Arc<dyn EmailSender>, config: &EmailConfig) -> Self {
        Self::new(
            sender,
            config.from.clone(),
            config.notification_recipients.clone(),
        )
    }

    /// Email the team a completed lead. Returns whether delivery succeeded.
    pub async fn dispatch_lead(&self, session_id: &str, lead: &LeadRecord) -> bool {
        let received_at = Utc::now().to_rfc2822();
        let body = match self.templates.render_lead(session_id, lead, &received_at) {
            Ok(body) => body,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to render lead summary");
                return false;
            }
        };

        let subject = format!(
            "New Website Lead: {} - {}",
            lead.display(LeadField::Name, "Unknown"),
            lead.display(LeadField::CompanyName, NOT_SPECIFIED),
        );
        let sent = self.deliver(subject, body).await;
        info!(session_id = %session_id, sent, "Lead notification dispatched");
        sent
    }

    pub async fn notify_contact(&self, submission: &ContactSubmission) -> bool {
        match self.templates.render_contact(submission) {
            Ok(body) => {
                let subject = format!("New contact form submission from {}", submission.name);
                self.deliver(subject, body).await
            }
            Err(e) => {
                warn!(id = %submission.id, error = %e, "Failed to render contact summary");
                false
            }
        }
    }

    pub async fn notify_application(&self, application: &JobApplication) -> bool {
        match self.templates.render_application(application) {
            Ok(body) => {
                let subject = format!(
                    "New job application: {} - {}",
                    application.position, application.name
                );
                self.deliver(subject, body).await
            }
            Err(e) => {
                warn!(id = %application.id, error = %e, "Failed to render application summary");
                false
            }
        }
    }

    async fn deliver(&self, subject: String, body: RenderedBody) -> bool {
        if self.recipients.is_empty() {
            warn!(subject = %subject, "No notification recipients configured");
            return false;
        }
        let email = OutboundEmail {
            from: self.from.clone(),
            to: self.recipients.clone(),
            subject,
            text: body.text,
            html: body.html,
        };
        self.sender.send(&email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingSender {
        sent: Mutex<Vec<OutboundEmail>>,
        succeed: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, email: &OutboundEmail) -> bool {
            self.sent.lock().unwrap().push(email.clone());
            self.succeed
        }
    }

    fn make_notifier(succeed: bool) -> (Notifier, Arc<RecordingSender>) {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            succeed,
        });
        let notifier = Notifier::new(
            sender.clone(),
            "Website <noreply@example.com>".to_string(),
            vec!["sales@example.com".to_string()],
        );
        (notifier, sender)
    }

    fn make_lead() -> LeadRecord {
        let mut lead = LeadRecord::default();
        lead.set(LeadField::Name, "Jane Doe".to_string());
        lead.set(LeadField::Email, "jane@example.com".to_string());
        lead.set(LeadField::CompanyName, "Doe Bakery".to_string());
        lead
    }

    #[tokio::test]
    async fn test_dispatch_lead_success() {
        let (notifier, sender) = make_notifier(true);
        assert!(notifier.dispatch_lead("visitor-1", &make_lead()).await);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Website Lead: Jane Doe - Doe Bakery");
        assert_eq!(sent[0].to, vec!["sales@example.com".to_string()]);
        assert!(sent[0].text.contains("Phone: Not provided"));
        assert!(sent[0].html.contains("Doe Bakery"));
    }

    #[tokio::test]
    async fn test_dispatch_lead_failure_is_reported() {
        let (notifier, sender) = make_notifier(false);
        assert!(!notifier.dispatch_lead("visitor-1", &make_lead()).await);
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_recipients_skips_delivery() {
        let sender = Arc::new(RecordingSender {
            sent: Mutex::new(Vec::new()),
            succeed: true,
        });
        let notifier = Notifier::new(sender.clone(), "a@example.com".to_string(), vec![]);
        assert!(!notifier.dispatch_lead("s", &make_lead()).await);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_contact_subject() {
        let (notifier, sender) = make_notifier(true);
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: None,
            company: None,
            subject: None,
            message: "Hello".to_string(),
            created_at: Utc::now(),
        };
        assert!(notifier.notify_contact(&submission).await);
        assert_eq!(
            sender.sent.lock().unwrap()[0].subject,
            "New contact form submission from Alice"
        );
    }

    #[tokio::test]
    async fn test_notify_application_subject() {
        let (notifier, sender) = make_notifier(true);
        let application = JobApplication {
            id: Uuid::new_v4(),
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            phone: None,
            position: "QA Engineer".to_string(),
            cover_letter: None,
            resume_url: None,
            created_at: Utc::now(),
        };
        assert!(notifier.notify_application(&application).await);
        assert_eq!(
            sender.sent.lock().unwrap()[0].subject,
            "New job application: QA Engineer - Bob"
        );
    }
}
