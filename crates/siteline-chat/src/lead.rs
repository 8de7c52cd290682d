//! The guided lead-collection state machine.
//!
//! States are encoded on [`LeadRecord`]: idle is `current_step == 0` with
//! collection off, asking step `n` is `current_step == n` with collection
//! on, and completion is the transient `current_step == 10` that the engine
//! resets once the team has been notified.

use tracing::{debug, info};

use siteline_core::config::CompanyConfig;
use siteline_core::types::{LeadField, LeadRecord, LEAD_COMPLETE_STEP, NOT_PROVIDED};

use crate::extract::AnswerExtractor;
use crate::intent::IntentDetector;
use crate::steps::StepQuestion;

const GREETING: &str = "Great, I'd love to help you with a new website! I'll ask a few quick \
questions so our team can put together a tailored proposal. ";

const REPROMPT: &str = "I didn't quite catch that. ";

/// Result of offering one message to the lead flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOutcome {
    /// The flow is idle and the message did not start it.
    NotEngaged,
    /// The flow consumed the message and produced the next prompt.
    Reply(String),
    /// The final answer was recorded; the lead awaits dispatch.
    Completed,
}

/// Drives a [`LeadRecord`] through the nine questions.
pub struct LeadFlow {
    extractor: AnswerExtractor,
    detector: IntentDetector,
    company: CompanyConfig,
}

impl LeadFlow {
    pub fn new(company: CompanyConfig) -> Self {
        Self {
            extractor: AnswerExtractor::new(),
            detector: IntentDetector::new(),
            company,
        }
    }

    /// Offer `message` to the flow, mutating `lead` in place.
    pub fn advance(&self, lead: &mut LeadRecord, message: &str) -> LeadOutcome {
        // Trigger phrases only start a flow from idle; mid-flow they are answers.
        if !lead.is_lead_collection && self.detector.is_website_request(message) {
            *lead = LeadRecord {
                current_step: 1,
                is_lead_collection: true,
                ..LeadRecord::default()
            };
            info!("Lead collection started");
            return LeadOutcome::Reply(format!("{GREETING}{}", question(1)));
        }

        if !lead.is_lead_collection {
            return LeadOutcome::NotEngaged;
        }

        let step = lead.current_step;
        if step == 0 {
            lead.current_step = 1;
            return LeadOutcome::Reply(question(1).to_string());
        }
        let Some(entry) = StepQuestion::for_step(step) else {
            debug!(step, "Lead step out of range; resetting to idle");
            *lead = LeadRecord::default();
            return LeadOutcome::NotEngaged;
        };

        let extraction = self.extractor.extract(step, message);
        if !extraction.valid {
            debug!(step, "Answer rejected; asking again");
            return LeadOutcome::Reply(format!("{REPROMPT}{}", entry.question));
        }

        let ack = entry.acknowledge(&extraction.value);
        lead.set(entry.field, extraction.value);

        if step >= 9 {
            lead.current_step = LEAD_COMPLETE_STEP;
            return LeadOutcome::Completed;
        }

        lead.current_step = step + 1;
        debug!(step = lead.current_step, "Lead advanced");
        LeadOutcome::Reply(format!("{ack}{}", question(step + 1)))
    }

    /// Closing message for a completed lead. Both variants name the visitor
    /// and restate the contact details they gave.
    pub fn closing_message(&self, lead: &LeadRecord, notified: bool) -> String {
        let name = lead.display(LeadField::Name, "there");
        let email = lead.display(LeadField::Email, NOT_PROVIDED);
        let phone = lead.display(LeadField::Phone, NOT_PROVIDED);

        if notified {
            format!(
                "Thank you, {name}! I've sent your project details to our team and they'll be \
                 in touch within one business day. Here's a summary of your contact details: \
                 Email: {email}, Phone: {phone}. If anything changes, call us on {} or email {}.",
                self.company.phone, self.company.email
            )
        } else {
            format!(
                "Thank you, {name}! I've recorded your project details and our team will reach \
                 out to you shortly. Just in case, here are the contact details you gave us: \
                 Email: {email}, Phone: {phone}. You can also reach us directly on {} or at {}.",
                self.company.phone, self.company.email
            )
        }
    }

    /// Return a completed lead to idle.
    pub fn reset(lead: &mut LeadRecord) {
        lead.current_step = 0;
        lead.is_lead_collection = false;
    }
}

fn question(step: u8) -> &'static str {
    StepQuestion::for_step(step).map(|q| q.question).unwrap_or_default()
}
