//! The fixed nine-question catalog walked by the lead flow.

use siteline_core::types::LeadField;

/// One entry of the question table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepQuestion {
    pub step: u8,
    pub field: LeadField,
    pub question: &'static str,
    /// Acknowledgement for a valid answer; `{value}` is replaced by the
    /// extracted value.
    pub acknowledgement: &'static str,
}

impl StepQuestion {
    /// Look up the entry for a step (1..=9).
    pub fn for_step(step: u8) -> Option<&'static StepQuestion> {
        STEP_QUESTIONS.iter().find(|q| q.step == step)
    }

    /// The acknowledgement with `{value}` substituted.
    pub fn acknowledge(&self, value: &str) -> String {
        self.acknowledgement.replace("{value}", value)
    }
}

/// Ordered question table, steps 1 through 9.
pub static STEP_QUESTIONS: [StepQuestion; 9] = [
    StepQuestion {
        step: 1,
        field: LeadField::Name,
        question: "To get started, what's your name?",
        acknowledgement: "Nice to meet you, {value}! ",
    },
    StepQuestion {
        step: 2,
        field: LeadField::Email,
        question: "What's the best email address to reach you on?",
        acknowledgement: "Thanks! I've noted your email as {value}. ",
    },
    StepQuestion {
        step: 3,
        field: LeadField::Phone,
        question: "What's your phone number? (Type 'skip' if you'd rather not share it.)",
        acknowledgement: "Got it. ",
    },
    StepQuestion {
        step: 4,
        field: LeadField::CompanyName,
        question: "What's the name of your company or business?",
        acknowledgement: "Great, {value}. ",
    },
    StepQuestion {
        step: 5,
        field: LeadField::WebsiteType,
        question: "What type of website do you need? (e.g. business website, e-commerce store, portfolio, booking site, web application)",
        acknowledgement: "Got it, {value} it is. ",
    },
    StepQuestion {
        step: 6,
        field: LeadField::Features,
        question: "Which key features would you like? (e.g. online payments, booking system, blog, contact forms, customer accounts)",
        acknowledgement: "Noted. ",
    },
    StepQuestion {
        step: 7,
        field: LeadField::Budget,
        question: "What's your approximate budget? (e.g. under £1,000, £1,000-£3,000, £3,000-£5,000, £5,000+)",
        acknowledgement: "Thanks, that helps us tailor our proposal. ",
    },
    StepQuestion {
        step: 8,
        field: LeadField::Timeline,
        question: "When would you like the website to be live? (e.g. ASAP, within 1 month, 2-3 months, flexible)",
        acknowledgement: "Perfect. ",
    },
    StepQuestion {
        step: 9,
        field: LeadField::AdditionalInfo,
        question: "Finally, is there anything else you'd like us to know? (Type 'none' if not.)",
        acknowledgement: "",
    },
];
