//! Canned replies used when the completion provider is unavailable or fails.

use siteline_core::config::CompanyConfig;
use tracing::debug;

use crate::intent::{FallbackIntent, IntentDetector};

/// Builds fallback replies. Every reply carries the company's phone number,
/// email address and contact page so the visitor can always reach a human.
pub struct FallbackResponder {
    company: CompanyConfig,
    detector: IntentDetector,
}

impl FallbackResponder {
    pub fn new(company: CompanyConfig) -> Self {
        Self {
            company,
            detector: IntentDetector::new(),
        }
    }

    pub fn respond(&self, message: &str) -> String {
        let intent = self.detector.classify(message);
        debug!(intent = intent.as_str(), "Fallback reply selected");
        self.reply_for(intent)
    }

    pub fn reply_for(&self, intent: FallbackIntent) -> String {
        let c = &self.company;
        let contact = format!(
            "You can call us on {}, email {} or use our contact page at {}.",
            c.phone, c.email, c.contact_url
        );
        match intent {
            FallbackIntent::WebsiteInquiry => format!(
                "We'd love to help with your website! {} builds business sites, online stores \
                 and web applications. Just say \"I need a website\" and I'll take a few \
                 details so our team can prepare a proposal. {contact}",
                c.name
            ),
            FallbackIntent::Greeting => format!(
                "Hello and welcome to {}! I can help with questions about our IT services \
                 and website development. {contact}",
                c.name
            ),
            FallbackIntent::ServiceInquiry => format!(
                "{} offers managed IT support, cloud and network services, cyber security \
                 and website development. For details on any of these, {}",
                c.name,
                lowercase_first(&contact)
            ),
            FallbackIntent::PricingInquiry => format!(
                "Our pricing depends on the scope of each project, so we prepare tailored \
                 quotes. {contact}"
            ),
            FallbackIntent::General => format!(
                "Thanks for your message. I'm not able to answer that right now, but our team \
                 will be happy to help. {contact}"
            ),
        }
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
