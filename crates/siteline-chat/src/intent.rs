//! Keyword intent detection.
//!
//! Two independent questions are answered here: does a message ask for a
//! website build (which starts the lead flow), and which canned fallback
//! class a message belongs to when no completion provider is reachable.

use regex::Regex;

/// Phrases that start the guided lead flow. Matched as case-insensitive
/// substrings.
const WEBSITE_TRIGGERS: &[&str] = &[
    "need a website",
    "want a website",
    "build a website",
    "create a website",
    "make a website",
    "new website",
    "website for my",
    "design a website",
    "develop a website",
    "website development",
    "web development",
    "build me a site",
    "online store",
    "online shop",
    "e-commerce site",
    "ecommerce site",
    "redesign my website",
    "get a quote",
];

/// Canned-reply class for the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackIntent {
    WebsiteInquiry,
    Greeting,
    ServiceInquiry,
    PricingInquiry,
    General,
}

impl FallbackIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackIntent::WebsiteInquiry => "website_inquiry",
            FallbackIntent::Greeting => "greeting",
            FallbackIntent::ServiceInquiry => "service_inquiry",
            FallbackIntent::PricingInquiry => "pricing_inquiry",
            FallbackIntent::General => "general",
        }
    }
}

struct ClassPattern {
    regex: Regex,
    intent: FallbackIntent,
}

/// Compiled intent patterns, built once and shared.
pub struct IntentDetector {
    classes: Vec<ClassPattern>,
}

impl Default for IntentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentDetector {
    pub fn new() -> Self {
        // Order matters: the first matching class wins.
        let table: [(FallbackIntent, &str); 4] = [
            (
                FallbackIntent::WebsiteInquiry,
                r"(?i)\b(?:website|web\s*site|web\s*design|landing\s+page|online\s+store|e-?commerce)",
            ),
            (
                FallbackIntent::Greeting,
                r"(?i)\b(?:hi|hello|hey|hiya|good\s+(?:morning|afternoon|evening))\b",
            ),
            (
                FallbackIntent::ServiceInquiry,
                r"(?i)\b(?:services?|support|hosting|it\s+help|maintenance|network|cloud|security|what\s+do\s+you\s+do)\b",
            ),
            (
                FallbackIntent::PricingInquiry,
                r"(?i)\b(?:price|prices|pricing|cost|costs|quote|budget|how\s+much|rates?)\b",
            ),
        ];

        let classes = table
            .into_iter()
            .map(|(intent, pattern)| ClassPattern {
                regex: Regex::new(pattern).expect("Invalid fallback intent regex"),
                intent,
            })
            .collect();

        Self { classes }
    }

    /// Whether the message asks for a website build.
    pub fn is_website_request(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        WEBSITE_TRIGGERS.iter().any(|phrase| lower.contains(phrase))
    }

    /// Classify a message for the canned fallback reply.
    pub fn classify(&self, message: &str) -> FallbackIntent {
        self.classes
            .iter()
            .find(|c| c.regex.is_match(message))
            .map(|c| c.intent)
            .unwrap_or(FallbackIntent::General)
    }
}
