//! Per-step answer extraction and validation.
//!
//! Total over all inputs: every step/message pair yields an [`Extraction`],
//! never an error.

use regex::Regex;

use siteline_core::types::NOT_PROVIDED;

/// Outcome of validating one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub valid: bool,
    pub value: String,
}

impl Extraction {
    fn accept(value: impl Into<String>) -> Self {
        Self {
            valid: true,
            value: value.into(),
        }
    }

    fn reject() -> Self {
        Self {
            valid: false,
            value: String::new(),
        }
    }
}

/// Validates free-text answers to the nine lead questions.
pub struct AnswerExtractor {
    email: Regex,
    phone: Regex,
}

impl Default for AnswerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerExtractor {
    pub fn new() -> Self {
        Self {
            email: Regex::new(r"[\w.+-]+@[\w.-]+\.\w+").expect("Invalid email regex"),
            phone: Regex::new(r"[\d\s+\-()]{7,}").expect("Invalid phone regex"),
        }
    }

    /// Extract the answer for `step` from `raw`.
    ///
    /// Steps outside 1..=9 are always rejected.
    pub fn extract(&self, step: u8, raw: &str) -> Extraction {
        let trimmed = raw.trim();
        match step {
            1 | 5 | 6 => min_length(trimmed, 2),
            2 => match self.email.find(raw) {
                Some(m) => Extraction::accept(m.as_str()),
                None => Extraction::reject(),
            },
            3 => self.extract_phone(trimmed),
            4 | 7 | 8 => min_length(trimmed, 1),
            9 => match trimmed.to_lowercase().as_str() {
                "no" | "none" | "skip" => Extraction::accept(""),
                _ => Extraction::accept(trimmed),
            },
            _ => Extraction::reject(),
        }
    }

    /// Whether `raw`, once trimmed, is a single email address and nothing else.
    pub fn is_email(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        self.email
            .find(trimmed)
            .is_some_and(|m| m.start() == 0 && m.end() == trimmed.len())
    }

    fn extract_phone(&self, trimmed: &str) -> Extraction {
        let lower = trimmed.to_lowercase();
        if lower == "skip" || lower == "no" {
            return Extraction::accept(NOT_PROVIDED);
        }
        if let Some(m) = self.phone.find(trimmed) {
            let number = m.as_str().trim();
            // A run of spaces alone can satisfy the pattern; count it as a skip.
            if number.chars().any(|c| c.is_ascii_digit()) {
                return Extraction::accept(number);
            }
        }
        if trimmed.is_empty() {
            Extraction::reject()
        } else {
            Extraction::accept(NOT_PROVIDED)
        }
    }
}

fn min_length(trimmed: &str, min: usize) -> Extraction {
    if trimmed.chars().count() >= min {
        Extraction::accept(trimmed)
    } else {
        Extraction::reject()
    }
}
