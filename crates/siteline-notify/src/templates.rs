//! Plaintext and HTML email templates.
//!
//! Templates whose names end in `.html` are auto-escaped by minijinja, so
//! visitor-supplied values can be rendered safely.

use minijinja::{context, Environment};
use serde::Serialize;

use siteline_core::types::{
    ContactSubmission, JobApplication, LeadField, LeadRecord, NOT_PROVIDED, NOT_SPECIFIED,
};

use crate::error::NotifyError;

const LEAD_TXT: &str = "New website enquiry from the chatbot
====================================

{% for row in rows %}{{ row.label }}: {{ row.value }}
{% endfor %}
Session: {{ session_id }}
Received: {{ received_at }}
";

const LEAD_HTML: &str = r#"<h2>New website enquiry from the chatbot</h2>
<table cellpadding="6" style="border-collapse: collapse">
{% for row in rows %}  <tr><th align="left">{{ row.label }}</th><td>{{ row.value }}</td></tr>
{% endfor %}</table>
<p style="color: #666">Session: {{ session_id }}<br>Received: {{ received_at }}</p>
"#;

const FORM_TXT: &str = "{{ heading }}
{% for row in rows %}{{ row.label }}: {{ row.value }}
{% endfor %}
Received: {{ received_at }}
";

const FORM_HTML: &str = r#"<h2>{{ heading }}</h2>
<table cellpadding="6" style="border-collapse: collapse">
{% for row in rows %}  <tr><th align="left">{{ row.label }}</th><td>{{ row.value }}</td></tr>
{% endfor %}</table>
<p style="color: #666">Received: {{ received_at }}</p>
"#;

/// One labelled line of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

impl SummaryRow {
    fn new(label: &'static str, value: Option<&str>, placeholder: &str) -> Self {
        let value = match value {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => placeholder.to_string(),
        };
        Self { label, value }
    }
}

/// A rendered plaintext + HTML pair.
#[derive(Debug, Clone)]
pub struct RenderedBody {
    pub text: String,
    pub html: String,
}

/// Compiled email templates.
pub struct EmailTemplates {
    env: Environment<'static>,
}

impl Default for EmailTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailTemplates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        for (name, source) in [
            ("lead.txt", LEAD_TXT),
            ("lead.html", LEAD_HTML),
            ("form.txt", FORM_TXT),
            ("form.html", FORM_HTML),
        ] {
            env.add_template(name, source)
                .expect("Invalid built-in email template");
        }
        Self { env }
    }

    /// Summary rows for a lead; identity fields fall back to "Not provided",
    /// project fields to "Not specified".
    pub fn lead_rows(lead: &LeadRecord) -> Vec<SummaryRow> {
        LeadField::ALL
            .iter()
            .map(|field| {
                let placeholder = match field {
                    LeadField::Name | LeadField::Email | LeadField::Phone => NOT_PROVIDED,
                    _ => NOT_SPECIFIED,
                };
                SummaryRow::new(field.label(), lead.get(*field), placeholder)
            })
            .collect()
    }

    pub fn render_lead(
        &self,
        session_id: &str,
        lead: &LeadRecord,
        received_at: &str,
    ) -> Result<RenderedBody, NotifyError> {
        let rows = Self::lead_rows(lead);
        let ctx = context! { rows => rows, session_id => session_id, received_at => received_at };
        Ok(RenderedBody {
            text: self.env.get_template("lead.txt")?.render(&ctx)?,
            html: self.env.get_template("lead.html")?.render(&ctx)?,
        })
    }

    pub fn render_contact(&self, submission: &ContactSubmission) -> Result<RenderedBody, NotifyError> {
        let rows = vec![
            SummaryRow::new("Name", Some(submission.name.as_str()), NOT_PROVIDED),
            SummaryRow::new("Email", Some(submission.email.as_str()), NOT_PROVIDED),
            SummaryRow::new("Phone", submission.phone.as_deref(), NOT_PROVIDED),
            SummaryRow::new("Company", submission.company.as_deref(), NOT_SPECIFIED),
            SummaryRow::new("Subject", submission.subject.as_deref(), NOT_SPECIFIED),
            SummaryRow::new("Message", Some(submission.message.as_str()), NOT_SPECIFIED),
        ];
        self.render_form(
            "New contact form submission",
            rows,
            &submission.created_at.to_rfc2822(),
        )
    }

    pub fn render_application(
        &self,
        application: &JobApplication,
    ) -> Result<RenderedBody, NotifyError> {
        let rows = vec![
            SummaryRow::new("Position", Some(application.position.as_str()), NOT_SPECIFIED),
            SummaryRow::new("Name", Some(application.name.as_str()), NOT_PROVIDED),
            SummaryRow::new("Email", Some(application.email.as_str()), NOT_PROVIDED),
            SummaryRow::new("Phone", application.phone.as_deref(), NOT_PROVIDED),
            SummaryRow::new("CV", application.resume_url.as_deref(), NOT_PROVIDED),
            SummaryRow::new("Cover letter", application.cover_letter.as_deref(), NOT_PROVIDED),
        ];
        self.render_form(
            "New job application",
            rows,
            &application.created_at.to_rfc2822(),
        )
    }

    fn render_form(
        &self,
        heading: &str,
        rows: Vec<SummaryRow>,
        received_at: &str,
    ) -> Result<RenderedBody, NotifyError> {
        let ctx = context! { heading => heading, rows => rows, received_at => received_at };
        Ok(RenderedBody {
            text: self.env.get_template("form.txt")?.render(&ctx)?,
            html: self.env.get_template("form.html")?.render(&ctx)?,
        })
    }
}
