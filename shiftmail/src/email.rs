use anyhow::{Context, Result};
use extractors::shift_schedule::{html_to_text, looks_like_html};
use shared_types::{ExtractionInput, NameFilter};
use std::path::Path;

/// Subject, bodies and arrival time of the email being parsed
#[derive(Debug, Clone, Default)]
pub struct LoadedEmail {
    pub email_id: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub received_at: Option<i64>,
}

impl LoadedEmail {
    pub fn from_body(subject: Option<String>, body: String) -> Self {
        Self {
            email_id: "raw".to_string(),
            subject: subject.unwrap_or_default(),
            body_text: body,
            ..Default::default()
        }
    }

    pub fn into_input(
        self,
        user_timezone: &str,
        name_filter: NameFilter,
        reference_year: Option<i32>,
    ) -> ExtractionInput {
        ExtractionInput {
            email_id: self.email_id,
            subject: self.subject,
            body_text: self.body_text,
            body_html: self.body_html,
            received_at: self.received_at,
            user_timezone: user_timezone.to_string(),
            name_filter,
            reference_year,
        }
    }

    /// Plain text the parser walks, for `--dump-body`
    pub fn plain_body(&self) -> String {
        if !self.body_text.trim().is_empty() {
            if looks_like_html(&self.body_text) {
                return html_to_text(&self.body_text);
            }
            return self.body_text.clone();
        }
        self.body_html.as_deref().map(html_to_text).unwrap_or_default()
    }
}

pub fn load_email_from_eml(path: &Path) -> Result<LoadedEmail> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read .eml file at {:?}", path))?;
    let mut email = parse_eml(&bytes)?;
    email.email_id = path.display().to_string();
    Ok(email)
}

pub fn load_email_from_file(path: &Path, subject: Option<String>) -> Result<LoadedEmail> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read body file at {:?}", path))?;
    let mut email = LoadedEmail::from_body(subject, body);
    email.email_id = path.display().to_string();
    Ok(email)
}

fn parse_eml(bytes: &[u8]) -> Result<LoadedEmail> {
    let parser = mail_parser::MessageParser::default();
    let parsed = parser
        .parse(bytes)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse .eml file"))?;

    let subject = parsed.subject().map(|s| s.to_string()).unwrap_or_default();
    let body_text = parsed
        .body_text(0)
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty());
    let body_html = match body_text {
        Some(_) => None,
        None => parsed.body_html(0).map(|s| s.to_string()),
    };

    if body_text.is_none() && body_html.is_none() {
        return Err(anyhow::anyhow!("Email has no body text or HTML"));
    }

    Ok(LoadedEmail {
        email_id: parsed.message_id().map(|s| s.to_string()).unwrap_or_default(),
        subject,
        body_text: body_text.unwrap_or_default(),
        body_html,
        received_at: parsed.date().map(|d| d.to_timestamp()),
    })
}
