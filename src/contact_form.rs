//! Contact form validation.
//!
//! A [`ContactSubmission`] is what the form posts. [`ContactSubmission::validate`]
//! checks every field and returns either a [`ValidatedContact`], the only
//! input [`ContentStore::add_contact`](crate::content_store::ContentStore::add_contact)
//! accepts, or all field errors at once for inline display.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const SUBJECT_MAX_CHARS: usize = 200;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").unwrap();

    /// Markup that has no business in a contact message.
    static ref MARKUP_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)<script[^>]*>").unwrap(),
        Regex::new(r"(?i)javascript:").unwrap(),
        Regex::new(r"(?i)<iframe[^>]*>").unwrap(),
        Regex::new(r"(?i)<[^>]*\bon\w+\s*=").unwrap(),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub consent: bool,
}

/// A submission that passed validation, with every field trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) subject: Option<String>,
    pub(crate) message: String,
}

impl ValidatedContact {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
    Consent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: ContactField,
    pub message: String,
}

/// Every field error found in one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormErrors(pub Vec<FieldError>);

impl ContactFormErrors {
    pub fn has_error(&self, field: ContactField) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn message_for(&self, field: ContactField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ContactFormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{:?}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ContactFormErrors {}

impl ContactSubmission {
    pub fn validate(&self) -> Result<ValidatedContact, ContactFormErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            })
        };

        let name = self.name.trim();
        let name_len = name.chars().count();
        if name_len < NAME_MIN_CHARS {
            fail(ContactField::Name, "השם חייב להכיל לפחות 2 תווים");
        } else if name_len > NAME_MAX_CHARS {
            fail(ContactField::Name, "השם ארוך מדי");
        } else if contains_markup(name) {
            fail(ContactField::Name, "השם מכיל תווים לא חוקיים");
        }

        let email = self.email.trim();
        if email.is_empty() {
            fail(ContactField::Email, "נא להזין כתובת אימייל");
        } else if email.chars().count() > EMAIL_MAX_CHARS || !EMAIL_PATTERN.is_match(email) {
            fail(ContactField::Email, "כתובת האימייל אינה תקינה");
        }

        let subject = self
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(subject) = subject {
            if subject.chars().count() > SUBJECT_MAX_CHARS {
                fail(ContactField::Subject, "הנושא ארוך מדי");
            } else if contains_markup(subject) {
                fail(ContactField::Subject, "הנושא מכיל תווים לא חוקיים");
            }
        }

        let message = self.message.trim();
        let message_len = message.chars().count();
        if message_len < MESSAGE_MIN_CHARS {
            fail(ContactField::Message, "ההודעה חייבת להכיל לפחות 10 תווים");
        } else if message_len > MESSAGE_MAX_CHARS {
            fail(ContactField::Message, "ההודעה ארוכה מדי");
        } else if contains_markup(message) {
            fail(ContactField::Message, "ההודעה מכילה תוכן לא חוקי");
        }

        if !self.consent {
            fail(ContactField::Consent, "יש לאשר את מדיניות הפרטיות");
        }

        if !errors.is_empty() {
            log::debug!("CONTACT_FORM_REJECTED errors={}", errors.len());
            return Err(ContactFormErrors(errors));
        }

        Ok(ValidatedContact {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.map(str::to_string),
            message: message.to_string(),
        })
    }
}

fn contains_markup(value: &str) -> bool {
    MARKUP_PATTERNS.iter().any(|pattern| pattern.is_match(value))
}
