//! Client-side validation for the contact, registration and sign-in forms.
//!
//! Validation runs before anything is sent anywhere. A failed check never
//! mutates widget state; it produces [`FieldErrors`] that the view shows next
//! to the offending fields.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Shown under an empty required field
pub const REQUIRED_MESSAGE: &str = "Wajib diisi";

/// Shown under a malformed email address
pub const INVALID_EMAIL_MESSAGE: &str = "Email tidak valid";

/// Shown under a password shorter than [`MIN_PASSWORD_LEN`]
pub const PASSWORD_TOO_SHORT_MESSAGE: &str = "Minimal 8 karakter";

pub const MIN_PASSWORD_LEN: usize = 8;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Syntactic email check (local@domain.tld, no whitespace)
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// A form field that can carry an inline error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Subject,
    Message,
    Password,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-field validation messages, ordered by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; the first message for a field wins
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when no field failed, otherwise the collected errors
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn require(&mut self, field: Field, value: &str) -> bool {
        if value.trim().is_empty() {
            self.insert(field, REQUIRED_MESSAGE);
            false
        } else {
            true
        }
    }

    fn require_email(&mut self, value: &str) {
        if self.require(Field::Email, value) && !is_valid_email(value) {
            self.insert(Field::Email, INVALID_EMAIL_MESSAGE);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Contact and registration form values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require(Field::FirstName, &self.first_name);
        errors.require(Field::LastName, &self.last_name);
        errors.require_email(&self.email);
        errors.require(Field::Subject, &self.subject);
        errors.require(Field::Message, &self.message);
        errors.into_result()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Email => self.email = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
            Field::Password => {}
        }
    }
}

/// Email and password for sign-in or sign-up
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require_email(&self.email);
        if errors.require(Field::Password, &self.password) && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(Field::Password, PASSWORD_TOO_SHORT_MESSAGE);
        }
        errors.into_result()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
