//! Contact form controller
//!
//! Errors are recomputed on every edit but only surfaced for fields the
//! visitor has touched, or for every field once a submit was attempted.

use async_trait::async_trait;
use std::collections::BTreeSet;

use mealchat_core::{ContactForm, Error, Field, FieldErrors, Result};

/// Where a valid contact submission goes
#[async_trait]
pub trait FormDelivery: Send + Sync {
    async fn deliver(&self, form: &ContactForm) -> Result<()>;
}

/// Delivery that only records the submission in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDelivery;

#[async_trait]
impl FormDelivery for LoggingDelivery {
    async fn deliver(&self, form: &ContactForm) -> Result<()> {
        tracing::info!(subject = %form.subject, chars = form.message.chars().count(), "contact form submitted");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactFormState {
    values: ContactForm,
    errors: FieldErrors,
    touched: BTreeSet<Field>,
    submitted: bool,
}

impl ContactFormState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.revalidate();
        state
    }

    pub fn values(&self) -> &ContactForm {
        &self.values
    }

    /// Update one field and mark it touched
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value);
        self.touched.insert(field);
        self.revalidate();
    }

    /// Error to show next to `field`, if any
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.submitted || self.touched.contains(&field) { self.errors.get(field) } else { None }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Validate and hand the values to `delivery`
    ///
    /// Invalid input is returned as [`Error::Validation`] without calling the
    /// delivery. On success the form resets; on delivery failure the values
    /// stay so the visitor can retry.
    pub async fn submit(&mut self, delivery: &dyn FormDelivery) -> Result<()> {
        self.submitted = true;
        if !self.errors.is_empty() {
            return Err(Error::Validation(self.errors.clone()));
        }

        delivery.deliver(&self.values).await?;
        *self = Self::new();
        Ok(())
    }

    fn revalidate(&mut self) {
        self.errors = match self.values.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors,
        };
    }
}
