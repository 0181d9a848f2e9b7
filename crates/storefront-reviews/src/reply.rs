//! Presentation-facing result of a submission

use serde::Serialize;
use storefront_forms::{FieldErrors, FieldSchema};

/// Overall outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Review accepted
    Success,
    /// Review not submitted or refused
    Error,
}

/// Immutable snapshot handed back to the form
///
/// `fields` is the schema the form was validated against so the caller can
/// re-render it. Submitted values are not echoed back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// Overall outcome
    pub status: ReplyStatus,
    /// Schema to re-render
    pub fields: FieldSchema,
    /// Clear the form inputs
    pub reset_form: bool,
    /// Re-fetch dependent read-side data (the review list) in the background
    pub refresh: bool,
    /// Messages per field, from validation only
    pub field_errors: FieldErrors,
    /// Messages for the form as a whole
    pub form_errors: Vec<String>,
}

impl Reply {
    /// Accepted submission: reset and refresh, no errors
    pub fn success(fields: FieldSchema) -> Self {
        Self {
            status: ReplyStatus::Success,
            fields,
            reset_form: true,
            refresh: true,
            field_errors: FieldErrors::new(),
            form_errors: Vec::new(),
        }
    }

    /// Failed submission: keep the inputs, report the errors
    pub fn failure(fields: FieldSchema, field_errors: FieldErrors, form_errors: Vec<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            fields,
            reset_form: false,
            refresh: false,
            field_errors,
            form_errors,
        }
    }

    /// Whether the status is [`ReplyStatus::Success`]
    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Success
    }
}
