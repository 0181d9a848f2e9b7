//! Submission validation
//!
//! Rules are evaluated per field type, in schema order, and never stop at
//! the first failure: a single pass collects every field error so the caller
//! can highlight all of them at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::{FieldDescriptor, FieldSchema, FieldType};

/// Form-level message attached to every validation failure
pub const INVALID_FORM_MESSAGE: &str = "Please fill out all required fields correctly.";

/// Field error for an empty required field
pub const REQUIRED_MESSAGE: &str = "required";

/// Field error for a value that does not parse as a number
pub const NOT_A_NUMBER_MESSAGE: &str = "must be a number";

/// Field error for a malformed email address
pub const INVALID_EMAIL_MESSAGE: &str = "must be a valid email address";

/// Tolerance used when checking step alignment
const STEP_EPSILON: f64 = 1e-9;

// =============================================================================
// Inputs
// =============================================================================

/// Raw values keyed by field name, as posted by the form
///
/// Absent keys read as empty. When built from an iterator, a repeated key
/// keeps its last value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedValues(BTreeMap<String, String>);

impl SubmittedValues {
    /// Empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value for a field, empty when absent
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    /// Whether the key was submitted at all
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmittedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for SubmittedValues {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Value coerced to its declared field type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Parsed number
    Number(f64),
    /// Trimmed string
    Text(String),
}

impl TypedValue {
    /// Numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// String value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// Values that passed validation
///
/// Optional fields left empty are absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedValues(BTreeMap<String, TypedValue>);

impl ValidatedValues {
    /// Typed value for a field
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.0.get(name)
    }

    /// Numeric value for a field
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(TypedValue::as_number)
    }

    /// Text value for a field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(TypedValue::as_text)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no value was kept
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate values by field name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Field-level error messages keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Result of checking a submission against a schema
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationOutcome {
    /// Every constraint holds
    Success {
        /// Coerced values
        values: ValidatedValues,
    },
    /// At least one constraint was violated
    Failure {
        /// Messages per offending field
        field_errors: FieldErrors,
        /// Messages about the form as a whole
        form_errors: Vec<String>,
    },
}

impl ValidationOutcome {
    /// Whether validation passed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Field errors, `None` on success
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Failure { field_errors, .. } => Some(field_errors),
            Self::Success { .. } => None,
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Validate a submission against a schema
pub fn validate(schema: &FieldSchema, submitted: &SubmittedValues) -> ValidationOutcome {
    let mut values = BTreeMap::new();
    let mut field_errors = FieldErrors::new();

    for field in schema.fields() {
        let raw = submitted.get(&field.name).trim();

        match check_field(field, raw) {
            Ok(Some(value)) => {
                values.insert(field.name.clone(), value);
            }
            Ok(None) => {}
            Err(errors) => {
                field_errors.insert(field.name.clone(), errors);
            }
        }
    }

    if field_errors.is_empty() {
        ValidationOutcome::Success { values: ValidatedValues(values) }
    } else {
        ValidationOutcome::Failure {
            field_errors,
            form_errors: vec![INVALID_FORM_MESSAGE.to_string()],
        }
    }
}

/// Check one trimmed value. `Ok(None)` means an optional field left empty.
fn check_field(field: &FieldDescriptor, raw: &str) -> Result<Option<TypedValue>, Vec<String>> {
    if raw.is_empty() {
        return if field.required {
            Err(vec![REQUIRED_MESSAGE.to_string()])
        } else {
            Ok(None)
        };
    }

    match field.field_type {
        FieldType::Number => check_number(field, raw).map(|n| Some(TypedValue::Number(n))),
        FieldType::Email => {
            if is_valid_email(raw) {
                Ok(Some(TypedValue::Text(raw.to_string())))
            } else {
                Err(vec![INVALID_EMAIL_MESSAGE.to_string()])
            }
        }
        FieldType::Text | FieldType::Textarea => Ok(Some(TypedValue::Text(raw.to_string()))),
    }
}

fn check_number(field: &FieldDescriptor, raw: &str) -> Result<f64, Vec<String>> {
    let value = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Err(vec![NOT_A_NUMBER_MESSAGE.to_string()]),
    };

    let mut errors = Vec::new();

    if let Some(min) = field.min {
        if value < min {
            errors.push(format!("must be at least {}", min));
        }
    }
    if let Some(max) = field.max {
        if value > max {
            errors.push(format!("must be at most {}", max));
        }
    }
    if let Some(step) = field.step {
        if !is_aligned(value, field.min.unwrap_or(0.0), step) {
            errors.push(format!("must be a multiple of {}", step));
        }
    }

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

fn is_aligned(value: f64, base: f64, step: f64) -> bool {
    let steps = (value - base) / step;
    (steps - steps.round()).abs() <= STEP_EPSILON * steps.abs().max(1.0)
}

/// Structural email check: one `@`, non-empty local and domain parts, no
/// whitespace.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
