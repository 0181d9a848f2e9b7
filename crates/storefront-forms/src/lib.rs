//! Storefront Forms
//!
//! Declarative form schemas and the validator that checks raw submissions
//! against them.
//!
//! ## Features
//! - Ordered field schemas with optional field groups
//! - Number, text, textarea and email fields
//! - Total validation: every invalid field is reported in one pass
//!
//! ```rust
//! use storefront_forms::{validate, FieldDescriptor, FieldSchema, SubmittedValues};
//!
//! let schema = FieldSchema::from_fields(vec![
//!     FieldDescriptor::number("score", "Score").required().min(1.0).max(5.0).step(1.0),
//!     FieldDescriptor::email("email", "Email").required(),
//! ])
//! .unwrap();
//!
//! let submitted: SubmittedValues = [("score", "4"), ("email", "ana@example.com")]
//!     .into_iter()
//!     .collect();
//!
//! assert!(validate(&schema, &submitted).is_success());
//! ```

#![warn(missing_docs)]

pub mod schema;
pub mod validation;

pub use schema::*;
pub use validation::*;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while building a [`FieldSchema`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Two entries share the same field name
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// `min`, `max` or `step` set on a field that is not a number
    #[error("numeric constraint on non-number field: {0}")]
    ConstraintOnNonNumber(String),

    /// `min` is greater than `max`
    #[error("invalid range on field {field}: min {min} > max {max}")]
    InvalidRange {
        /// Field name
        field: String,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// `min` or `max` is NaN or infinite
    #[error("non-finite bound on field {field}: {value}")]
    NonFiniteBound {
        /// Field name
        field: String,
        /// Offending bound
        value: f64,
    },

    /// `step` is zero, negative or not finite
    #[error("invalid step on field {field}: {step}")]
    InvalidStep {
        /// Field name
        field: String,
        /// Offending step
        step: f64,
    },

    /// A field has an empty name
    #[error("field name cannot be empty")]
    EmptyName,
}

/// Result type for schema construction
pub type Result<T> = std::result::Result<T, SchemaError>;
