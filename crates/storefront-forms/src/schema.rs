//! Field schema
//!
//! A schema is an ordered list of entries. Each entry is either a single
//! field or a group of fields rendered side by side; validation only ever
//! sees the flattened field list, in declaration order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Result, SchemaError};

/// Kind of input a field accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Numeric input, optionally bounded by `min`/`max`/`step`
    Number,
    /// Single-line text
    Text,
    /// Multi-line text
    Textarea,
    /// Email address
    Email,
}

impl FieldType {
    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
        }
    }
}

/// One form input
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Input kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Unique key into submitted values and error maps
    pub name: String,
    /// Display label
    pub label: String,
    /// Whether an empty value is rejected
    #[serde(default)]
    pub required: bool,
    /// Inclusive lower bound (number only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound (number only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Increment the value must align to (number only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Placeholder shown on re-render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Initial value shown on re-render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FieldDescriptor {
    /// Create an optional, unconstrained field
    pub fn new(field_type: FieldType, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_type,
            name: name.into(),
            label: label.into(),
            required: false,
            min: None,
            max: None,
            step: None,
            placeholder: None,
            default_value: None,
        }
    }

    /// Number field
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldType::Number, name, label)
    }

    /// Text field
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldType::Text, name, label)
    }

    /// Textarea field
    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldType::Textarea, name, label)
    }

    /// Email field
    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(FieldType::Email, name, label)
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the step
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the placeholder
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the default value
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn has_numeric_constraints(&self) -> bool {
        self.min.is_some() || self.max.is_some() || self.step.is_some()
    }

    fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if self.field_type != FieldType::Number {
            if self.has_numeric_constraints() {
                return Err(SchemaError::ConstraintOnNonNumber(self.name.clone()));
            }
            return Ok(());
        }
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(SchemaError::NonFiniteBound { field: self.name.clone(), value: bound });
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(SchemaError::InvalidRange { field: self.name.clone(), min, max });
            }
        }
        if let Some(step) = self.step {
            if !step.is_finite() || step <= 0.0 {
                return Err(SchemaError::InvalidStep { field: self.name.clone(), step });
            }
        }
        Ok(())
    }
}

/// Fields rendered together on one row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Grouped fields, in order
    pub fields: Vec<FieldDescriptor>,
}

/// One schema entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaEntry {
    /// Single field
    Field(FieldDescriptor),
    /// Field group
    Group(FieldGroup),
}

impl From<FieldDescriptor> for SchemaEntry {
    fn from(field: FieldDescriptor) -> Self {
        Self::Field(field)
    }
}

impl From<FieldGroup> for SchemaEntry {
    fn from(group: FieldGroup) -> Self {
        Self::Group(group)
    }
}

/// Ordered, immutable form schema
///
/// # Invariants
/// - Field names are non-empty and unique across all entries and groups
/// - Numeric constraints only appear on number fields
/// - `min` and `max` are finite, `min <= max` and `step > 0` where set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SchemaEntry>", into = "Vec<SchemaEntry>")]
pub struct FieldSchema {
    entries: Vec<SchemaEntry>,
}

impl FieldSchema {
    /// Build a schema, checking its invariants
    pub fn new(entries: Vec<SchemaEntry>) -> Result<Self> {
        let schema = Self { entries };
        schema.check()?;
        Ok(schema)
    }

    fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            field.check()?;
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(())
    }

    /// Build a schema of ungrouped fields
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Result<Self> {
        Self::new(fields.into_iter().map(SchemaEntry::Field).collect())
    }

    /// Entries as declared
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// All fields, groups flattened, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.entries.iter().flat_map(|entry| match entry {
            SchemaEntry::Field(field) => std::slice::from_ref(field).iter(),
            SchemaEntry::Group(group) => group.fields.iter(),
        })
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|f| f.name == name)
    }

    /// Number of fields after flattening
    pub fn len(&self) -> usize {
        self.fields().count()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<Vec<SchemaEntry>> for FieldSchema {
    type Error = SchemaError;

    fn try_from(entries: Vec<SchemaEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<FieldSchema> for Vec<SchemaEntry> {
    fn from(schema: FieldSchema) -> Self {
        schema.entries
    }
}
