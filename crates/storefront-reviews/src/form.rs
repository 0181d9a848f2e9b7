//! The product review form

use storefront_forms::{FieldDescriptor, FieldSchema};
use storefront_graphql::fields;

/// Score, title, review body, author name and email, all required
pub fn review_form_schema() -> FieldSchema {
    FieldSchema::from_fields(vec![
        FieldDescriptor::number(fields::SCORE, "Score (1–5):")
            .required()
            .min(1.0)
            .max(5.0)
            .step(1.0),
        FieldDescriptor::text(fields::TITLE, "Title:").required(),
        FieldDescriptor::textarea(fields::REVIEW, "Review:").required(),
        FieldDescriptor::text(fields::NAME, "Your name:").required(),
        FieldDescriptor::email(fields::EMAIL, "Email:").required(),
    ])
    .expect("review form schema is valid")
}
