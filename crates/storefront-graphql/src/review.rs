//! Product review mutation
//!
//! Maps validated review form values onto the commerce API's
//! `addProductReview` mutation and folds every possible outcome into a
//! [`MutationResult`]. Nothing in this module returns an error to its caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_forms::ValidatedValues;
use thiserror::Error;

use crate::client::GraphqlClient;

/// Review form field names
pub mod fields {
    /// Star rating, 1 to 5
    pub const SCORE: &str = "score";
    /// Review headline
    pub const TITLE: &str = "title";
    /// Review body
    pub const REVIEW: &str = "review";
    /// Author name
    pub const NAME: &str = "name";
    /// Author email
    pub const EMAIL: &str = "email";
}

/// Form field → mutation variable
pub const REVIEW_VARIABLE_MAPPING: &[(&str, &str)] = &[
    (fields::SCORE, "rating"),
    (fields::TITLE, "title"),
    (fields::REVIEW, "text"),
    (fields::NAME, "name"),
    (fields::EMAIL, "email"),
];

/// Fallback for a domain error without a message
pub const GENERIC_REJECTION_MESSAGE: &str = "An error occurred.";

/// Fallback for a transport failure without a message
pub const GENERIC_TRANSPORT_MESSAGE: &str = "Failed to submit review. Please try again.";

/// `addProductReview` with every known error variant selected
pub const CREATE_PRODUCT_REVIEW_MUTATION: &str = r#"
mutation CreateProductReviewMutation(
  $productId: Long!,
  $title: String!,
  $text: String!,
  $rating: Int!,
  $name: String!,
  $email: String!
) {
  catalog {
    addProductReview(
      input: {
        productEntityId: $productId,
        review: {
          title: $title,
          text: $text,
          rating: $rating,
          author: $name,
          email: $email
        }
      }
    ) {
      errors {
        __typename
        ... on NotAuthorizedToAddProductReviewError {
          message
        }
        ... on CustomerAlreadyReviewedProductError {
          message
        }
        ... on ProductIdNotFoundError {
          message
        }
        ... on InvalidInputFieldsError {
          message
          fields
        }
        ... on Error {
          message
        }
      }
    }
  }
}
"#;

// =============================================================================
// Variables
// =============================================================================

/// Variables of [`CREATE_PRODUCT_REVIEW_MUTATION`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVariables {
    /// Product the review is for
    pub product_id: i64,
    /// From `title`
    pub title: String,
    /// From `review`
    pub text: String,
    /// From `score`
    pub rating: i32,
    /// From `name`
    pub name: String,
    /// From `email`
    pub email: String,
}

/// Validated values that cannot be mapped onto the mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Field absent from the validated values
    #[error("missing review field: {0}")]
    MissingField(&'static str),

    /// Field holds a number where text is expected
    #[error("review field {0} must be text")]
    NotText(&'static str),

    /// Field is not an integer in `i32` range
    #[error("review field {field} must be a whole number, got {value}")]
    NotInteger {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f64,
    },
}

impl ReviewVariables {
    /// Apply [`REVIEW_VARIABLE_MAPPING`] to validated form values
    pub fn from_values(product_id: i64, values: &ValidatedValues) -> Result<Self, MappingError> {
        Ok(Self {
            product_id,
            title: text(values, fields::TITLE)?,
            text: text(values, fields::REVIEW)?,
            rating: integer(values, fields::SCORE)?,
            name: text(values, fields::NAME)?,
            email: text(values, fields::EMAIL)?,
        })
    }
}

fn text(values: &ValidatedValues, field: &'static str) -> Result<String, MappingError> {
    let value = values.get(field).ok_or(MappingError::MissingField(field))?;
    value
        .as_text()
        .map(str::to_string)
        .ok_or(MappingError::NotText(field))
}

fn integer(values: &ValidatedValues, field: &'static str) -> Result<i32, MappingError> {
    let value = values.get(field).ok_or(MappingError::MissingField(field))?;
    let n = match value.as_number() {
        Some(n) => n,
        None => value
            .as_text()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(MappingError::NotInteger { field, value: f64::NAN })?,
    };
    if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return Err(MappingError::NotInteger { field, value: n });
    }
    Ok(n as i32)
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreateReviewData {
    catalog: Option<CatalogMutations>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogMutations {
    add_product_review: Option<AddProductReviewResult>,
}

#[derive(Debug, Deserialize)]
struct AddProductReviewResult {
    #[serde(default)]
    errors: Vec<ReviewError>,
}

/// Domain error variants of `addProductReview`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewErrorKind {
    /// `NotAuthorizedToAddProductReviewError`
    NotAuthorized,
    /// `CustomerAlreadyReviewedProductError`
    AlreadyReviewed,
    /// `ProductIdNotFoundError`
    ProductNotFound,
    /// Carries the offending input field names
    InvalidInputFields(Vec<String>),
    /// Any other typename, treated as message-only
    Other(Option<String>),
}

/// One domain error from the mutation payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewError {
    /// GraphQL `__typename`
    #[serde(rename = "__typename", default)]
    pub typename: Option<String>,
    /// Remote message, if any
    #[serde(default)]
    pub message: Option<String>,
    /// Offending input fields (`InvalidInputFieldsError` only)
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

impl ReviewError {
    /// Classify by typename
    pub fn kind(&self) -> ReviewErrorKind {
        match self.typename.as_deref() {
            Some("NotAuthorizedToAddProductReviewError") => ReviewErrorKind::NotAuthorized,
            Some("CustomerAlreadyReviewedProductError") => ReviewErrorKind::AlreadyReviewed,
            Some("ProductIdNotFoundError") => ReviewErrorKind::ProductNotFound,
            Some("InvalidInputFieldsError") => {
                ReviewErrorKind::InvalidInputFields(self.fields.clone().unwrap_or_default())
            }
            other => ReviewErrorKind::Other(other.map(str::to_string)),
        }
    }

    /// Message shown to the user
    pub fn display_message(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => GENERIC_REJECTION_MESSAGE,
        }
    }
}

// =============================================================================
// Mutation client
// =============================================================================

/// Outcome of one remote mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationResult {
    /// Remote call succeeded with no domain errors
    Accepted,
    /// Remote domain logic refused the review
    Rejected {
        /// One message per domain error
        messages: Vec<String>,
    },
    /// The call itself failed
    TransportFailure {
        /// Message fit to show the user
        message: String,
    },
}

/// Sends validated review values to a remote service
#[async_trait]
pub trait ReviewMutation: Send + Sync {
    /// Submit once. Never fails: every outcome is a [`MutationResult`].
    async fn submit(&self, values: &ValidatedValues) -> MutationResult;
}

#[async_trait]
impl<T: ReviewMutation + ?Sized> ReviewMutation for std::sync::Arc<T> {
    async fn submit(&self, values: &ValidatedValues) -> MutationResult {
        (**self).submit(values).await
    }
}

/// [`ReviewMutation`] against the commerce GraphQL API, bound to one product
#[derive(Clone)]
pub struct ProductReviewClient {
    client: GraphqlClient,
    product_id: i64,
}

impl ProductReviewClient {
    /// Bind a commerce client to a product
    pub fn new(client: GraphqlClient, product_id: i64) -> Self {
        Self { client, product_id }
    }

    /// Product reviews are submitted for
    pub fn product_id(&self) -> i64 {
        self.product_id
    }
}

#[async_trait]
impl ReviewMutation for ProductReviewClient {
    async fn submit(&self, values: &ValidatedValues) -> MutationResult {
        let variables = match ReviewVariables::from_values(self.product_id, values) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(product_id = self.product_id, error = %e, "review values not mappable");
                return MutationResult::TransportFailure { message: e.to_string() };
            }
        };

        let data: CreateReviewData = match self
            .client
            .execute(CREATE_PRODUCT_REVIEW_MUTATION, &variables)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(product_id = self.product_id, error = %e, "error submitting product review");
                let message = e
                    .user_messages()
                    .map(|messages| messages.join("; "))
                    .unwrap_or_else(|| GENERIC_TRANSPORT_MESSAGE.to_string());
                return MutationResult::TransportFailure { message };
            }
        };

        let errors = data
            .catalog
            .and_then(|c| c.add_product_review)
            .map(|r| r.errors)
            .unwrap_or_default();

        if errors.is_empty() {
            tracing::info!(product_id = self.product_id, "product review accepted");
            return MutationResult::Accepted;
        }

        for error in &errors {
            tracing::warn!(
                product_id = self.product_id,
                kind = ?error.kind(),
                reason = error.display_message(),
                "product review rejected"
            );
        }

        MutationResult::Rejected {
            messages: errors.iter().map(|e| e.display_message().to_string()).collect(),
        }
    }
}
