//! Product review endpoints

use axum::async_trait;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use storefront_forms::{FieldSchema, SubmittedValues};
use storefront_graphql::ProductReviewClient;
use storefront_reviews::{Reply, SubmissionOrchestrator};

use crate::{error::ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(submit_review))
        .route("/form", get(review_form))
}

/// Raw form values from either a urlencoded or a JSON body
///
/// JSON scalars are stringified so both encodings validate the same way;
/// `null` reads as absent.
pub struct Submission(pub SubmittedValues);

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if !is_json {
            let Form(values) = Form::<SubmittedValues>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return Ok(Self(values));
        }

        let Json(raw) = Json::<BTreeMap<String, Value>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut values = SubmittedValues::new();
        for (name, value) in raw {
            match value {
                Value::Null => {}
                Value::String(s) => values.insert(name, s),
                Value::Number(n) => values.insert(name, n.to_string()),
                Value::Bool(b) => values.insert(name, b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::BadRequest(format!("field {} must be a scalar", name)));
                }
            }
        }
        Ok(Self(values))
    }
}

/// Schema of the review form
pub async fn review_form(
    State(state): State<Arc<AppState>>,
    Path(_product_id): Path<i64>,
) -> Json<FieldSchema> {
    Json(state.review_form.clone())
}

/// Submit a review for a product
///
/// 200 with a success reply, 422 with an error reply. The body has the same
/// shape either way.
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Submission(submitted): Submission,
) -> (StatusCode, Json<Reply>) {
    let mutation = ProductReviewClient::new(state.commerce.clone(), product_id);
    let reply = SubmissionOrchestrator::new(mutation)
        .handle(&state.review_form, &submitted)
        .await;

    tracing::info!(product_id, success = reply.is_success(), "review submission handled");

    let status = if reply.is_success() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(reply))
}
