//! Storefront API
//!
//! HTTP surface for the storefront: product review submission and the
//! country list.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET  | `/health` | liveness |
//! | GET  | `/api/products/:product_id/reviews/form` | review form schema |
//! | POST | `/api/products/:product_id/reviews` | submit a review |
//! | GET  | `/api/countries` | country list |

pub mod config;
pub mod error;
pub mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use storefront_forms::FieldSchema;
use storefront_graphql::{CountriesClient, GraphqlClient};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorResponse};

/// Shared state
pub struct AppState {
    /// Commerce API client, bound to a product per review request
    pub commerce: GraphqlClient,
    pub countries: CountriesClient,
    pub review_form: FieldSchema,
}

impl AppState {
    pub fn new(commerce: GraphqlClient, countries: CountriesClient) -> Self {
        Self {
            commerce,
            countries,
            review_form: storefront_reviews::review_form_schema(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let commerce = GraphqlClient::with_config(config.commerce_graphql()?)?;
        let countries = CountriesClient::new(GraphqlClient::with_config(config.countries_graphql())?);
        Ok(Self::new(commerce, countries))
    }
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products/:product_id/reviews", routes::reviews::router())
        .route("/countries", get(routes::countries::list_countries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use storefront_graphql::GraphqlConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REVIEW: [(&str, &str); 5] = [
        ("score", "5"),
        ("title", "Great"),
        ("review", "Loved it"),
        ("name", "Ana"),
        ("email", "ana@example.com"),
    ];

    fn server_for(upstream: &MockServer) -> TestServer {
        let commerce =
            GraphqlClient::with_config(GraphqlConfig::new(format!("{}/commerce", upstream.uri()))).unwrap();
        let countries = CountriesClient::new(
            GraphqlClient::with_config(GraphqlConfig::new(format!("{}/countries", upstream.uri()))).unwrap(),
        );
        TestServer::new(build_router(AppState::new(commerce, countries))).unwrap()
    }

    async fn mount_review_errors(upstream: &MockServer, errors: Value, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/commerce"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "catalog": { "addProductReview": { "errors": errors } } }
            })))
            .expect(expected_calls)
            .mount(upstream)
            .await;
    }

    #[tokio::test]
    async fn test_health() {
        let upstream = MockServer::start().await;
        let response = server_for(&upstream).get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_review_form_schema() {
        let upstream = MockServer::start().await;
        let response = server_for(&upstream).get("/api/products/155/reviews/form").await;
        response.assert_status_ok();

        let fields = response.json::<Value>();
        let names: Vec<_> = fields
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["score", "title", "review", "name", "email"]);
    }

    #[tokio::test]
    async fn test_submit_form_encoded_review() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/commerce"))
            .and(body_partial_json(json!({ "variables": { "productId": 155, "rating": 5 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "catalog": { "addProductReview": { "errors": [] } } }
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let response = server_for(&upstream)
            .post("/api/products/155/reviews")
            .form(&REVIEW)
            .await;

        response.assert_status_ok();
        let reply = response.json::<Value>();
        assert_eq!(reply["status"], "success");
        assert_eq!(reply["reset_form"], true);
        assert_eq!(reply["refresh"], true);
        assert_eq!(reply["form_errors"], json!([]));
    }

    #[tokio::test]
    async fn test_submit_json_review_with_numeric_score() {
        let upstream = MockServer::start().await;
        mount_review_errors(&upstream, json!([]), 1).await;

        let response = server_for(&upstream)
            .post("/api/products/77/reviews")
            .json(&json!({
                "score": 4,
                "title": "Good",
                "review": "Solid",
                "name": "Bo",
                "email": "bo@example.com"
            }))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_missing_score_is_unprocessable() {
        let upstream = MockServer::start().await;
        mount_review_errors(&upstream, json!([]), 0).await;

        let response = server_for(&upstream)
            .post("/api/products/155/reviews")
            .form(&REVIEW[1..])
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let reply = response.json::<Value>();
        assert_eq!(reply["status"], "error");
        assert_eq!(reply["field_errors"]["score"], json!(["required"]));
        assert_eq!(reply["fields"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_remote_rejection_is_unprocessable() {
        let upstream = MockServer::start().await;
        mount_review_errors(
            &upstream,
            json!([{
                "__typename": "CustomerAlreadyReviewedProductError",
                "message": "You have already reviewed this product"
            }]),
            1,
        )
        .await;

        let response = server_for(&upstream)
            .post("/api/products/155/reviews")
            .form(&REVIEW)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.json::<Value>()["form_errors"],
            json!(["You have already reviewed this product"])
        );
    }

    #[tokio::test]
    async fn test_nested_json_value_is_bad_request() {
        let upstream = MockServer::start().await;
        let response = server_for(&upstream)
            .post("/api/products/155/reviews")
            .json(&json!({ "score": [5] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_list_countries() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "countries": [{
                    "name": "Chile",
                    "native": "Chile",
                    "emoji": "🇨🇱",
                    "continent": { "name": "South America" },
                    "languages": [{ "code": "es", "name": "Spanish", "native": "Español" }]
                }]}
            })))
            .mount(&upstream)
            .await;

        let response = server_for(&upstream).get("/api/countries").await;
        response.assert_status_ok();
        let countries = response.json::<Value>();
        assert_eq!(countries[0]["name"], "Chile");
        assert_eq!(countries[0]["continent"]["name"], "South America");
    }

    #[tokio::test]
    async fn test_countries_upstream_failure_is_bad_gateway() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>stack trace</html>"))
            .mount(&upstream)
            .await;

        let response = server_for(&upstream).get("/api/countries").await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        let body = response.json::<Value>();
        assert_eq!(body["code"], "upstream_error");
        assert_eq!(body["message"], error::UPSTREAM_MESSAGE);
    }
}
