//! GraphQL transport
//!
//! One POST per operation, `{query, variables}` in, `{data, errors}` out.
//! There is no retry here: a failed request is reported to the caller as-is.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::error::{GraphqlError, Result};
use crate::VERSION;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a GraphQL endpoint
#[derive(Debug, Clone)]
pub struct GraphqlConfig {
    /// Absolute URL of the GraphQL endpoint
    pub endpoint: String,
    /// Sent as `Authorization: Bearer <token>` when set
    pub token: Option<String>,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl GraphqlConfig {
    /// Anonymous endpoint with the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// GraphQL client for a single endpoint
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct GraphqlClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    endpoint: Url,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorBody>,
}

#[derive(Deserialize)]
struct GraphqlErrorBody {
    #[serde(default)]
    message: String,
}

impl GraphqlClient {
    /// Build a client from configuration
    pub fn with_config(config: GraphqlConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&format!("storefront-graphql/{}", VERSION))
                .map_err(|e| GraphqlError::Config(e.to_string()))?,
        );
        if let Some(token) = &config.token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GraphqlError::Config("invalid API token".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { endpoint, http }),
        })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Run one operation and decode its `data`
    pub async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint = %self.inner.endpoint, "sending GraphQL request");

        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let decoded = serde_json::from_slice::<GraphqlResponse<T>>(&body);

        if !status.is_success() {
            // Some servers report operation errors with a 4xx status
            if let Ok(resp) = &decoded {
                if !resp.errors.is_empty() {
                    return Err(GraphqlError::Response(error_messages(&resp.errors)));
                }
            }
            return Err(GraphqlError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let resp = decoded?;
        if !resp.errors.is_empty() {
            return Err(GraphqlError::Response(error_messages(&resp.errors)));
        }
        resp.data.ok_or(GraphqlError::NoData)
    }
}

fn error_messages(errors: &[GraphqlErrorBody]) -> Vec<String> {
    errors
        .iter()
        .map(|e| {
            if e.message.is_empty() {
                "unknown GraphQL error".to_string()
            } else {
                e.message.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shop {
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct ShopData {
        shop: Shop,
    }

    async fn client_for(server: &MockServer) -> GraphqlClient {
        GraphqlClient::with_config(GraphqlConfig::new(format!("{}/graphql", server.uri()))).unwrap()
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = GraphqlClient::with_config(GraphqlConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, GraphqlError::Url(_)));
    }

    #[tokio::test]
    async fn test_execute_decodes_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "query": "{ shop { name } }", "variables": { "id": 7 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "shop": { "name": "Corner Store" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data: ShopData = client_for(&server)
            .await
            .execute("{ shop { name } }", json!({ "id": 7 }))
            .await
            .unwrap();
        assert_eq!(data.shop, Shop { name: "Corner Store".into() });
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "shop": { "name": "x" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphqlClient::with_config(
            GraphqlConfig::new(server.uri()).with_token("secret-token"),
        )
        .unwrap();
        let _: ShopData = client.execute("{ shop { name } }", json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_top_level_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Field 'shop' doesn't exist" }, {}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute::<_, ShopData>("{ shop }", json!({}))
            .await
            .unwrap_err();
        match err {
            GraphqlError::Response(messages) => assert_eq!(
                messages,
                ["Field 'shop' doesn't exist", "unknown GraphQL error"]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_with_graphql_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{ "message": "Syntax Error" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute::<_, ShopData>("{", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphqlError::Response(ref m) if m == &["Syntax Error"]));
    }

    #[tokio::test]
    async fn test_error_status_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute::<_, ShopData>("{ shop { name } }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphqlError::Status { status: 503, ref body } if body == "unavailable"));
    }

    #[tokio::test]
    async fn test_missing_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute::<_, ShopData>("{ shop { name } }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphqlError::NoData));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .execute::<_, ShopData>("{ shop { name } }", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphqlError::Json(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "shop": { "name": "x" } } }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GraphqlClient::with_config(
            GraphqlConfig::new(server.uri()).with_timeout(Duration::from_millis(50)),
        )
        .unwrap();
        let err = client
            .execute::<_, ShopData>("{ shop { name } }", json!({}))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
