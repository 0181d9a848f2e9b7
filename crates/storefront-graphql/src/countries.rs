//! Country listing query against the public countries API

use serde::{Deserialize, Serialize};

use crate::client::GraphqlClient;
use crate::error::Result;

/// Public countries API
pub const DEFAULT_COUNTRIES_ENDPOINT: &str = "https://countries.trevorblades.com/";

/// Every country with its continent and languages
pub const COUNTRIES_QUERY: &str = r#"
query CountriesQuery {
  countries {
    name
    native
    emoji
    continent {
      name
    }
    languages {
      code
      name
      native
    }
  }
}
"#;

/// One country of [`COUNTRIES_QUERY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// English name
    pub name: String,
    /// Name in the main local language
    pub native: String,
    /// Flag emoji
    pub emoji: String,
    /// Continent the country belongs to
    pub continent: Continent,
    /// Spoken languages
    #[serde(default)]
    pub languages: Vec<Language>,
}

/// Continent of a [`Country`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    /// English name
    pub name: String,
}

/// Language spoken in a [`Country`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// ISO 639-1 code
    pub code: String,
    /// English name
    pub name: String,
    /// Some languages have no native name upstream
    #[serde(default)]
    pub native: Option<String>,
}

#[derive(Deserialize)]
struct CountriesData {
    countries: Vec<Country>,
}

/// Read-side client for the country list
#[derive(Clone)]
pub struct CountriesClient {
    client: GraphqlClient,
}

impl CountriesClient {
    /// Wrap a client pointed at the countries endpoint
    pub fn new(client: GraphqlClient) -> Self {
        Self { client }
    }

    /// Fetch every country. No pagination or filtering.
    pub async fn fetch_countries(&self) -> Result<Vec<Country>> {
        let data: CountriesData = self
            .client
            .execute(COUNTRIES_QUERY, serde_json::json!({}))
            .await?;
        tracing::debug!(count = data.countries.len(), "fetched countries");
        Ok(data.countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GraphqlConfig;
    use crate::error::GraphqlError;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_countries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "query": COUNTRIES_QUERY })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "countries": [
                    {
                        "name": "Andorra",
                        "native": "Andorra",
                        "emoji": "🇦🇩",
                        "continent": { "name": "Europe" },
                        "languages": [{ "code": "ca", "name": "Catalan", "native": "Català" }]
                    },
                    {
                        "name": "Brazil",
                        "native": "Brasil",
                        "emoji": "🇧🇷",
                        "continent": { "name": "South America" },
                        "languages": [{ "code": "pt", "name": "Portuguese", "native": null }]
                    }
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GraphqlClient::with_config(GraphqlConfig::new(server.uri())).unwrap();
        let countries = CountriesClient::new(client).fetch_countries().await.unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].continent.name, "Europe");
        assert_eq!(countries[0].languages[0].native.as_deref(), Some("Català"));
        assert_eq!(countries[1].languages[0].native, None);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = GraphqlClient::with_config(GraphqlConfig::new(server.uri())).unwrap();
        let err = CountriesClient::new(client).fetch_countries().await.unwrap_err();
        assert!(matches!(err, GraphqlError::Status { status: 502, .. }));
    }
}
