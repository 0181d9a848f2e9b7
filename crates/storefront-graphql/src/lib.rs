//! Storefront GraphQL
//!
//! Thin async clients for the two remote GraphQL services the storefront
//! talks to: the commerce API (product review mutation) and the public
//! countries API.
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront_graphql::{CountriesClient, GraphqlClient, GraphqlConfig};
//!
//! # async fn run() -> storefront_graphql::Result<()> {
//! let client = GraphqlClient::with_config(GraphqlConfig::new(
//!     storefront_graphql::DEFAULT_COUNTRIES_ENDPOINT,
//! ))?;
//! let countries = CountriesClient::new(client).fetch_countries().await?;
//! println!("{} countries", countries.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod countries;
pub mod error;
pub mod review;

pub use client::*;
pub use countries::*;
pub use error::*;
pub use review::*;

/// Crate version, sent in the user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
