//! Country listing endpoint

use axum::{extract::State, Json};
use std::sync::Arc;
use storefront_graphql::Country;

use crate::{error::ApiError, AppState};

pub async fn list_countries(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Country>>, ApiError> {
    let countries = state.countries.fetch_countries().await?;
    Ok(Json(countries))
}
