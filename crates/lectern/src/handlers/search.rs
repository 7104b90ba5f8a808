use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use lectern_core::events::ValidationError;
use lectern_core::search::base_request;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// URL token of a date bucket, e.g. `next_7`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Search published events (GET /api/search).
///
/// One index call returns the matching events plus facet counts over
/// speakers, location and topics, and the per-date-bucket counts. The
/// optional date token narrows the result set via the facet
/// configuration; an unknown token is a validation error, not a pass-
/// through to the index.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut request = base_request(&params.q);

    if let Some(token) = &params.date {
        request = request
            .with_date_token(token)
            .ok_or_else(|| ValidationError::Field {
                field: "date",
                message: format!("unknown date filter: {token}"),
            })?;
    }
    if let Some(page) = params.page {
        request = request.with_page(page);
    }

    let results = state.search.search(&request).await?;
    Ok(Json(results))
}
