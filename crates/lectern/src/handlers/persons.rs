use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;

use crate::{handlers::AppError, models::CreatePerson, state::AppState};

/// List all persons (GET /api/persons).
pub async fn list_persons(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let persons = state.persons.list_persons().await?;
    Ok(Json(persons))
}

/// Quick-add a person (POST /api/persons).
///
/// Used by the submission form to register a speaker who is not in the
/// directory yet.
pub async fn create_person(
    State(state): State<AppState>,
    Form(payload): Form<CreatePerson>,
) -> Result<impl IntoResponse, AppError> {
    let person = payload.into_person()?;
    state.persons.create_person(&person).await?;

    tracing::info!(person_id = %person.id, name = %person.name, "Created person");

    Ok((StatusCode::CREATED, Json(person)))
}

/// Query parameters for name suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

/// Typeahead name suggestions (GET /api/persons/suggest?q=).
pub async fn suggest_persons(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<impl IntoResponse, AppError> {
    let persons = state.persons.suggest_persons(&params.q).await?;
    Ok(Json(persons))
}
