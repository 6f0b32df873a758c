//! People API endpoints.
//!
//! Create and update take their payload as a `changes=` query parameter
//! holding a flat `field=value@…` change list, the format the browser
//! client has always sent (the framework percent-decodes it for us).

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::changes;
use crate::errors::AppError;
use crate::models::Person;
use crate::AppState;

/// Query parameters for GET /api/people.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring filter on first or last name.
    #[serde(default)]
    pub search: Option<String>,
}

/// Query parameters for POST and PUT.
#[derive(Debug, Deserialize)]
pub struct ChangesParams {
    pub changes: String,
}

/// GET /api/people - List all people, optionally filtered.
pub async fn list_people(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Person>> {
    let people = state.repo.list_people(params.search.as_deref()).await?;
    success(people)
}

/// GET /api/people/:id - Get a single person.
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Person> {
    match state.repo.get_person(id).await? {
        Some(person) => success(person),
        None => Err(AppError::NotFound(format!("Person {} not found", id))),
    }
}

/// POST /api/people?changes=... - Create a person from a change list.
pub async fn create_person(
    State(state): State<AppState>,
    Query(params): Query<ChangesParams>,
) -> ApiResult<Person> {
    let decoded = changes::decode(&params.changes);

    if !decoded.any_recognized {
        return Err(AppError::BadRequest(
            "Change list contained no recognized fields".to_string(),
        ));
    }

    // First and last name are required for a new person
    if decoded.patch.first_name.as_deref().unwrap_or("").trim().is_empty()
        || decoded.patch.last_name.as_deref().unwrap_or("").trim().is_empty()
    {
        return Err(AppError::Validation(
            "First and last name are required".to_string(),
        ));
    }

    let person = state
        .repo
        .create_person(&decoded.patch, &decoded.interest_changes)
        .await?;

    tracing::info!(
        person_id = person.person_id,
        "Created person {} {}",
        person.first_name,
        person.last_name
    );

    success(person)
}

/// PUT /api/people/:id?changes=... - Apply a change list to a person.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ChangesParams>,
) -> ApiResult<Person> {
    let decoded = changes::decode(&params.changes);

    // Interest directives alone still count as a successful update.
    if !decoded.any_recognized {
        return Err(AppError::BadRequest(
            "Change list contained no recognized fields".to_string(),
        ));
    }

    let person = state
        .repo
        .update_person(id, &decoded.patch, &decoded.interest_changes)
        .await?;

    success(person)
}

/// DELETE /api/people/:id - Delete a person, returning their last state.
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Person> {
    let person = state.repo.delete_person(id).await?;

    tracing::info!(person_id = id, "Deleted person");

    success(person)
}
