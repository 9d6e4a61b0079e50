use crate::{
    AppState,
    auth::{self, AuthAdmin},
    error::ApiError,
    models::{ExistsResponse, LoginRequest, TokenResponse, Voter, VoterRequest},
    validation,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

// --- Filter Structs ---

/// VoterFilter
///
/// Defines the accepted query parameters for the public voter listing endpoint
/// (GET /api/voters). Used by Axum's Query extractor to safely bind HTTP query
/// parameters for filtering and search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct VoterFilter {
    /// Optional free-text search matched case-insensitively against nombre,
    /// cedula, telefono and municipio.
    pub q: Option<String>,
    /// Optional case-insensitive exact municipality match.
    pub municipio: Option<String>,
}

/// ExistsQuery
///
/// Query parameter for the cedula existence check (GET /api/voters/exists).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ExistsQuery {
    pub cedula: Option<String>,
}

// --- Handlers ---

/// health
///
/// [Public Route] A simple, unauthenticated endpoint used for monitoring and load
/// balancer checks. Reports the service identity and that auth is enabled.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service healthy"))
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "registro-votantes-api", "auth": true }))
}

/// login
///
/// [Public Route] Exchanges the admin password for a signed, time-limited token.
/// A missing password is a validation failure; a wrong one is 401. The password
/// is never logged or persisted.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing password"),
        (status = 401, description = "Wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation(vec!["Falta contraseña".to_string()]))?;

    if password != state.config.admin_password {
        return Err(ApiError::Unauthenticated);
    }

    let token = auth::issue_token(&state.config)?;
    Ok(Json(TokenResponse { token }))
}

/// voter_exists
///
/// [Public Route] Checks whether a voter with exactly the given cedula exists.
/// The lookup key is passed through verbatim — no trimming — matching the
/// behavior existing registration clients rely on.
#[utoipa::path(
    get,
    path = "/api/voters/exists",
    params(ExistsQuery),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse),
        (status = 400, description = "Missing cedula")
    )
)]
pub async fn voter_exists(
    State(state): State<AppState>,
    Query(params): Query<ExistsQuery>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let cedula = params
        .cedula
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation(vec!["Falta cedula".to_string()]))?;

    let exists = state.repo.exists(&cedula).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// list_voters
///
/// [Public Route] Lists voter records newest-first, with optional search and
/// municipality filtering combined with AND.
#[utoipa::path(
    get,
    path = "/api/voters",
    params(VoterFilter),
    responses((status = 200, description = "List filtered voters", body = [Voter]))
)]
pub async fn list_voters(
    State(state): State<AppState>,
    Query(filter): Query<VoterFilter>,
) -> Result<Json<Vec<Voter>>, ApiError> {
    // Empty query params behave as absent, matching the original falsy checks.
    let q = filter.q.filter(|q| !q.is_empty());
    let municipio = filter.municipio.filter(|m| !m.is_empty());

    let voters = state.repo.list(q, municipio).await?;
    Ok(Json(voters))
}

/// create_voter
///
/// [Public Route] Registers a new voter. Validation runs before the store is
/// touched; a duplicate cedula surfaces as 409.
#[utoipa::path(
    post,
    path = "/api/voters",
    request_body = VoterRequest,
    responses(
        (status = 201, description = "Created", body = Voter),
        (status = 400, description = "Validation errors"),
        (status = 409, description = "Duplicate cedula")
    )
)]
pub async fn create_voter(
    State(state): State<AppState>,
    Json(payload): Json<VoterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let errors = validation::validate(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let voter = state.repo.create(payload.into_input()).await?;
    Ok((StatusCode::CREATED, Json(voter)))
}

/// update_voter
///
/// [Protected Route] Full-replace of the four business fields of an existing voter.
///
/// *Authorization*: The `AuthAdmin` extractor enforces the bearer-token admin gate
/// (401 without valid credentials, 403 for a non-admin role) before this body runs.
#[utoipa::path(
    put,
    path = "/api/voters/{id}",
    params(("id" = i32, Path, description = "Voter ID")),
    request_body = VoterRequest,
    responses(
        (status = 200, description = "Updated", body = Voter),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate cedula")
    )
)]
pub async fn update_voter(
    AuthAdmin { role: _role }: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<VoterRequest>,
) -> Result<Json<Voter>, ApiError> {
    let errors = validation::validate(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let voter = state.repo.update(id, payload.into_input()).await?;
    Ok(Json(voter))
}

/// delete_voter
///
/// [Protected Route] Removes a voter record. No soft-delete: the row is gone and
/// a subsequent exists/list no longer shows it.
#[utoipa::path(
    delete,
    path = "/api/voters/{id}",
    params(("id" = i32, Path, description = "Voter ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_voter(
    AuthAdmin { role: _role }: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.repo.delete(id).await?;
    Ok(Json(json!({ "ok": true })))
}
