use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// Everything except update/delete is deliberately open: the registry accepts
/// registrations and serves reads without credentials, and only destructive
/// writes sit behind the admin gate.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns the service identity immediately to verify the service is responsive.
        .route("/", get(handlers::health))
        // POST /api/auth/login
        // Exchanges the admin password for a signed, time-limited bearer token.
        // This is the sole entry point into the protected surface.
        .route("/api/auth/login", post(handlers::login))
        // GET /api/voters/exists?cedula=...
        // Existence check used by registration clients to pre-flight duplicates.
        // The cedula is matched verbatim (no trimming).
        .route("/api/voters/exists", get(handlers::voter_exists))
        // GET /api/voters?q=...&municipio=...
        // Lists all voters newest-first, with optional case-insensitive search
        // and municipality filtering.
        // POST /api/voters
        // Registers a new voter. Field validation and the cedula uniqueness
        // constraint are enforced before/at the store.
        .route(
            "/api/voters",
            get(handlers::list_voters).post(handlers::create_voter),
        )
}
