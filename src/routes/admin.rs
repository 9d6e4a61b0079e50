use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to holders of a valid admin token:
/// the two destructive operations on voter records.
///
/// Access Control:
/// This entire router is wrapped (in `create_router`) in a middleware layer that
/// runs the `AuthAdmin` extractor, rejecting with 401 for missing/invalid
/// credentials and 403 for a non-admin role before any handler executes. The
/// handlers additionally take `AuthAdmin` as an argument, carrying the verified
/// role into the request context.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PUT/DELETE /api/voters/{id}
        // Full-replace update of the four business fields, and permanent removal
        // (no soft-delete) of a voter record.
        .route(
            "/api/voters/{id}",
            put(handlers::update_voter).delete(handlers::delete_voter),
        )
}
