/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is applied explicitly at the module
/// level (via Axum layers), preventing accidental exposure of protected endpoints.

/// Routes accessible to all users (health, login, exists-check, list, create).
/// Unauthenticated by design.
pub mod public;

/// Routes restricted to holders of a valid admin token (update, delete).
/// Protected by the `AuthAdmin` extractor middleware.
pub mod admin;
