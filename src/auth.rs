use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError};

/// The single privileged role this system knows about.
pub const ADMIN_ROLE: &str = "admin";

/// Claims
///
/// Represents the payload structure inside the admin JSON Web Token (JWT).
/// These claims are signed by the server's secret and validated upon every protected request.
/// The token is stateless: nothing is persisted server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The role asserted by this credential. Always "admin" for tokens we issue.
    pub role: String,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    /// Fixed at issuance as now + configured TTL (8 hours by default).
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// issue_token
///
/// Produces a signed token carrying `role = "admin"` with an expiry of
/// issuance time + configured TTL, signed with the process-wide secret.
pub fn issue_token(config: &AppConfig) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        role: ADMIN_ROLE.to_string(),
        exp: (now + config.token_ttl()).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token encoding failed: {:?}", e);
        ApiError::Internal
    })
}

/// verify_token
///
/// Validates signature and expiry and returns the embedded claims.
/// Any failure (bad signature, malformed token, expired) collapses to
/// `Unauthenticated`; the role check is the extractor's job.
pub fn verify_token(token: &str, config: &AppConfig) -> Result<Claims, ApiError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::default();

    // Ensure expiration time validation is always active.
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            // Token expired: the most common failure for a valid-but-old token.
            ErrorKind::ExpiredSignature => Err(ApiError::Unauthenticated),
            // Catch all other failure types (bad signature, malformed token, etc.).
            _ => Err(ApiError::Unauthenticated),
        },
    }
}

/// AuthAdmin Extractor Result
///
/// The resolved identity of a request that passed the admin gate. Handlers on
/// protected routes take this as an argument, which both enforces the gate and
/// carries the verified role into the request context.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    /// The verified role from the token claims. Always "admin" past the gate.
    pub role: String,
}

/// AuthAdmin Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthAdmin usable as a function
/// argument in any protected handler. This cleanly separates authentication
/// (extractor) from business logic (the handler).
///
/// The process:
/// 1. Token Extraction: `Authorization: Bearer <token>` — missing header or
///    missing prefix rejects with 401.
/// 2. Verification: signature + expiry via `verify_token` — failure rejects with 401.
/// 3. Role Check: anything other than "admin" rejects with 403.
///
/// This gate is the only authorization check in the system; all other endpoints
/// are unauthenticated by design.
impl<S> FromRequestParts<S> for AuthAdmin
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the signing secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        // 2. Signature and Expiry Verification
        let claims = verify_token(token, &config)?;

        // 3. Role Check
        // A token with a valid signature but the wrong role is authenticated
        // yet not privileged, hence 403 rather than 401.
        if claims.role != ADMIN_ROLE {
            return Err(ApiError::Forbidden);
        }

        Ok(AuthAdmin { role: claims.role })
    }
}
