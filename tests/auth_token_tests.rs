use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use registro_votantes::{
    auth::{self, ADMIN_ROLE, Claims},
    config::AppConfig,
    error::ApiError,
};

/// Signs arbitrary claims with the given secret, bypassing `issue_token`.
/// Used to simulate expired and foreign tokens.
fn sign_claims(role: &str, exp_offset_secs: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        role: role.to_string(),
        exp: (now + exp_offset_secs) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("signing test claims")
}

#[test]
fn issued_token_verifies_immediately() {
    let config = AppConfig::default();
    let token = auth::issue_token(&config).expect("token issuance");

    let claims = auth::verify_token(&token, &config).expect("verification");
    assert_eq!(claims.role, ADMIN_ROLE);
}

#[test]
fn issued_token_expiry_matches_configured_ttl() {
    let config = AppConfig::default();
    let token = auth::issue_token(&config).expect("token issuance");
    let claims = auth::verify_token(&token, &config).expect("verification");

    let ttl_secs = (config.token_ttl_hours * 3600) as usize;
    assert_eq!(claims.exp - claims.iat, ttl_secs);
}

#[test]
fn expired_token_fails_verification() {
    let config = AppConfig::default();
    // Expired well beyond the default 60s validation leeway.
    let token = sign_claims(ADMIN_ROLE, -3600, &config.jwt_secret);

    let err = auth::verify_token(&token, &config).unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[test]
fn token_signed_with_different_secret_fails_verification() {
    let config = AppConfig::default();
    let token = sign_claims(ADMIN_ROLE, 3600, "some-other-secret");

    let err = auth::verify_token(&token, &config).unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[test]
fn malformed_token_fails_verification() {
    let config = AppConfig::default();

    let err = auth::verify_token("not-a-jwt", &config).unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[test]
fn non_admin_role_survives_verification_for_the_gate_to_reject() {
    // Signature and expiry checks pass; the role check is the extractor's job
    // and maps to 403 rather than 401.
    let config = AppConfig::default();
    let token = sign_claims("viewer", 3600, &config.jwt_secret);

    let claims = auth::verify_token(&token, &config).expect("verification");
    assert_ne!(claims.role, ADMIN_ROLE);
}
