use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Voter
///
/// Represents a voter record from the `public.voters` table. This is the primary
/// data structure for the core business logic.
///
/// The Spanish field names are the wire contract: existing clients depend on the
/// JSON payload using `nombre`/`cedula`/`telefono`/`municipio` exactly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Voter {
    // Primary Key, auto-assigned by the database sequence. Immutable.
    pub id: i32,
    pub nombre: String,
    /// National ID number; unique across all records.
    pub cedula: String,
    pub telefono: String,
    pub municipio: String,
    // Server-assigned creation timestamp. Immutable; drives list ordering.
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// VoterRequest
///
/// Input payload shared by create (POST /api/voters) and update (PUT /api/voters/{id}).
/// Update is full-replace, so both operations carry the same four business fields.
///
/// All fields are `Option<String>` so that a missing JSON key reaches the validator
/// (which reports "inválido") instead of being rejected by the deserializer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VoterRequest {
    pub nombre: Option<String>,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub municipio: Option<String>,
}

impl VoterRequest {
    /// into_input
    ///
    /// Converts a validated payload into the repository input. Only call after
    /// `validation::validate` returned no errors; absent fields collapse to empty
    /// strings, which validation has already ruled out.
    pub fn into_input(self) -> VoterInput {
        VoterInput {
            nombre: self.nombre.unwrap_or_default(),
            cedula: self.cedula.unwrap_or_default(),
            telefono: self.telefono.unwrap_or_default(),
            municipio: self.municipio.unwrap_or_default(),
        }
    }
}

/// VoterInput
///
/// The four business fields handed to the repository for create/update.
/// `id` and `created_at` are never caller-supplied.
#[derive(Debug, Clone)]
pub struct VoterInput {
    pub nombre: String,
    pub cedula: String,
    pub telefono: String,
    pub municipio: String,
}

impl VoterInput {
    /// trimmed
    ///
    /// Normalizes all four fields before storage. Both repository implementations
    /// apply this, so trimming behaves identically regardless of backend.
    pub fn trimmed(self) -> Self {
        Self {
            nombre: self.nombre.trim().to_string(),
            cedula: self.cedula.trim().to_string(),
            telefono: self.telefono.trim().to_string(),
            municipio: self.municipio.trim().to_string(),
        }
    }
}

/// LoginRequest
///
/// Input payload for the admin login endpoint (POST /api/auth/login).
/// The password is compared against the configured admin password and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// --- Response Schemas (Output) ---

/// TokenResponse
///
/// Output schema for a successful login: the signed, time-limited admin token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// ExistsResponse
///
/// Output schema for the cedula existence check (GET /api/voters/exists).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExistsResponse {
    pub exists: bool,
}
