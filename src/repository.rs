use crate::models::{Voter, VoterInput};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI32, Ordering},
};
use thiserror::Error;

/// RepoError
///
/// Typed failures surfaced by the persistence layer. The structured
/// `UniqueViolation` variant replaces string-matching on database error text:
/// detection goes through sqlx's `DatabaseError::is_unique_violation`.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A write collided with the uniqueness constraint on `cedula`.
    #[error("unique key violation")]
    UniqueViolation,
    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,
    /// Any other database failure; logged by the caller, never shown to clients.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// Defines the abstract contract for all voter persistence operations. This is the
/// core of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn VoterRepository>`) safely shareable across Axum's asynchronous task boundaries.
///
/// Concurrency control is delegated entirely to the backing store: every operation
/// here is a single atomic statement, so a race between two creates with the same
/// cedula yields exactly one success and one `UniqueViolation`.
#[async_trait]
pub trait VoterRepository: Send + Sync {
    /// True iff a row with exactly this cedula exists. The lookup key is used
    /// verbatim — no trimming — for compatibility with existing clients.
    async fn exists(&self, cedula: &str) -> Result<bool, RepoError>;

    /// Lists voters newest-first. `q` is a case-insensitive substring match OR-ed
    /// across the four text fields; `municipio` is a case-insensitive exact match.
    /// Both filters, when present, combine with AND.
    async fn list(
        &self,
        q: Option<String>,
        municipio: Option<String>,
    ) -> Result<Vec<Voter>, RepoError>;

    /// Inserts a new voter (fields trimmed); the database assigns id and created_at.
    async fn create(&self, input: VoterInput) -> Result<Voter, RepoError>;

    /// Full-replace of the four business fields (trimmed). `id` and `created_at`
    /// are never mutated.
    async fn update(&self, id: i32, input: VoterInput) -> Result<Voter, RepoError>;

    /// Removes the row, or `NotFound` if no row matched.
    async fn delete(&self, id: i32) -> Result<(), RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn VoterRepository>;

/// PostgresRepository
///
/// The concrete implementation of the `VoterRepository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Classifies a sqlx error, surfacing unique-key collisions as the structured
/// `UniqueViolation` variant instead of inspecting error message text.
fn map_write_err(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepoError::UniqueViolation;
        }
    }
    RepoError::Database(e)
}

#[async_trait]
impl VoterRepository for PostgresRepository {
    async fn exists(&self, cedula: &str) -> Result<bool, RepoError> {
        let row: Option<i32> = sqlx::query_scalar("SELECT 1 FROM voters WHERE cedula = $1 LIMIT 1")
            .bind(cedula)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// list
    ///
    /// Implements flexible search/filtering using QueryBuilder for safe
    /// parameterization — every client-supplied value goes through `push_bind`,
    /// never string interpolation.
    async fn list(
        &self,
        q: Option<String>,
        municipio: Option<String>,
    ) -> Result<Vec<Voter>, RepoError> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, nombre, cedula, telefono, municipio, created_at FROM voters WHERE true",
        );

        if let Some(m) = municipio {
            builder.push(" AND LOWER(municipio) = LOWER(");
            builder.push_bind(m);
            builder.push(")");
        }

        if let Some(q) = q {
            // Case-insensitive substring search across all four text fields.
            let pattern = format!("%{}%", q);
            builder.push(" AND (nombre ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR cedula ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR telefono ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR municipio ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let voters = builder
            .build_query_as::<Voter>()
            .fetch_all(&self.pool)
            .await?;
        Ok(voters)
    }

    async fn create(&self, input: VoterInput) -> Result<Voter, RepoError> {
        let input = input.trimmed();
        sqlx::query_as::<_, Voter>(
            "INSERT INTO voters (nombre, cedula, telefono, municipio) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, nombre, cedula, telefono, municipio, created_at",
        )
        .bind(&input.nombre)
        .bind(&input.cedula)
        .bind(&input.telefono)
        .bind(&input.municipio)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)
    }

    async fn update(&self, id: i32, input: VoterInput) -> Result<Voter, RepoError> {
        let input = input.trimmed();
        sqlx::query_as::<_, Voter>(
            "UPDATE voters SET nombre = $1, cedula = $2, telefono = $3, municipio = $4 \
             WHERE id = $5 \
             RETURNING id, nombre, cedula, telefono, municipio, created_at",
        )
        .bind(&input.nombre)
        .bind(&input.cedula)
        .bind(&input.telefono)
        .bind(&input.municipio)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_err)?
        .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM voters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

// --- The Mock Implementation (For Unit/Integration Tests) ---

/// MockVoterRepository
///
/// An in-memory implementation of `VoterRepository` used exclusively for testing.
/// This allows the full router and handler stack to be exercised without a network
/// connection to Postgres, isolating the test boundary.
///
/// It mirrors the store semantics: verbatim exists-lookup, trimmed writes, the
/// cedula uniqueness constraint, and newest-first ordering (ties broken by
/// descending id for determinism).
pub struct MockVoterRepository {
    voters: Mutex<Vec<Voter>>,
    next_id: AtomicI32,
}

impl MockVoterRepository {
    pub fn new() -> Self {
        Self {
            voters: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MockVoterRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoterRepository for MockVoterRepository {
    async fn exists(&self, cedula: &str) -> Result<bool, RepoError> {
        let voters = self.voters.lock().expect("mock repository lock poisoned");
        Ok(voters.iter().any(|v| v.cedula == cedula))
    }

    async fn list(
        &self,
        q: Option<String>,
        municipio: Option<String>,
    ) -> Result<Vec<Voter>, RepoError> {
        let voters = self.voters.lock().expect("mock repository lock poisoned");
        let needle = q.map(|q| q.to_lowercase());
        let muni = municipio.map(|m| m.to_lowercase());

        let mut result: Vec<Voter> = voters
            .iter()
            .filter(|v| match &muni {
                Some(m) => v.municipio.to_lowercase() == *m,
                None => true,
            })
            .filter(|v| match &needle {
                Some(n) => [&v.nombre, &v.cedula, &v.telefono, &v.municipio]
                    .iter()
                    .any(|field| field.to_lowercase().contains(n)),
                None => true,
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(result)
    }

    async fn create(&self, input: VoterInput) -> Result<Voter, RepoError> {
        let input = input.trimmed();
        let mut voters = self.voters.lock().expect("mock repository lock poisoned");
        if voters.iter().any(|v| v.cedula == input.cedula) {
            return Err(RepoError::UniqueViolation);
        }
        let voter = Voter {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            nombre: input.nombre,
            cedula: input.cedula,
            telefono: input.telefono,
            municipio: input.municipio,
            created_at: Utc::now(),
        };
        voters.push(voter.clone());
        Ok(voter)
    }

    async fn update(&self, id: i32, input: VoterInput) -> Result<Voter, RepoError> {
        let input = input.trimmed();
        let mut voters = self.voters.lock().expect("mock repository lock poisoned");
        // Existence first: a missing row is 404 even if the new cedula would collide.
        if !voters.iter().any(|v| v.id == id) {
            return Err(RepoError::NotFound);
        }
        if voters.iter().any(|v| v.cedula == input.cedula && v.id != id) {
            return Err(RepoError::UniqueViolation);
        }
        let voter = voters
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(RepoError::NotFound)?;
        voter.nombre = input.nombre;
        voter.cedula = input.cedula;
        voter.telefono = input.telefono;
        voter.municipio = input.municipio;
        Ok(voter.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut voters = self.voters.lock().expect("mock repository lock poisoned");
        let before = voters.len();
        voters.retain(|v| v.id != id);
        if voters.len() < before {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}
