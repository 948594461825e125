use crate::media::MediaError;
use crate::records::validation::ValidationErrors;
use sea_orm::{DbErr, SqlErr};

/// Every way an archive operation can be turned down. All of them are
/// reported back to whoever submitted the request; none are retried.
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{field} {value:?} already exists")]
    Duplicate { field: &'static str, value: String },
    #[error("cannot delete {entity} #{id}: still referenced by {dependents} language record(s)")]
    Protected {
        entity: &'static str,
        id: i32,
        dependents: u64,
    },
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl ArchiveError {
    /// Maps a unique-index violation to `Duplicate`, anything else to `Database`.
    pub fn from_write(err: DbErr, field: &'static str, value: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ArchiveError::Duplicate {
                field,
                value: value.to_string(),
            },
            _ => ArchiveError::Database(err),
        }
    }
}
