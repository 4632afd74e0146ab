use std::fmt;
use thiserror::Error;

use super::validation::ValidationError;
use crate::slug::ResolveError;

/// Kind of record an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Museum,
    Painting,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Museum => "museum",
            EntityKind::Painting => "painting",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },

    #[error("could not find a free unique_title for base '{base}' after {attempts} attempts")]
    SlugExhausted { base: String, attempts: u32 },

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GalleryError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        GalleryError::NotFound { entity, id }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GalleryError::NotFound { .. } => "not_found",
            GalleryError::Validation(_) => "validation",
            GalleryError::Conflict { .. } => "conflict",
            GalleryError::SlugExhausted { .. } => "slug_exhausted",
            GalleryError::Persistence(_) => "persistence",
            GalleryError::Internal(_) => "internal",
        }
    }
}

impl From<ResolveError<rusqlite::Error>> for GalleryError {
    fn from(err: ResolveError<rusqlite::Error>) -> Self {
        match err {
            ResolveError::Exhausted { base, attempts } => {
                GalleryError::SlugExhausted { base, attempts }
            }
            ResolveError::Probe(e) => GalleryError::Persistence(e),
        }
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;

/// Whether `err` is a UNIQUE constraint violation on `table.column`.
pub(crate) fn is_unique_violation(err: &rusqlite::Error, table: &str, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message)) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message.contains(&format!("{}.{}", table, column))
        }
        _ => false,
    }
}
