//! Validation for gallery entities.
//!
//! Payload checks run before anything touches the store. Reference checks
//! (`ensure_artist_exists`, `ensure_museum_exists`) run inside the write
//! transaction that is about to reference the row.

use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;

use super::error::{EntityKind, GalleryError, GalleryResult};
use super::models::{NewArtist, NewMuseum, NewPainting, PaintingUpdate};

pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField { field: &'static str },
    TooLong { field: &'static str, max: usize },
    NullNotAllowed { field: &'static str },
    OutOfRange { field: &'static str, min: i64, max: i64 },
    Malformed(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::TooLong { field, max } => {
                write!(f, "Field '{}' must be at most {} characters", field, max)
            }
            ValidationError::NullNotAllowed { field } => {
                write!(f, "Field '{}' may not be null", field)
            }
            ValidationError::OutOfRange { field, min, max } => {
                write!(f, "Field '{}' must be between {} and {}", field, min, max)
            }
            ValidationError::Malformed(details) => write!(f, "{}", details),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn validate_title(title: &str) -> ValidationResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "title" });
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(())
}

fn require_non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub fn validate_new_painting(painting: &NewPainting) -> ValidationResult<()> {
    validate_title(&painting.title)
}

pub fn validate_painting_update(update: &PaintingUpdate) -> ValidationResult<()> {
    match &update.title {
        Some(None) => return Err(ValidationError::NullNotAllowed { field: "title" }),
        Some(Some(title)) => validate_title(title)?,
        None => {}
    }
    if let Some(None) = update.artist_id {
        return Err(ValidationError::NullNotAllowed { field: "artist_id" });
    }
    if let Some(None) = update.museum_id {
        return Err(ValidationError::NullNotAllowed { field: "museum_id" });
    }
    Ok(())
}

pub fn validate_new_artist(artist: &NewArtist) -> ValidationResult<()> {
    require_non_empty("artist_short_name", &artist.artist_short_name)?;
    require_non_empty("artist_long_name", &artist.artist_long_name)
}

pub fn validate_new_museum(museum: &NewMuseum) -> ValidationResult<()> {
    require_non_empty("name", &museum.name)?;
    require_non_empty("name_unique", &museum.name_unique)
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row(sql, params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Fails with `NotFound(artist)` when no artist has this id.
pub fn ensure_artist_exists(conn: &Connection, id: i64) -> GalleryResult<()> {
    if row_exists(conn, "SELECT 1 FROM artists WHERE id = ?1", id)? {
        Ok(())
    } else {
        Err(GalleryError::not_found(EntityKind::Artist, id))
    }
}

/// Fails with `NotFound(museum)` when no museum has this id.
pub fn ensure_museum_exists(conn: &Connection, id: i64) -> GalleryResult<()> {
    if row_exists(conn, "SELECT 1 FROM museums WHERE id = ?1", id)? {
        Ok(())
    } else {
        Err(GalleryError::not_found(EntityKind::Museum, id))
    }
}
