//! Test fixture creation for the gallery database

use super::constants::*;
use anyhow::Result;
use art_gallery_server::{SlugGenerator, SqliteGalleryStore};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary gallery database with 2 artists and 2 museums and no
/// paintings. Returns (temp_dir, db_path).
pub fn create_test_gallery() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("gallery.db");

    // Opening the store once creates the schema
    drop(SqliteGalleryStore::new(&db_path, 1, SlugGenerator::default())?);

    let conn = Connection::open(&db_path)?;

    conn.execute(
        "INSERT INTO artists (id, artist_short_name, artist_long_name, dob, dod) \
         VALUES (?1, ?2, ?3, '1881-07-03', '1962-10-17')",
        params![ARTIST_1_ID, ARTIST_1_SHORT_NAME, ARTIST_1_LONG_NAME],
    )?;
    conn.execute(
        "INSERT INTO artists (id, artist_short_name, artist_long_name, dob, dod) \
         VALUES (?1, ?2, ?3, '1891-12-05', '1956-12-03')",
        params![ARTIST_2_ID, ARTIST_2_SHORT_NAME, ARTIST_2_LONG_NAME],
    )?;

    conn.execute(
        "INSERT INTO museums (id, name, name_unique, city, country, country_code) \
         VALUES (?1, ?2, ?3, 'Санкт-Петербург', 'Россия', 7)",
        params![MUSEUM_1_ID, MUSEUM_1_NAME, MUSEUM_1_NAME_UNIQUE],
    )?;
    conn.execute(
        "INSERT INTO museums (id, name, name_unique, city, country, country_code) \
         VALUES (?1, ?2, ?3, 'Москва', 'Россия', 7)",
        params![MUSEUM_2_ID, MUSEUM_2_NAME, MUSEUM_2_NAME_UNIQUE],
    )?;

    Ok((dir, db_path))
}
