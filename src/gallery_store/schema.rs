//! SQLite schema definitions for the gallery database.
//!
//! Timestamps are unix seconds. `materials` and `style` hold JSON arrays of
//! strings.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("artist_short_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist_long_name", &SqlType::Text, non_null = true),
        sqlite_column!("dob", &SqlType::Text),
        sqlite_column!("dob_place", &SqlType::Text),
        sqlite_column!("dod", &SqlType::Text),
        sqlite_column!("dod_place", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
    ],
    indices: &[("idx_artists_short_name", "artist_short_name")],
    unique_constraints: &[],
};

const MUSEUMS_TABLE: Table = Table {
    name: "museums",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("name_unique", &SqlType::Text, non_null = true),
        sqlite_column!("contact", &SqlType::Text),
        sqlite_column!("profile", &SqlType::Text),
        sqlite_column!("profile_path", &SqlType::Text),
        sqlite_column!("city", &SqlType::Text),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!("country", &SqlType::Text),
        sqlite_column!("country_code", &SqlType::Integer),
        sqlite_column!("zipcode", &SqlType::Integer),
        sqlite_column!("website", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
    ],
    indices: &[],
    unique_constraints: &[&["name_unique"]],
};

const PAINTING_ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const PAINTING_MUSEUM_FK: ForeignKey = ForeignKey {
    foreign_table: "museums",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const PAINTINGS_TABLE: Table = Table {
    name: "paintings",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("unique_title", &SqlType::Text, non_null = true),
        sqlite_column!("type", &SqlType::Text),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("materials", &SqlType::Text), // JSON array
        sqlite_column!("size", &SqlType::Text),
        sqlite_column!("profile", &SqlType::Text),
        sqlite_column!("profile_path", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("period", &SqlType::Text),
        sqlite_column!("style", &SqlType::Text), // JSON array
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PAINTING_ARTIST_FK)
        ),
        sqlite_column!(
            "museum_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PAINTING_MUSEUM_FK)
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
    ],
    indices: &[
        ("idx_paintings_year", "year"),
        ("idx_paintings_artist", "artist_id"),
        ("idx_paintings_museum", "museum_id"),
    ],
    unique_constraints: &[&["unique_title"]],
};

pub const GALLERY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ARTISTS_TABLE, MUSEUMS_TABLE, PAINTINGS_TABLE],
}];
