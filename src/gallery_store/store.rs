//! SQLite-backed gallery store.
//!
//! Writes go through a single connection behind a mutex, each inside its own
//! transaction. Reads are spread over a small pool of read-only connections.

use super::error::{is_unique_violation, EntityKind, GalleryError, GalleryResult};
use super::models::*;
use super::query::{Page, PaintingListQuery};
use super::schema::GALLERY_VERSIONED_SCHEMAS;
use super::trait_def::{GalleryCounts, GalleryStore};
use super::validation::{
    ensure_artist_exists, ensure_museum_exists, validate_new_artist, validate_new_museum,
    validate_new_painting, validate_painting_update, ValidationError,
};
use crate::slug::{ResolveError, SlugGenerator};
use crate::sqlite_persistence::{BASE_DB_VERSION, DEFAULT_TIMESTAMP};
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSqlOutput, Type, Value as SqlValue};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

const PAINTING_COLUMNS: usize = 16;
const ARTIST_COLUMNS: usize = 8;

const SELECT_RESOLVED_PAINTING: &str = "SELECT \
    p.id, p.title, p.unique_title, p.type, p.genre, p.materials, p.size, p.profile, \
    p.profile_path, p.year, p.period, p.style, p.artist_id, p.museum_id, p.created_at, \
    p.updated_at, \
    a.id, a.artist_short_name, a.artist_long_name, a.dob, a.dob_place, a.dod, a.dod_place, \
    a.created_at, \
    m.id, m.name, m.name_unique, m.contact, m.profile, m.profile_path, m.city, m.state, \
    m.country, m.country_code, m.zipcode, m.website, m.created_at \
    FROM paintings p \
    JOIN artists a ON a.id = p.artist_id \
    JOIN museums m ON m.id = p.museum_id";

/// Case-insensitive substring match on the artist short name. SQLite's own
/// `lower()` and `LIKE` only fold ASCII, so `unicode_lower` is registered on
/// every connection.
const ARTIST_NAME_FILTER: &str =
    " WHERE instr(unicode_lower(a.artist_short_name), unicode_lower(?)) > 0";

const SELECT_ARTIST: &str = "SELECT \
    id, artist_short_name, artist_long_name, dob, dob_place, dod, dod_place, created_at \
    FROM artists";

const SELECT_MUSEUM: &str = "SELECT \
    id, name, name_unique, contact, profile, profile_path, city, state, country, \
    country_code, zipcode, website, created_at \
    FROM museums";

/// SQLite-backed gallery store.
#[derive(Clone)]
pub struct SqliteGalleryStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
    slugs: SlugGenerator,
}

fn migrate_if_needed(conn: &Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = GALLERY_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &GALLERY_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating gallery db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let expected_version = (BASE_DB_VERSION + latest_version) as i64;
    if db_version != expected_version {
        bail!(
            "Gallery db is at version {} but version {} is expected",
            db_version - BASE_DB_VERSION as i64,
            latest_version
        );
    }
    latest_schema
        .validate(conn)
        .context("Gallery db schema does not match the expected schema")
}

fn lock(conn: &Mutex<Connection>) -> GalleryResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| GalleryError::Internal(anyhow!("database connection mutex poisoned")))
}

/// Registers the SQL functions the gallery queries rely on.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

// =============================================================================
// Row mapping
// =============================================================================

/// Optional list of strings stored as a JSON array in a TEXT column.
struct JsonList<'a>(&'a Option<Vec<String>>);

impl ToSql for JsonList<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            None => Ok(ToSqlOutput::from(rusqlite::types::Null)),
            Some(items) => serde_json::to_string(items)
                .map(ToSqlOutput::from)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e))),
        }
    }
}

fn json_list(row: &Row, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn painting_from_row(row: &Row, o: usize) -> rusqlite::Result<Painting> {
    Ok(Painting {
        id: row.get(o)?,
        title: row.get(o + 1)?,
        unique_title: row.get(o + 2)?,
        painting_type: row.get(o + 3)?,
        genre: row.get(o + 4)?,
        materials: json_list(row, o + 5)?,
        size: row.get(o + 6)?,
        profile: row.get(o + 7)?,
        profile_path: row.get(o + 8)?,
        year: row.get(o + 9)?,
        period: row.get(o + 10)?,
        style: json_list(row, o + 11)?,
        artist_id: row.get(o + 12)?,
        museum_id: row.get(o + 13)?,
        created_at: row.get(o + 14)?,
        updated_at: row.get(o + 15)?,
    })
}

fn artist_from_row(row: &Row, o: usize) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(o)?,
        artist_short_name: row.get(o + 1)?,
        artist_long_name: row.get(o + 2)?,
        dob: row.get(o + 3)?,
        dob_place: row.get(o + 4)?,
        dod: row.get(o + 5)?,
        dod_place: row.get(o + 6)?,
        created_at: row.get(o + 7)?,
    })
}

fn museum_from_row(row: &Row, o: usize) -> rusqlite::Result<Museum> {
    Ok(Museum {
        id: row.get(o)?,
        name: row.get(o + 1)?,
        name_unique: row.get(o + 2)?,
        contact: row.get(o + 3)?,
        profile: row.get(o + 4)?,
        profile_path: row.get(o + 5)?,
        city: row.get(o + 6)?,
        state: row.get(o + 7)?,
        country: row.get(o + 8)?,
        country_code: row.get(o + 9)?,
        zipcode: row.get(o + 10)?,
        website: row.get(o + 11)?,
        created_at: row.get(o + 12)?,
    })
}

fn resolved_from_row(row: &Row) -> rusqlite::Result<ResolvedPainting> {
    Ok(ResolvedPainting {
        painting: painting_from_row(row, 0)?,
        artist: artist_from_row(row, PAINTING_COLUMNS)?,
        museum: museum_from_row(row, PAINTING_COLUMNS + ARTIST_COLUMNS)?,
    })
}

// =============================================================================
// Statement helpers, usable on any connection or open transaction
// =============================================================================

fn load_resolved(conn: &Connection, id: i64) -> rusqlite::Result<Option<ResolvedPainting>> {
    conn.query_row(
        &format!("{} WHERE p.id = ?1", SELECT_RESOLVED_PAINTING),
        params![id],
        resolved_from_row,
    )
    .optional()
}

fn load_artist(conn: &Connection, id: i64) -> rusqlite::Result<Option<Artist>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_ARTIST),
        params![id],
        |row| artist_from_row(row, 0),
    )
    .optional()
}

fn load_museum(conn: &Connection, id: i64) -> rusqlite::Result<Option<Museum>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_MUSEUM),
        params![id],
        |row| museum_from_row(row, 0),
    )
    .optional()
}

/// Whether a painting other than `exclude_id` already uses `slug`.
fn slug_taken(conn: &Connection, slug: &str, exclude_id: Option<i64>) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM paintings WHERE unique_title = ?1 AND (?2 IS NULL OR id != ?2)",
            params![slug, exclude_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn insert_artist(conn: &Connection, artist: &NewArtist) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO artists (artist_short_name, artist_long_name, dob, dob_place, dod, dod_place) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            artist.artist_short_name,
            artist.artist_long_name,
            artist.dob,
            artist.dob_place,
            artist.dod,
            artist.dod_place,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts a museum, reporting a taken `name_unique` as a conflict.
fn insert_museum(conn: &Connection, museum: &NewMuseum) -> GalleryResult<i64> {
    let inserted = conn.execute(
        "INSERT INTO museums (name, name_unique, contact, profile, profile_path, city, state, \
         country, country_code, zipcode, website) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            museum.name,
            museum.name_unique,
            museum.contact,
            museum.profile,
            museum.profile_path,
            museum.city,
            museum.state,
            museum.country,
            museum.country_code,
            museum.zipcode,
            museum.website,
        ],
    );
    match inserted {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(err) if is_unique_violation(&err, "museums", "name_unique") => {
            Err(GalleryError::Conflict {
                entity: EntityKind::Museum,
                field: "name_unique",
                value: museum.name_unique.clone(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

fn insert_painting(conn: &Connection, painting: &NewPainting, slug: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO paintings (title, unique_title, type, genre, materials, size, profile, \
         profile_path, year, period, style, artist_id, museum_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            painting.title,
            slug,
            painting.painting_type,
            painting.genre,
            JsonList(&painting.materials),
            painting.size,
            painting.profile,
            painting.profile_path,
            painting.year,
            painting.period,
            JsonList(&painting.style),
            painting.artist_id,
            painting.museum_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn write_painting(conn: &Connection, painting: &Painting) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "UPDATE paintings SET title = ?1, unique_title = ?2, type = ?3, genre = ?4, \
             materials = ?5, size = ?6, profile = ?7, profile_path = ?8, year = ?9, \
             period = ?10, style = ?11, artist_id = ?12, museum_id = ?13, \
             updated_at = {} WHERE id = ?14",
            DEFAULT_TIMESTAMP
        ),
        params![
            painting.title,
            painting.unique_title,
            painting.painting_type,
            painting.genre,
            JsonList(&painting.materials),
            painting.size,
            painting.profile,
            painting.profile_path,
            painting.year,
            painting.period,
            JsonList(&painting.style),
            painting.artist_id,
            painting.museum_id,
            painting.id,
        ],
    )?;
    Ok(())
}

fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
    Ok(count as usize)
}

impl SqliteGalleryStore {
    /// Opens (creating if needed) the gallery database at `db_path`.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of read-only connections (at least 1)
    /// * `slugs` - Generator used to assign `unique_title`
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        read_pool_size: usize,
        slugs: SlugGenerator,
    ) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open gallery database")?;

        write_conn.pragma_update(None, "foreign_keys", "ON")?;
        register_functions(&write_conn)?;
        migrate_if_needed(&write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        info!(
            "Opened gallery db: {} artists, {} museums, {} paintings",
            count_rows(&write_conn, "artists")?,
            count_rows(&write_conn, "museums")?,
            count_rows(&write_conn, "paintings")?
        );

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            register_functions(&read_conn)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteGalleryStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
            slugs,
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Inserts a whole batch in one transaction, returning how many records
    /// of each kind were added. Nothing is written if any record fails.
    pub fn import_batch(&self, batch: &CatalogBatch) -> GalleryResult<GalleryCounts> {
        for artist in &batch.artists {
            validate_new_artist(artist)?;
        }
        for museum in &batch.museums {
            validate_new_museum(museum)?;
        }
        for entry in &batch.paintings {
            validate_new_painting(&entry.painting)?;
        }

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;

        let artist_ids = batch
            .artists
            .iter()
            .map(|artist| insert_artist(&tx, artist))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let museum_ids = batch
            .museums
            .iter()
            .map(|museum| insert_museum(&tx, museum))
            .collect::<GalleryResult<Vec<_>>>()?;

        for entry in &batch.paintings {
            let mut painting = entry.painting.clone();
            painting.artist_id = *artist_ids.get(entry.artist).ok_or_else(|| {
                ValidationError::Malformed(format!("no artist at batch position {}", entry.artist))
            })?;
            painting.museum_id = *museum_ids.get(entry.museum).ok_or_else(|| {
                ValidationError::Malformed(format!("no museum at batch position {}", entry.museum))
            })?;
            self.write_with_fresh_slug(&tx, &painting.title, painting.year, None, |conn, slug| {
                insert_painting(conn, &painting, slug)
            })?;
        }
        tx.commit()?;

        let imported = GalleryCounts {
            artists: artist_ids.len(),
            museums: museum_ids.len(),
            paintings: batch.paintings.len(),
        };
        info!(
            "Imported {} artists, {} museums, {} paintings",
            imported.artists, imported.museums, imported.paintings
        );
        Ok(imported)
    }

    /// Resolves a free slug and runs `write` with it.
    ///
    /// If `write` hits the UNIQUE constraint on `unique_title` (another writer
    /// took the slug between probe and write) resolution starts over, at most
    /// `max_attempts` more times.
    fn write_with_fresh_slug<T, F>(
        &self,
        conn: &Connection,
        title: &str,
        year: Option<i32>,
        exclude_id: Option<i64>,
        mut write: F,
    ) -> GalleryResult<T>
    where
        F: FnMut(&Connection, &str) -> rusqlite::Result<T>,
    {
        let max_retries = self.slugs.policy().max_attempts;
        let mut retries = 0;
        loop {
            let slug = self
                .slugs
                .generate(
                    title,
                    year,
                    |candidate: &str, exclude: Option<i64>| slug_taken(conn, candidate, exclude),
                    exclude_id,
                )
                .map_err(|err| {
                    if let ResolveError::Exhausted { base, attempts } = &err {
                        error!(
                            "Data integrity anomaly: every slug for base '{}' is taken after {} suffixes",
                            base, attempts
                        );
                    }
                    GalleryError::from(err)
                })?;

            match write(conn, &slug) {
                Ok(value) => return Ok(value),
                Err(err) if is_unique_violation(&err, "paintings", "unique_title") => {
                    if retries >= max_retries {
                        error!(
                            "unique_title '{}' kept colliding after {} retries",
                            slug, retries
                        );
                        return Err(GalleryError::SlugExhausted {
                            base: slug,
                            attempts: retries,
                        });
                    }
                    retries += 1;
                    warn!(
                        "unique_title '{}' was taken concurrently, retrying ({}/{})",
                        slug, retries, max_retries
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl GalleryStore for SqliteGalleryStore {
    fn list_paintings(&self, query: &PaintingListQuery) -> GalleryResult<Page<ResolvedPainting>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;

        let (filter_sql, mut args) = match &query.artist_name {
            None => ("", Vec::new()),
            Some(needle) => (ARTIST_NAME_FILTER, vec![SqlValue::Text(needle.clone())]),
        };

        let total: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM paintings p JOIN artists a ON a.id = p.artist_id{}",
                filter_sql
            ),
            params_from_iter(args.iter()),
            |r| r.get(0),
        )?;
        debug!("{} paintings match {:?}", total, query.artist_name);

        args.push(SqlValue::Integer(query.page_size as i64));
        args.push(SqlValue::Integer(query.offset() as i64));
        let sql = format!(
            "{}{} ORDER BY p.year {}, p.id ASC LIMIT ? OFFSET ?",
            SELECT_RESOLVED_PAINTING,
            filter_sql,
            query.sort_order.to_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let data = stmt
            .query_map(params_from_iter(args.iter()), resolved_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page::new(data, total as u64, query.page, query.page_size))
    }

    fn get_painting(&self, id: i64) -> GalleryResult<ResolvedPainting> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        load_resolved(&conn, id)?.ok_or_else(|| GalleryError::not_found(EntityKind::Painting, id))
    }

    fn create_painting(&self, painting: NewPainting) -> GalleryResult<ResolvedPainting> {
        validate_new_painting(&painting)?;

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;

        ensure_artist_exists(&tx, painting.artist_id)?;
        ensure_museum_exists(&tx, painting.museum_id)?;

        let id = self.write_with_fresh_slug(
            &tx,
            &painting.title,
            painting.year,
            None,
            |conn, slug| insert_painting(conn, &painting, slug),
        )?;

        let created = load_resolved(&tx, id)?.ok_or_else(|| {
            GalleryError::Internal(anyhow!("painting {} missing right after insert", id))
        })?;
        tx.commit()?;

        info!(
            "Created painting {} '{}' as '{}'",
            id, created.painting.title, created.painting.unique_title
        );
        Ok(created)
    }

    fn update_painting(&self, id: i64, update: PaintingUpdate) -> GalleryResult<ResolvedPainting> {
        validate_painting_update(&update)?;

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;

        let mut painting = load_resolved(&tx, id)?
            .ok_or_else(|| GalleryError::not_found(EntityKind::Painting, id))?
            .painting;

        if let Some(Some(artist_id)) = update.artist_id {
            ensure_artist_exists(&tx, artist_id)?;
        }
        if let Some(Some(museum_id)) = update.museum_id {
            ensure_museum_exists(&tx, museum_id)?;
        }

        let regenerate_slug = update.changes_slug_inputs(&painting);
        update.apply_to(&mut painting);

        if regenerate_slug {
            let title = painting.title.clone();
            let year = painting.year;
            self.write_with_fresh_slug(&tx, &title, year, Some(id), |conn, slug| {
                painting.unique_title = slug.to_owned();
                write_painting(conn, &painting)
            })?;
        } else {
            write_painting(&tx, &painting)?;
        }

        let updated = load_resolved(&tx, id)?.ok_or_else(|| {
            GalleryError::Internal(anyhow!("painting {} missing right after update", id))
        })?;
        tx.commit()?;

        info!(
            "Updated painting {} (unique_title '{}')",
            id, updated.painting.unique_title
        );
        Ok(updated)
    }

    fn delete_painting(&self, id: i64) -> GalleryResult<DeletedPainting> {
        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;

        let title: String = tx
            .query_row(
                "SELECT title FROM paintings WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| GalleryError::not_found(EntityKind::Painting, id))?;

        tx.execute("DELETE FROM paintings WHERE id = ?1", params![id])?;
        tx.commit()?;

        info!("Deleted painting {} '{}'", id, title);
        Ok(DeletedPainting {
            message: format!("Painting '{}' deleted successfully", title),
            deleted_id: id,
        })
    }

    fn get_artist(&self, id: i64) -> GalleryResult<Artist> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        load_artist(&conn, id)?.ok_or_else(|| GalleryError::not_found(EntityKind::Artist, id))
    }

    fn create_artist(&self, artist: NewArtist) -> GalleryResult<Artist> {
        validate_new_artist(&artist)?;

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;
        let id = insert_artist(&tx, &artist)?;
        let created = load_artist(&tx, id)?.ok_or_else(|| {
            GalleryError::Internal(anyhow!("artist {} missing right after insert", id))
        })?;
        tx.commit()?;

        info!("Created artist {} '{}'", id, created.artist_short_name);
        Ok(created)
    }

    fn get_museum(&self, id: i64) -> GalleryResult<Museum> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        load_museum(&conn, id)?.ok_or_else(|| GalleryError::not_found(EntityKind::Museum, id))
    }

    fn create_museum(&self, museum: NewMuseum) -> GalleryResult<Museum> {
        validate_new_museum(&museum)?;

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;
        let id = insert_museum(&tx, &museum)?;
        let created = load_museum(&tx, id)?.ok_or_else(|| {
            GalleryError::Internal(anyhow!("museum {} missing right after insert", id))
        })?;
        tx.commit()?;

        info!("Created museum {} '{}'", id, created.name_unique);
        Ok(created)
    }

    fn counts(&self) -> GalleryResult<GalleryCounts> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Ok(GalleryCounts {
            artists: count_rows(&conn, "artists")?,
            museums: count_rows(&conn, "museums")?,
            paintings: count_rows(&conn, "paintings")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::SlugPolicy;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> SqliteGalleryStore {
        SqliteGalleryStore::new(dir.path().join("gallery.db"), 2, SlugGenerator::default())
            .unwrap()
    }

    /// Store with one artist and one museum, returning their ids.
    fn seeded(dir: &TempDir) -> (SqliteGalleryStore, i64, i64) {
        let store = open_store(dir);
        let artist = store
            .create_artist(NewArtist {
                artist_short_name: "Гончарова Н.С.".to_string(),
                artist_long_name: "Гончарова Наталья Сергеевна".to_string(),
                ..Default::default()
            })
            .unwrap();
        let museum = store
            .create_museum(NewMuseum {
                name: "Государственный Русский музей".to_string(),
                name_unique: "russian_museum".to_string(),
                ..Default::default()
            })
            .unwrap();
        (store, artist.id, museum.id)
    }

    fn new_painting(title: &str, year: Option<i32>, artist_id: i64, museum_id: i64) -> NewPainting {
        NewPainting {
            title: title.to_string(),
            year,
            artist_id,
            museum_id,
            ..Default::default()
        }
    }

    #[test]
    fn creates_painting_with_slug_and_relations() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);

        let mut payload = new_painting("Тест Картина", Some(2024), artist_id, museum_id);
        payload.materials = Some(vec!["холст".to_string(), "масло".to_string()]);
        let created = store.create_painting(payload).unwrap();

        assert_eq!(created.painting.unique_title, "test_kartina_2024");
        assert_eq!(created.artist.id, artist_id);
        assert_eq!(created.museum.name_unique, "russian_museum");
        assert_eq!(
            created.painting.materials,
            Some(vec!["холст".to_string(), "масло".to_string()])
        );
        assert!(created.painting.created_at > 0);
        assert_eq!(created.painting.updated_at, None);

        let fetched = store.get_painting(created.painting.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn suffixes_colliding_slugs() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);

        let first = store
            .create_painting(new_painting("Тест Картина", Some(2024), artist_id, museum_id))
            .unwrap();
        let second = store
            .create_painting(new_painting("Тест Картина", Some(2024), artist_id, museum_id))
            .unwrap();

        assert_eq!(first.painting.unique_title, "test_kartina_2024");
        assert_eq!(second.painting.unique_title, "test_kartina_2024_1");
    }

    #[test]
    fn gives_up_when_suffixes_run_out() {
        let dir = TempDir::new().unwrap();
        let store = SqliteGalleryStore::new(
            dir.path().join("gallery.db"),
            1,
            SlugGenerator::new(
                Arc::new(crate::slug::RussianTransliterator),
                SlugPolicy { max_attempts: 2 },
            ),
        )
        .unwrap();
        let artist = store
            .create_artist(NewArtist {
                artist_short_name: "A".to_string(),
                artist_long_name: "A A".to_string(),
                ..Default::default()
            })
            .unwrap();
        let museum = store
            .create_museum(NewMuseum {
                name: "M".to_string(),
                name_unique: "m".to_string(),
                ..Default::default()
            })
            .unwrap();

        for _ in 0..3 {
            store
                .create_painting(new_painting("Тест", None, artist.id, museum.id))
                .unwrap();
        }
        let result = store.create_painting(new_painting("Тест", None, artist.id, museum.id));
        assert!(matches!(
            result,
            Err(GalleryError::SlugExhausted { attempts: 2, .. })
        ));
        assert_eq!(store.counts().unwrap().paintings, 3);
    }

    #[test]
    fn rejects_unknown_references_without_writing() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);

        let result = store.create_painting(new_painting("Тест", None, artist_id + 100, museum_id));
        assert!(matches!(
            result,
            Err(GalleryError::NotFound {
                entity: EntityKind::Artist,
                ..
            })
        ));

        let result = store.create_painting(new_painting("Тест", None, artist_id, museum_id + 100));
        assert!(matches!(
            result,
            Err(GalleryError::NotFound {
                entity: EntityKind::Museum,
                ..
            })
        ));

        assert_eq!(store.counts().unwrap().paintings, 0);
    }

    #[test]
    fn update_regenerates_slug_only_when_inputs_change() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let created = store
            .create_painting(new_painting("Тест", Some(2024), artist_id, museum_id))
            .unwrap();
        let id = created.painting.id;

        let update: PaintingUpdate =
            serde_json::from_str(r#"{"title": "Тест", "genre": "Пейзаж"}"#).unwrap();
        let updated = store.update_painting(id, update).unwrap();
        assert_eq!(updated.painting.unique_title, "test_2024");
        assert_eq!(updated.painting.genre.as_deref(), Some("Пейзаж"));
        assert!(updated.painting.updated_at.is_some());

        let update: PaintingUpdate = serde_json::from_str(r#"{"year": 2025}"#).unwrap();
        let updated = store.update_painting(id, update).unwrap();
        assert_eq!(updated.painting.unique_title, "test_2025");

        let update: PaintingUpdate = serde_json::from_str(r#"{"year": null}"#).unwrap();
        let updated = store.update_painting(id, update).unwrap();
        assert_eq!(updated.painting.unique_title, "test");
        assert_eq!(updated.painting.year, None);
    }

    #[test]
    fn update_does_not_collide_with_itself_but_does_with_others() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let first = store
            .create_painting(new_painting("Тест", Some(2024), artist_id, museum_id))
            .unwrap();
        let second = store
            .create_painting(new_painting("Другая", Some(2024), artist_id, museum_id))
            .unwrap();

        let update: PaintingUpdate = serde_json::from_str(r#"{"title": "Тест"}"#).unwrap();
        let updated = store.update_painting(second.painting.id, update).unwrap();
        assert_eq!(updated.painting.unique_title, "test_2024_1");

        let update: PaintingUpdate = serde_json::from_str(r#"{"title": "Тест!"}"#).unwrap();
        let updated = store.update_painting(first.painting.id, update).unwrap();
        assert_eq!(updated.painting.unique_title, "test_2024");
    }

    #[test]
    fn update_of_missing_painting_or_reference_is_not_found() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let created = store
            .create_painting(new_painting("Тест", None, artist_id, museum_id))
            .unwrap();

        let update: PaintingUpdate = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        assert!(matches!(
            store.update_painting(created.painting.id + 1, update),
            Err(GalleryError::NotFound {
                entity: EntityKind::Painting,
                ..
            })
        ));

        let update: PaintingUpdate =
            serde_json::from_str(&format!(r#"{{"title": "X", "museum_id": {}}}"#, museum_id + 9))
                .unwrap();
        assert!(matches!(
            store.update_painting(created.painting.id, update),
            Err(GalleryError::NotFound {
                entity: EntityKind::Museum,
                ..
            })
        ));
        let unchanged = store.get_painting(created.painting.id).unwrap();
        assert_eq!(unchanged.painting.title, "Тест");
    }

    #[test]
    fn delete_keeps_artist_and_museum() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let created = store
            .create_painting(new_painting("Велосипедист", Some(1913), artist_id, museum_id))
            .unwrap();

        let deleted = store.delete_painting(created.painting.id).unwrap();
        assert_eq!(deleted.deleted_id, created.painting.id);
        assert_eq!(deleted.message, "Painting 'Велосипедист' deleted successfully");

        assert!(matches!(
            store.get_painting(created.painting.id),
            Err(GalleryError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_painting(created.painting.id),
            Err(GalleryError::NotFound { .. })
        ));
        assert!(store.get_artist(artist_id).is_ok());
        assert!(store.get_museum(museum_id).is_ok());
    }

    #[test]
    fn lists_sorted_paged_and_filtered() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let other = store
            .create_artist(NewArtist {
                artist_short_name: "Родченко А.М.".to_string(),
                artist_long_name: "Родченко Александр Михайлович".to_string(),
                ..Default::default()
            })
            .unwrap();

        for year in [1915, 1913, 1914] {
            store
                .create_painting(new_painting("Картина", Some(year), artist_id, museum_id))
                .unwrap();
        }
        store
            .create_painting(new_painting("Композиция", Some(1920), other.id, museum_id))
            .unwrap();

        let query = PaintingListQuery::new(1, 2, SortOrder::Asc, None).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next);
        let years: Vec<_> = page.data.iter().map(|p| p.painting.year).collect();
        assert_eq!(years, vec![Some(1913), Some(1914)]);

        let query = PaintingListQuery::new(1, 10, SortOrder::Desc, None).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.data[0].painting.year, Some(1920));

        let query =
            PaintingListQuery::new(1, 10, SortOrder::Asc, Some("гончарова".to_string())).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.data.iter().all(|p| p.artist.id == artist_id));

        let query =
            PaintingListQuery::new(1, 10, SortOrder::Asc, Some("nobody".to_string())).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn duplicate_museum_token_conflicts() {
        let dir = TempDir::new().unwrap();
        let (store, _, _) = seeded(&dir);
        let result = store.create_museum(NewMuseum {
            name: "Другой".to_string(),
            name_unique: "russian_museum".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(GalleryError::Conflict {
                entity: EntityKind::Museum,
                field: "name_unique",
                ..
            })
        ));
    }

    #[test]
    fn reopens_existing_database() {
        let dir = TempDir::new().unwrap();
        let painting_id = {
            let (store, artist_id, museum_id) = seeded(&dir);
            store
                .create_painting(new_painting("Тест", None, artist_id, museum_id))
                .unwrap()
                .painting
                .id
        };

        let store = open_store(&dir);
        assert_eq!(store.get_painting(painting_id).unwrap().painting.unique_title, "test");
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_slugs() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::task::spawn_blocking(move || {
                    store
                        .create_painting(new_painting("Тест", Some(2024), artist_id, museum_id))
                        .unwrap()
                        .painting
                        .unique_title
                })
            })
            .collect();

        let mut slugs = Vec::new();
        for handle in handles {
            slugs.push(handle.await.unwrap());
        }
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 8);
        assert!(slugs.contains(&"test_2024".to_string()));
    }

    #[test]
    fn filter_binds_one_parameter_however_many_artists_match() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        // More matching artists than SQLite allows bound variables
        let artists = (0..33_000)
            .map(|i| NewArtist {
                artist_short_name: format!("Artist {}", i),
                artist_long_name: format!("Artist Number {}", i),
                ..Default::default()
            })
            .collect();
        let batch = CatalogBatch {
            artists,
            museums: vec![NewMuseum {
                name: "M".to_string(),
                name_unique: "m".to_string(),
                ..Default::default()
            }],
            paintings: vec![BatchPainting {
                painting: new_painting("Тест", Some(2024), 0, 0),
                artist: 32_999,
                museum: 0,
            }],
        };
        store.import_batch(&batch).unwrap();

        let query =
            PaintingListQuery::new(1, 10, SortOrder::Asc, Some("ARTIST".to_string())).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].artist.artist_short_name, "Artist 32999");

        let query =
            PaintingListQuery::new(1, 10, SortOrder::Asc, Some("artist 1".to_string())).unwrap();
        let page = store.list_paintings(&query).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn filter_folds_cyrillic_case_in_sql() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        store
            .create_painting(new_painting("Велосипедист", Some(1913), artist_id, museum_id))
            .unwrap();

        for needle in ["ГОНЧАРОВА", "гончарова н.с.", "Н.С"] {
            let query =
                PaintingListQuery::new(1, 10, SortOrder::Asc, Some(needle.to_string())).unwrap();
            assert_eq!(store.list_paintings(&query).unwrap().total, 1, "{}", needle);
        }
    }

    #[test]
    fn retries_when_slug_is_taken_between_probe_and_write() {
        let dir = TempDir::new().unwrap();
        let (store, artist_id, museum_id) = seeded(&dir);
        let painting = new_painting("Тест", Some(2024), artist_id, museum_id);

        let conn = store.write_conn.lock().unwrap();
        let mut raced = false;
        let id = store
            .write_with_fresh_slug(&conn, "Тест", Some(2024), None, |conn, slug| {
                if !raced {
                    raced = true;
                    // Another writer takes the slug first
                    insert_painting(conn, &painting, slug)?;
                }
                insert_painting(conn, &painting, slug)
            })
            .unwrap();
        drop(conn);

        assert!(raced);
        let created = store.get_painting(id).unwrap();
        assert_eq!(created.painting.unique_title, "test_2024_1");
        assert_eq!(store.counts().unwrap().paintings, 2);
    }

    #[test]
    fn gives_up_when_every_write_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = SqliteGalleryStore::new(
            dir.path().join("gallery.db"),
            1,
            SlugGenerator::new(
                Arc::new(crate::slug::RussianTransliterator),
                SlugPolicy { max_attempts: 3 },
            ),
        )
        .unwrap();
        let artist = store
            .create_artist(NewArtist {
                artist_short_name: "A".to_string(),
                artist_long_name: "A A".to_string(),
                ..Default::default()
            })
            .unwrap();
        let museum = store
            .create_museum(NewMuseum {
                name: "M".to_string(),
                name_unique: "m".to_string(),
                ..Default::default()
            })
            .unwrap();
        let painting = new_painting("Тест", Some(2024), artist.id, museum.id);

        let conn = store.write_conn.lock().unwrap();
        let mut writes = 0;
        let result = store.write_with_fresh_slug(&conn, "Тест", Some(2024), None, |conn, slug| {
            writes += 1;
            insert_painting(conn, &painting, slug)?;
            insert_painting(conn, &painting, slug)
        });
        drop(conn);

        assert!(matches!(
            result,
            Err(GalleryError::SlugExhausted { attempts: 3, .. })
        ));
        assert_eq!(writes, 4);
    }

    #[test]
    fn update_checks_payload_before_existence() {
        let dir = TempDir::new().unwrap();
        let (store, _, _) = seeded(&dir);

        let null_title = PaintingUpdate {
            title: Some(None),
            ..Default::default()
        };
        assert!(matches!(
            store.update_painting(9999, null_title),
            Err(GalleryError::Validation(ValidationError::NullNotAllowed { field: "title" }))
        ));
        assert!(matches!(
            store.update_painting(9999, PaintingUpdate::default()),
            Err(GalleryError::NotFound {
                entity: EntityKind::Painting,
                id: 9999
            })
        ));
    }
}
