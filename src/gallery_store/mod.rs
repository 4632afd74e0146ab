mod error;
mod models;
mod query;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use error::{EntityKind, GalleryError, GalleryResult};
pub use models::*;
pub use query::{total_pages, Page, PaintingListQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use schema::GALLERY_VERSIONED_SCHEMAS;
pub use store::SqliteGalleryStore;
pub use trait_def::{GalleryCounts, GalleryStore};
pub use validation::{ValidationError, ValidationResult, MAX_TITLE_LENGTH};
