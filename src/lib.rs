//! Art Gallery Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod gallery_store;
pub mod seed;
pub mod server;
pub mod slug;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use gallery_store::{GalleryError, GalleryStore, SqliteGalleryStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use slug::SlugGenerator;
