//! GalleryStore trait definition.

use super::error::GalleryResult;
use super::models::{
    Artist, DeletedPainting, Museum, NewArtist, NewMuseum, NewPainting, PaintingUpdate,
    ResolvedPainting,
};
use super::query::{Page, PaintingListQuery};

/// Number of rows per table, reported to metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GalleryCounts {
    pub artists: usize,
    pub museums: usize,
    pub paintings: usize,
}

/// Storage backend for the gallery.
///
/// Every write runs in its own transaction: either all of its effects are
/// committed or none are.
pub trait GalleryStore: Send + Sync {
    // =========================================================================
    // Paintings
    // =========================================================================

    /// Filtered, sorted page of paintings with artist and museum joined in.
    fn list_paintings(&self, query: &PaintingListQuery) -> GalleryResult<Page<ResolvedPainting>>;

    /// Fails with `NotFound(painting)` if absent.
    fn get_painting(&self, id: i64) -> GalleryResult<ResolvedPainting>;

    /// Validates references, assigns a fresh `unique_title` and inserts.
    fn create_painting(&self, painting: NewPainting) -> GalleryResult<ResolvedPainting>;

    /// Applies a partial update, regenerating `unique_title` when the
    /// effective title or year changes.
    fn update_painting(&self, id: i64, update: PaintingUpdate) -> GalleryResult<ResolvedPainting>;

    /// Deletes the painting only; its artist and museum are untouched.
    fn delete_painting(&self, id: i64) -> GalleryResult<DeletedPainting>;

    // =========================================================================
    // Artists and museums
    // =========================================================================

    fn get_artist(&self, id: i64) -> GalleryResult<Artist>;

    fn create_artist(&self, artist: NewArtist) -> GalleryResult<Artist>;

    fn get_museum(&self, id: i64) -> GalleryResult<Museum>;

    /// Fails with `Conflict` if `name_unique` is already used.
    fn create_museum(&self, museum: NewMuseum) -> GalleryResult<Museum>;

    // =========================================================================
    // Counts (for metrics)
    // =========================================================================

    fn counts(&self) -> GalleryResult<GalleryCounts>;
}
