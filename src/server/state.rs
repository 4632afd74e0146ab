use axum::extract::FromRef;

use crate::gallery_store::GalleryStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedGalleryStore = Arc<dyn GalleryStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub gallery_store: GuardedGalleryStore,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedGalleryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.gallery_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
