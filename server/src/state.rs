use std::path::PathBuf;
use std::sync::Arc;

use crate::atlas::AtlasSnapshot;

/// Shared, read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub atlas: Arc<AtlasSnapshot>,
    pub client_dist_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(atlas: AtlasSnapshot, client_dist_dir: PathBuf) -> Self {
        Self {
            atlas: Arc::new(atlas),
            client_dist_dir: Arc::new(client_dist_dir),
        }
    }
}
