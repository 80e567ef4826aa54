//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::AdminCache;
use crate::config::AdminConfig;
use crate::services::ImageStore;

/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    cache: AdminCache,
    images: ImageStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let images = ImageStore::new(config.media_dir.clone(), config.media_base_url.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cache: AdminCache::new(),
                images,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn cache(&self) -> &AdminCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}
