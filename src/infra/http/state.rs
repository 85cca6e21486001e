use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::application::ports::CacheStore;

#[derive(Clone)]
pub struct ApiState {
    pub catalog: Arc<CatalogService>,
    /// Kept alongside the catalog for the health probe.
    pub cache: Arc<dyn CacheStore>,
}
