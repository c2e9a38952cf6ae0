use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Graph;
use crate::services::RecommendOptions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Queries take the read lock; account mutations take the write lock
    pub graph: Arc<RwLock<Graph>>,
    pub options: RecommendOptions,
}

impl AppState {
    pub fn new(graph: Graph, options: RecommendOptions) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
            options,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Graph::new(), RecommendOptions::default())
    }
}
