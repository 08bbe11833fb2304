use std::sync::Arc;

use crate::pipeline::BlogPipeline;
use crate::store::PostStore;

/// Shared handler state: the pipeline for generation requests and the
/// post store for read paths.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BlogPipeline>,
    pub posts: Arc<dyn PostStore>,
}
