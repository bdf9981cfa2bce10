pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod pipeline;
pub mod scraper;
pub mod storage;

use std::sync::Arc;
use config::Config;
use pipeline::Pipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Pipeline::from_config(config))
    }
}
