use std::sync::Arc;

use crate::config::Config;
use crate::extraction::KeySource;
use crate::grading::SharedWorkspace;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub key_source: Arc<dyn KeySource>,
    pub workspace: SharedWorkspace,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn KeySource> {
    fn from_ref(state: &AppState) -> Self {
        state.key_source.clone()
    }
}

impl FromRef<AppState> for SharedWorkspace {
    fn from_ref(state: &AppState) -> Self {
        state.workspace.clone()
    }
}
