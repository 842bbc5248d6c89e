use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::config::HttpConfig;
use crate::studio::Studio;

pub type GuardedStudio = Arc<Studio>;

#[derive(Clone)]
pub struct ServerState {
    pub config: HttpConfig,
    pub start_time: Instant,
    pub studio: GuardedStudio,
    pub version: String,
}

impl ServerState {
    pub fn new(config: HttpConfig, studio: GuardedStudio) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            studio,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedStudio {
    fn from_ref(input: &ServerState) -> Self {
        input.studio.clone()
    }
}

impl FromRef<ServerState> for HttpConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
