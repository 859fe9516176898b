use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::screening::session::ScreeningSession;
use crate::screening::ScreeningEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Lexicon, similarity scorer and weights. Shared read-only by every request.
    pub engine: Arc<ScreeningEngine>,
    /// Active job and candidate pool. Never held across a scoring fan-out.
    pub session: Arc<RwLock<ScreeningSession>>,
}

impl AppState {
    pub fn new(config: Config, engine: ScreeningEngine) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            session: Arc::new(RwLock::new(ScreeningSession::new())),
        }
    }
}
