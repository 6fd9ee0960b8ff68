//! API State Management

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use upkeep_core::EconomySession;

/// Shared handle to the live session, cloned into every handler.
#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<RwLock<EconomySession>>,
    pub start_time: Instant,
}

impl ApiState {
    pub fn new(session: Arc<RwLock<EconomySession>>) -> Self {
        Self {
            session,
            start_time: Instant::now(),
        }
    }
}
