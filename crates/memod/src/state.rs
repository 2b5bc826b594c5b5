//! Shared, immutable application state

use memo_common::{Organizer, ServiceConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// `None` when the model backend could not be set up (usually a missing API key)
    pub organizer: Option<Organizer>,
}

pub type AppStateArc = Arc<AppState>;

impl AppState {
    pub fn new(organizer: Option<Organizer>) -> Self {
        Self { organizer }
    }

    /// Build state from config. A missing credential degrades the service instead of
    /// failing startup.
    pub fn from_config(config: &ServiceConfig) -> Self {
        match Organizer::from_config(config) {
            Ok(organizer) => {
                info!(
                    "Organizer ready (model: {}, system instruction: {} chars)",
                    organizer.model(),
                    organizer.system_instruction().len()
                );
                Self::new(Some(organizer))
            }
            Err(e) => {
                warn!("Organizer unavailable, running degraded: {}", e);
                Self::new(None)
            }
        }
    }

    pub fn service_ready(&self) -> bool {
        self.organizer.is_some()
    }
}
