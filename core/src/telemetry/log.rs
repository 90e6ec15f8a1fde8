use log::{info, warn};

/// Scoped logger used by the engine components.
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn record(&self, message: &str) {
        info!("{}: {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("{}: {}", self.scope, message);
    }
}
