use log::{debug, info};

/// Stage-scoped front end to the `log` facade.
pub struct LogManager {
    stage: &'static str,
}

impl LogManager {
    pub fn new(stage: &'static str) -> Self {
        Self { stage }
    }

    pub fn record(&self, message: &str) {
        info!(target: "magcross", "[{}] {}", self.stage, message);
    }

    pub fn detail(&self, message: &str) {
        debug!(target: "magcross", "[{}] {}", self.stage, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("detector")
    }
}
