use crate::wizard::{RequestKind, Step};
use log::{debug, info, warn};

/// Narrates a wizard session through the `log` facade.
#[derive(Debug, Default, Clone)]
pub struct SessionLog;

impl SessionLog {
    pub fn step_changed(&self, from: Step, to: Step) {
        if from != to {
            info!("wizard step {} -> {} ({})", from.number(), to.number(), to.label());
        }
    }

    pub fn request_started(&self, kind: RequestKind) {
        info!("{} started", kind);
    }

    pub fn request_failed(&self, kind: RequestKind, message: &str) {
        warn!("{} failed: {}", kind, message);
    }

    pub fn request_ignored(&self, kind: RequestKind) {
        debug!("discarding stale {} result", kind);
    }

    pub fn request_cancelled(&self, kind: RequestKind) {
        warn!("{} cancelled", kind);
    }

    pub fn refused(&self, reason: &str) {
        debug!("submission refused: {}", reason);
    }
}
