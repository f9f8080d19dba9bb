//! Client-side core of the floor-plan wizard.
//!
//! Image analysis, layout generation and Vastu scoring all happen in the
//! backend. This crate holds the typed records exchanged with it, the HTTP
//! gateway, and the controller that walks a session through upload,
//! requirements and preview.

pub mod config;
pub mod export;
pub mod gateway;
pub mod model;
pub mod prelude;
pub mod summary;
pub mod telemetry;
pub mod wizard;

pub use prelude::{Gateway, HttpGateway, Step, Wizard, WizardState};

use export::ExportFormat;
use std::sync::Arc;

/// Failure raised at the backend boundary.
///
/// Sources are reference counted so results can be cloned into UI messages.
#[derive(thiserror::Error, Debug, Clone)]
pub enum GatewayError {
    /// Non-success status on a process or generate call.
    #[error("{message}")]
    RequestFailed { message: String },
    /// Non-success status on a download call.
    #[error("Failed to download {format} file")]
    DownloadFailed { format: ExportFormat },
    #[error("could not decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("request timed out")]
    TimedOut,
    #[error("transport failure: {0}")]
    Transport(#[source] Arc<reqwest::Error>),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::TimedOut
        } else {
            GatewayError::Transport(Arc::new(err))
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
