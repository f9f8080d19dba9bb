//! Boundary between the wizard and the processing backend.

pub mod http;

pub use http::HttpGateway;

use crate::export::{DownloadRequest, ExportFormat};
use crate::model::{GeneratedPlan, PlotSubmission, ProcessedPlot, Requirements};
use crate::GatewayResult;
use serde::Deserialize;
use std::future::Future;

pub const PROCESS_FALLBACK: &str = "Failed to process image";
pub const GENERATE_FALLBACK: &str = "Failed to generate plan";

/// Operations the wizard needs from the backend. No business logic lives here.
pub trait Gateway {
    fn process_image(
        &self,
        submission: &PlotSubmission,
    ) -> impl Future<Output = GatewayResult<ProcessedPlot>> + Send;

    fn generate_plan(
        &self,
        processed: &ProcessedPlot,
        requirements: &Requirements,
    ) -> impl Future<Output = GatewayResult<GeneratedPlan>> + Send;

    fn download_file(
        &self,
        format: ExportFormat,
        request: &DownloadRequest,
    ) -> impl Future<Output = GatewayResult<Vec<u8>>> + Send;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pulls `message` out of an error body, falling back when it is absent,
/// empty, or the body is not JSON.
pub fn extract_message(body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_message_prefers_body_message() {
        let body = br#"{"error":"no_scale_provided","message":"Provide plot_width_m"}"#;
        assert_eq!(extract_message(body, PROCESS_FALLBACK), "Provide plot_width_m");
    }

    #[test]
    fn extract_message_falls_back() {
        assert_eq!(
            extract_message(br#"{"error":"could-not-read-image"}"#, PROCESS_FALLBACK),
            "Failed to process image"
        );
        assert_eq!(
            extract_message(b"<html>502</html>", GENERATE_FALLBACK),
            "Failed to generate plan"
        );
        assert_eq!(
            extract_message(br#"{"message":""}"#, GENERATE_FALLBACK),
            "Failed to generate plan"
        );
    }
}
