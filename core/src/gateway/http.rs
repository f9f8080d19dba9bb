use super::{extract_message, Gateway, GENERATE_FALLBACK, PROCESS_FALLBACK};
use crate::config::ClientConfig;
use crate::export::{DownloadRequest, ExportFormat};
use crate::model::{GeneratedPlan, PlotSubmission, ProcessedPlot, Requirements};
use crate::telemetry::{MetricsSnapshot, RequestMetrics};
use crate::{GatewayError, GatewayResult};
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// `reqwest`-backed gateway. Cheap to clone; clones share the connection pool
/// and metrics.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    config: ClientConfig,
    metrics: Arc<RequestMetrics>,
}

#[derive(Serialize)]
struct GeneratePlanBody<'a> {
    processed_data: &'a ProcessedPlot,
    requirements: &'a Requirements,
}

impl HttpGateway {
    pub fn new(config: ClientConfig) -> GatewayResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config,
            metrics: Arc::new(RequestMetrics::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn multipart_form(submission: &PlotSubmission) -> GatewayResult<Form> {
        let file = Part::bytes(submission.image.bytes.clone())
            .file_name(submission.image.file_name.clone())
            .mime_str(&submission.image.mime)?;
        let mut form = Form::new()
            .part("file", file)
            .text("plot_width_m", submission.plot_width_m.to_string())
            .text("plot_height_m", submission.plot_height_m.to_string());
        if let Some(scale_bar) = submission.scale_bar {
            form = form
                .text("scale_bar_px", scale_bar.pixels.to_string())
                .text("scale_bar_m", scale_bar.meters.to_string());
        }
        Ok(form)
    }

    fn observe<T>(&self, outcome: &GatewayResult<T>) {
        self.metrics.record_request();
        if let Err(err) = outcome {
            self.metrics.record_failure();
            warn!("backend call failed: {}", err);
        }
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    what: &'static str,
    fallback: &str,
) -> GatewayResult<T> {
    let status = response.status();
    if !status.is_success() {
        // An unreadable error body still resolves to the stage message.
        let body = response.bytes().await.unwrap_or_else(|err| {
            debug!("{} error body unreadable: {}", what, err);
            Default::default()
        });
        debug!("{} response: {} ({} bytes)", what, status, body.len());
        return Err(GatewayError::RequestFailed {
            message: extract_message(&body, fallback),
        });
    }
    let body = response.bytes().await?;
    debug!("{} response: {} ({} bytes)", what, status, body.len());
    serde_json::from_slice(&body).map_err(|err| GatewayError::Decode {
        what,
        source: Arc::new(err),
    })
}

impl Gateway for HttpGateway {
    async fn process_image(&self, submission: &PlotSubmission) -> GatewayResult<ProcessedPlot> {
        let url = self.config.endpoint("/api/process");
        debug!("POST {} ({})", url, submission.image.file_name);
        let outcome = async {
            let form = Self::multipart_form(submission)?;
            let response = self.client.post(&url).multipart(form).send().await?;
            read_json(response, "processed plot", PROCESS_FALLBACK).await
        }
        .await;
        self.observe(&outcome);
        outcome
    }

    async fn generate_plan(
        &self,
        processed: &ProcessedPlot,
        requirements: &Requirements,
    ) -> GatewayResult<GeneratedPlan> {
        let url = self.config.endpoint("/api/generate-plan");
        debug!("POST {}", url);
        let body = GeneratePlanBody {
            processed_data: processed,
            requirements,
        };
        let outcome = async {
            let response = self.client.post(&url).json(&body).send().await?;
            read_json(response, "generated plan", GENERATE_FALLBACK).await
        }
        .await;
        self.observe(&outcome);
        outcome
    }

    async fn download_file(
        &self,
        format: ExportFormat,
        request: &DownloadRequest,
    ) -> GatewayResult<Vec<u8>> {
        let url = self
            .config
            .endpoint(&format!("/api/download/{}", format.as_str()));
        debug!("POST {}", url);
        let outcome = async {
            let response = self.client.post(&url).json(request).send().await?;
            if !response.status().is_success() {
                return Err(GatewayError::DownloadFailed { format });
            }
            Ok(response.bytes().await?.to_vec())
        }
        .await;
        self.observe(&outcome);
        if outcome.is_ok() {
            self.metrics.record_download();
        }
        outcome
    }
}
