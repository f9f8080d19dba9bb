use crate::report::{ExportOutcome, SessionReport};
use anyhow::{anyhow, Context};
use log::{info, warn};
use plancore::export::{export_plan, DownloadRequest, ExportFormat, FileSaver};
use plancore::model::{PlotSubmission, Requirements};
use plancore::summary::PreviewSummary;
use plancore::{Gateway, Wizard};

/// Walks one wizard session headlessly: process, generate, then export.
pub struct Runner<G, S> {
    gateway: G,
    saver: S,
}

impl<G: Gateway, S: FileSaver> Runner<G, S> {
    pub fn new(gateway: G, saver: S) -> Self {
        Self { gateway, saver }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn execute(
        &self,
        submission: PlotSubmission,
        requirements: Requirements,
        exports: &[ExportFormat],
    ) -> anyhow::Result<SessionReport> {
        let mut wizard = Wizard::new();

        if !wizard.submit_plot(&self.gateway, submission).await {
            return Err(stage_failure(&wizard, "processing plot image"));
        }
        info!("plot processed; generating plan");

        if !wizard
            .submit_requirements(&self.gateway, requirements)
            .await
        {
            return Err(stage_failure(&wizard, "generating floor plan"));
        }

        let state = wizard.state();
        let processed = state
            .processed_plot
            .as_ref()
            .context("processed plot missing after preview step")?;
        let plan = state
            .generated_plan
            .as_ref()
            .context("generated plan missing after preview step")?;
        let summary = PreviewSummary::new(processed, plan);

        let mut report = SessionReport {
            original: summary.original_lines(state.plot_submission.as_ref()),
            analysis: summary.analysis_lines(),
            plan: summary.final_lines(),
            exports: Vec::with_capacity(exports.len()),
            metrics: None,
        };

        let request = DownloadRequest {
            processed_data: processed.clone(),
            generated_plan: plan.clone(),
        };
        for format in exports {
            let result = export_plan(&self.gateway, &self.saver, *format, &request).await;
            if let Err(err) = &result {
                warn!("{} export failed: {}", format, err);
            }
            report.exports.push(ExportOutcome {
                format: *format,
                result: result.map_err(|err| err.to_string()),
            });
        }

        Ok(report)
    }
}

fn stage_failure(wizard: &Wizard, stage: &str) -> anyhow::Error {
    let message = wizard
        .state()
        .error_message
        .clone()
        .unwrap_or_else(|| "request was not issued".into());
    anyhow!("{} failed: {}", stage, message)
}
