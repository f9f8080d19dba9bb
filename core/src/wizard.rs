//! Wizard state controller.
//!
//! [`Wizard`] is the single owner of [`WizardState`]. Event-loop hosts use the
//! `begin_*`/`finish_*` pairs so the network call can run elsewhere; headless
//! callers use the async `submit_*` wrappers.

use crate::gateway::Gateway;
use crate::model::{GeneratedPlan, PlotSubmission, ProcessedPlot, Requirements};
use crate::telemetry::SessionLog;
use crate::{GatewayError, GatewayResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Upload = 1,
    Requirements = 2,
    Preview = 3,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Upload, Step::Requirements, Step::Preview];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Upload => "Upload Plot",
            Step::Requirements => "Requirements",
            Step::Preview => "Preview Plan",
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Step::Upload | Step::Requirements => Step::Upload,
            Step::Preview => Step::Requirements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ProcessImage,
    GeneratePlan,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::ProcessImage => f.write_str("image processing"),
            RequestKind::GeneratePlan => f.write_str("plan generation"),
        }
    }
}

/// Proof that a request was started. Results are applied only while their
/// ticket is still the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
    kind: RequestKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub step: Step,
    pub plot_submission: Option<PlotSubmission>,
    pub requirements: Option<Requirements>,
    pub processed_plot: Option<ProcessedPlot>,
    pub generated_plan: Option<GeneratedPlan>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Default)]
pub struct Wizard {
    state: WizardState,
    in_flight: Option<Ticket>,
    issued: u64,
    log: SessionLog,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight.map(|ticket| ticket.kind)
    }

    /// Starts image processing. `None` while another request is in flight or
    /// when the wizard is not on the upload step.
    pub fn begin_plot(&mut self) -> Option<Ticket> {
        if !self.ready_for(Step::Upload) {
            return None;
        }
        Some(self.issue(RequestKind::ProcessImage))
    }

    /// Applies an image-processing result. Returns `false` for stale tickets.
    pub fn finish_plot(
        &mut self,
        ticket: Ticket,
        submission: PlotSubmission,
        result: GatewayResult<ProcessedPlot>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        match result {
            Ok(plot) => {
                self.state.processed_plot = Some(plot);
                self.state.plot_submission = Some(submission);
                self.state.error_message = None;
                self.move_to(Step::Requirements);
            }
            Err(err) => self.fail(ticket.kind, &err),
        }
        true
    }

    /// Starts plan generation with the stored plot. `None` when there is no
    /// processed plot yet, another request is in flight, or the wizard is not
    /// on the requirements step.
    pub fn begin_requirements(&mut self) -> Option<(Ticket, ProcessedPlot)> {
        let plot = self.state.processed_plot.clone()?;
        if !self.ready_for(Step::Requirements) {
            return None;
        }
        Some((self.issue(RequestKind::GeneratePlan), plot))
    }

    pub fn finish_requirements(
        &mut self,
        ticket: Ticket,
        requirements: Requirements,
        result: GatewayResult<GeneratedPlan>,
    ) -> bool {
        if !self.accept(ticket) {
            return false;
        }
        match result {
            Ok(plan) => {
                self.state.requirements = Some(requirements);
                self.state.generated_plan = Some(plan);
                self.state.error_message = None;
                self.move_to(Step::Preview);
            }
            Err(err) => self.fail(ticket.kind, &err),
        }
        true
    }

    /// Runs the image-processing round trip. Returns `true` when the wizard
    /// advanced to the requirements step.
    pub async fn submit_plot<G: Gateway>(&mut self, gateway: &G, submission: PlotSubmission) -> bool {
        let Some(ticket) = self.begin_plot() else {
            return false;
        };
        let result = gateway.process_image(&submission).await;
        self.finish_plot(ticket, submission, result);
        self.state.step == Step::Requirements
    }

    /// Runs the plan-generation round trip. A no-op without a processed plot.
    pub async fn submit_requirements<G: Gateway>(
        &mut self,
        gateway: &G,
        requirements: Requirements,
    ) -> bool {
        let Some((ticket, plot)) = self.begin_requirements() else {
            return false;
        };
        let result = gateway.generate_plan(&plot, &requirements).await;
        self.finish_requirements(ticket, requirements, result);
        self.state.step == Step::Preview
    }

    /// Steps back one page. Refused while a request is in flight, since its
    /// result would land on the page that was left.
    pub fn go_back(&mut self) {
        if self.state.is_loading {
            self.log.refused("a request is already in flight");
            return;
        }
        self.state.error_message = None;
        self.move_to(self.state.step.previous());
    }

    pub fn dismiss_error(&mut self) {
        self.state.error_message = None;
    }

    /// Abandons the request in flight. A late result for it is ignored.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(ticket) => {
                self.state.is_loading = false;
                self.log.request_cancelled(ticket.kind);
                true
            }
            None => false,
        }
    }

    /// Discards the whole session.
    pub fn reset(&mut self) {
        let from = self.state.step;
        self.state = WizardState::default();
        self.in_flight = None;
        self.log.step_changed(from, Step::Upload);
    }

    fn ready_for(&self, step: Step) -> bool {
        if self.state.is_loading {
            self.log.refused("a request is already in flight");
            return false;
        }
        if self.state.step != step {
            self.log.refused("wizard is on a different step");
            return false;
        }
        true
    }

    fn issue(&mut self, kind: RequestKind) -> Ticket {
        self.issued += 1;
        let ticket = Ticket {
            id: self.issued,
            kind,
        };
        self.in_flight = Some(ticket);
        self.state.is_loading = true;
        self.state.error_message = None;
        self.log.request_started(kind);
        ticket
    }

    fn accept(&mut self, ticket: Ticket) -> bool {
        if self.in_flight != Some(ticket) {
            self.log.request_ignored(ticket.kind);
            return false;
        }
        self.in_flight = None;
        self.state.is_loading = false;
        true
    }

    fn fail(&mut self, kind: RequestKind, err: &GatewayError) {
        let message = err.to_string();
        self.log.request_failed(kind, &message);
        self.state.error_message = Some(message);
    }

    fn move_to(&mut self, step: Step) {
        self.log.step_changed(self.state.step, step);
        self.state.step = step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{DownloadRequest, ExportFormat};
    use crate::gateway::{extract_message, GENERATE_FALLBACK, PROCESS_FALLBACK};
    use crate::model::ImageUpload;
    use crate::summary::PreviewSummary;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned backend responses in order.
    #[derive(Default)]
    struct ScriptedGateway {
        plots: Mutex<Vec<GatewayResult<ProcessedPlot>>>,
        plans: Mutex<Vec<GatewayResult<GeneratedPlan>>>,
        plan_inputs: Mutex<Vec<(ProcessedPlot, Requirements)>>,
    }

    impl ScriptedGateway {
        fn with_plot(self, result: GatewayResult<ProcessedPlot>) -> Self {
            self.plots.lock().unwrap().push(result);
            self
        }

        fn with_plan(self, result: GatewayResult<GeneratedPlan>) -> Self {
            self.plans.lock().unwrap().push(result);
            self
        }
    }

    impl Gateway for ScriptedGateway {
        async fn process_image(&self, _: &PlotSubmission) -> GatewayResult<ProcessedPlot> {
            self.plots.lock().unwrap().remove(0)
        }

        async fn generate_plan(
            &self,
            processed: &ProcessedPlot,
            requirements: &Requirements,
        ) -> GatewayResult<GeneratedPlan> {
            self.plan_inputs
                .lock()
                .unwrap()
                .push((processed.clone(), requirements.clone()));
            self.plans.lock().unwrap().remove(0)
        }

        async fn download_file(&self, _: ExportFormat, _: &DownloadRequest) -> GatewayResult<Vec<u8>> {
            unreachable!("wizard never downloads")
        }
    }

    fn submission() -> PlotSubmission {
        let image = ImageUpload::from_bytes("plot.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        PlotSubmission::new(image, 15.5, 12.0).unwrap()
    }

    fn room(name: &str, w: f64, h: f64) -> serde_json::Value {
        json!({
            "name": name,
            "bbox_px": [0, 0, (w * 40.0) as i64, (h * 40.0) as i64],
            "x_m": 0.0, "y_m": 0.0, "w_m": w, "h_m": h, "area_m2": w * h
        })
    }

    fn processed_plot() -> ProcessedPlot {
        serde_json::from_value(json!({
            "plot_bbox_px": [12, 8, 620, 480],
            "meters_per_px": 0.025,
            "layout": [room("Room_1", 5.0, 4.0), room("Room_2", 3.5, 3.0), room("Room_3", 4.0, 2.5)],
            "wall_lines": [{"x1": 12, "y1": 8, "x2": 632, "y2": 8}],
            "openings": [{"x": 100, "y": 8, "w": 30, "h": 30}]
        }))
        .unwrap()
    }

    fn generated_plan(score: u8) -> GeneratedPlan {
        let plot = processed_plot();
        serde_json::from_value(json!({
            "rooms": [room("Living Room", 5.0, 4.0), room("Master Bedroom", 3.5, 3.0), room("Kitchen", 4.0, 2.5)],
            "vastu_score": score,
            "suggestions": ["Consider repositioning the kitchen to the southeast corner"],
            "svg_content": "<svg xmlns=\"http://www.w3.org/2000/svg\"/>",
            "total_area": plot.room_area_sum()
        }))
        .unwrap()
    }

    fn failed(message: &str, fallback: &str) -> GatewayError {
        GatewayError::RequestFailed {
            message: extract_message(message.as_bytes(), fallback),
        }
    }

    #[tokio::test]
    async fn submit_plot_success_advances_to_requirements() {
        let gateway = ScriptedGateway::default().with_plot(Ok(processed_plot()));
        let mut wizard = Wizard::new();

        assert!(wizard.submit_plot(&gateway, submission()).await);
        let state = wizard.state();
        assert_eq!(state.step, Step::Requirements);
        assert_eq!(state.processed_plot, Some(processed_plot()));
        assert_eq!(state.plot_submission, Some(submission()));
        assert!(!state.is_loading);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn submit_plot_failure_stays_on_upload() {
        let gateway = ScriptedGateway::default()
            .with_plot(Err(failed(r#"{"message":"Provide plot_width_m"}"#, PROCESS_FALLBACK)))
            .with_plot(Err(failed(r#"{"error":"could-not-read-image"}"#, PROCESS_FALLBACK)));
        let mut wizard = Wizard::new();

        assert!(!wizard.submit_plot(&gateway, submission()).await);
        assert_eq!(wizard.step(), Step::Upload);
        assert_eq!(wizard.state().error_message.as_deref(), Some("Provide plot_width_m"));
        assert!(!wizard.is_loading());

        wizard.dismiss_error();
        assert!(!wizard.submit_plot(&gateway, submission()).await);
        assert_eq!(wizard.step(), Step::Upload);
        assert_eq!(
            wizard.state().error_message.as_deref(),
            Some("Failed to process image")
        );
        assert_eq!(wizard.state().processed_plot, None);
    }

    #[tokio::test]
    async fn submit_requirements_without_plot_is_noop() {
        let gateway = ScriptedGateway::default();
        let mut wizard = Wizard::new();
        let before = wizard.state().clone();

        assert!(!wizard.submit_requirements(&gateway, Requirements::default()).await);
        assert_eq!(wizard.state(), &before);
        assert!(gateway.plan_inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_requirements_failure_keeps_previous_results() {
        let gateway = ScriptedGateway::default()
            .with_plot(Ok(processed_plot()))
            .with_plan(Err(failed("{}", GENERATE_FALLBACK)));
        let mut wizard = Wizard::new();
        wizard.submit_plot(&gateway, submission()).await;

        assert!(!wizard.submit_requirements(&gateway, Requirements::default()).await);
        assert_eq!(wizard.step(), Step::Requirements);
        assert_eq!(
            wizard.state().error_message.as_deref(),
            Some("Failed to generate plan")
        );
        assert_eq!(wizard.state().processed_plot, Some(processed_plot()));
        assert_eq!(wizard.state().generated_plan, None);
    }

    #[tokio::test]
    async fn go_back_floors_at_upload_and_keeps_results() {
        let gateway = ScriptedGateway::default()
            .with_plot(Ok(processed_plot()))
            .with_plan(Ok(generated_plan(75)));
        let mut wizard = Wizard::new();
        wizard.submit_plot(&gateway, submission()).await;
        wizard.submit_requirements(&gateway, Requirements::default()).await;
        assert_eq!(wizard.step(), Step::Preview);

        wizard.go_back();
        assert_eq!(wizard.step(), Step::Requirements);
        wizard.go_back();
        wizard.go_back();
        wizard.go_back();
        assert_eq!(wizard.step(), Step::Upload);
        assert!(wizard.state().generated_plan.is_some());
        assert!(wizard.state().processed_plot.is_some());
    }

    #[test]
    fn go_back_waits_for_the_request_in_flight() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_plot().unwrap();
        assert!(wizard.finish_plot(ticket, submission(), Ok(processed_plot())));
        let (ticket, _) = wizard.begin_requirements().unwrap();

        wizard.go_back();
        assert_eq!(wizard.step(), Step::Requirements);
        assert!(wizard.is_loading());

        assert!(wizard.finish_requirements(ticket, Requirements::default(), Ok(generated_plan(75))));
        assert_eq!(wizard.step(), Step::Preview);
        wizard.go_back();
        assert_eq!(wizard.step(), Step::Requirements);
    }

    #[tokio::test]
    async fn requirements_are_refused_off_their_step() {
        let gateway = ScriptedGateway::default()
            .with_plot(Ok(processed_plot()))
            .with_plan(Ok(generated_plan(75)));
        let mut wizard = Wizard::new();
        wizard.submit_plot(&gateway, submission()).await;
        wizard.go_back();

        assert!(!wizard.submit_requirements(&gateway, Requirements::default()).await);
        assert_eq!(wizard.step(), Step::Upload);
    }

    #[test]
    fn duplicate_begin_is_blocked_while_loading() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_plot().unwrap();
        assert!(wizard.is_loading());
        assert!(wizard.begin_plot().is_none());
        assert!(wizard.finish_plot(ticket, submission(), Ok(processed_plot())));
        assert!(!wizard.is_loading());
    }

    #[test]
    fn cancelled_request_ignores_late_result() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_plot().unwrap();
        assert!(wizard.cancel());
        assert!(!wizard.is_loading());
        assert_eq!(wizard.in_flight(), None);

        assert!(!wizard.finish_plot(ticket, submission(), Ok(processed_plot())));
        assert_eq!(wizard.step(), Step::Upload);
        assert_eq!(wizard.state().processed_plot, None);

        let retry = wizard.begin_plot().unwrap();
        assert_ne!(retry, ticket);
    }

    #[test]
    fn reset_discards_session_and_stale_tickets() {
        let mut wizard = Wizard::new();
        let ticket = wizard.begin_plot().unwrap();
        wizard.reset();
        assert_eq!(wizard.state(), &WizardState::default());
        let fresh = wizard.begin_plot().unwrap();
        assert!(!wizard.finish_plot(ticket, submission(), Ok(processed_plot())));
        assert!(wizard.finish_plot(fresh, submission(), Ok(processed_plot())));
    }

    #[tokio::test]
    async fn full_session_renders_final_summary() {
        let gateway = ScriptedGateway::default()
            .with_plot(Ok(processed_plot()))
            .with_plan(Ok(generated_plan(82)));
        let mut wizard = Wizard::new();

        assert!(wizard.submit_plot(&gateway, submission()).await);
        assert!(wizard.submit_requirements(&gateway, Requirements::default()).await);
        assert_eq!(wizard.step(), Step::Preview);

        let inputs = gateway.plan_inputs.lock().unwrap();
        assert_eq!(inputs[0].0, processed_plot());
        assert_eq!(inputs[0].1, Requirements::default());

        let state = wizard.state();
        let summary = PreviewSummary::new(
            state.processed_plot.as_ref().unwrap(),
            state.generated_plan.as_ref().unwrap(),
        );
        assert_eq!(summary.vastu_label(), "Vastu Score: 82/100");
        let expected_area = processed_plot().room_area_sum();
        assert_eq!(summary.total_area_label(), format!("Total Area: {:.1} m²", expected_area));
        assert_eq!(summary.total_area_label(), "Total Area: 40.5 m²");
        assert!(summary
            .final_lines()
            .contains(&"Vastu Score: 82/100".to_string()));
    }
}
