use crate::views::preview::{self, PreviewMessage, PreviewPanel};
use crate::views::requirements::{self, RequirementsForm, RequirementsMessage};
use crate::views::upload::{self, UploadForm, UploadMessage};
use iced::widget::{button, column, container, row, text, Column, Container, Row};
use iced::{task, Alignment, Color, Element, Length, Task};
use log::{debug, info};
use plancore::export::{export_plan, DirectorySaver, DownloadRequest, ExportError, ExportFormat};
use plancore::model::{GeneratedPlan, PlotSubmission, ProcessedPlot, Requirements};
use plancore::wizard::{RequestKind, Ticket};
use plancore::{Gateway, GatewayResult, HttpGateway, Step, Wizard};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Message {
    Upload(UploadMessage),
    Requirements(RequirementsMessage),
    Preview(PreviewMessage),
    PlotProcessed(Ticket, PlotSubmission, GatewayResult<ProcessedPlot>),
    PlanGenerated(Ticket, Requirements, GatewayResult<GeneratedPlan>),
    /// Download result for the preview panel with the given id.
    Exported(u64, ExportFormat, Result<PathBuf, ExportError>),
    Cancel,
    DismissError,
}

/// Application state: the wizard controller plus the per-step forms.
pub struct PlanWizard {
    wizard: Wizard,
    gateway: HttpGateway,
    saver: DirectorySaver,
    upload: UploadForm,
    requirements: RequirementsForm,
    preview: Option<PreviewPanel>,
    panel_id: u64,
    request: Option<task::Handle>,
}

impl PlanWizard {
    pub fn boot(gateway: HttpGateway, saver: DirectorySaver) -> (Self, Task<Message>) {
        let upload = UploadForm::new(gateway.config().max_upload_bytes);
        (
            PlanWizard {
                wizard: Wizard::new(),
                gateway,
                saver,
                upload,
                requirements: RequirementsForm::default(),
                preview: None,
                panel_id: 0,
                request: None,
            },
            Task::none(),
        )
    }

    pub fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Upload(message) => match state.upload.update(message) {
                upload::Action::None => Task::none(),
                upload::Action::Run(task) => task.map(Message::Upload),
                upload::Action::Submit(submission) => state.process(submission),
            },
            Message::Requirements(message) => match state.requirements.update(message) {
                requirements::Action::None => Task::none(),
                requirements::Action::Back => {
                    state.wizard.go_back();
                    Task::none()
                }
                requirements::Action::Submit(requirements) => state.generate(requirements),
            },
            Message::Preview(message) => {
                let Some(panel) = state.preview.as_mut() else {
                    return Task::none();
                };
                match panel.update(message) {
                    preview::Action::None => Task::none(),
                    preview::Action::Export(format) => state.export(format),
                    preview::Action::Back => {
                        state.wizard.go_back();
                        state.preview = None;
                        Task::none()
                    }
                    preview::Action::Restart => {
                        state.restart();
                        Task::none()
                    }
                }
            }
            Message::PlotProcessed(ticket, submission, result) => {
                if state.wizard.finish_plot(ticket, submission, result) {
                    state.request = None;
                }
                Task::none()
            }
            Message::PlanGenerated(ticket, requirements, result) => {
                if state.wizard.finish_requirements(ticket, requirements, result) {
                    state.request = None;
                    if state.wizard.step() == Step::Preview {
                        state.panel_id += 1;
                        state.preview = PreviewPanel::new(state.wizard.state());
                    }
                }
                Task::none()
            }
            Message::Exported(panel_id, format, result) => {
                match state.preview.as_mut() {
                    Some(panel) if panel_id == state.panel_id => {
                        let _ = panel.update(PreviewMessage::ExportFinished(format, result));
                    }
                    _ => debug!("discarding {} download from a closed preview", format),
                }
                Task::none()
            }
            Message::Cancel => {
                if let Some(handle) = state.request.take() {
                    handle.abort();
                }
                state.wizard.cancel();
                Task::none()
            }
            Message::DismissError => {
                state.wizard.dismiss_error();
                Task::none()
            }
        }
    }

    fn process(&mut self, submission: PlotSubmission) -> Task<Message> {
        let Some(ticket) = self.wizard.begin_plot() else {
            return Task::none();
        };
        let gateway = self.gateway.clone();
        let (task, handle) = Task::perform(
            async move {
                let result = gateway.process_image(&submission).await;
                (submission, result)
            },
            move |(submission, result)| Message::PlotProcessed(ticket, submission, result),
        )
        .abortable();
        self.request = Some(handle);
        task
    }

    fn generate(&mut self, requirements: Requirements) -> Task<Message> {
        let Some((ticket, plot)) = self.wizard.begin_requirements() else {
            return Task::none();
        };
        let gateway = self.gateway.clone();
        let (task, handle) = Task::perform(
            async move {
                let result = gateway.generate_plan(&plot, &requirements).await;
                (requirements, result)
            },
            move |(requirements, result)| Message::PlanGenerated(ticket, requirements, result),
        )
        .abortable();
        self.request = Some(handle);
        task
    }

    fn export(&self, format: ExportFormat) -> Task<Message> {
        let panel_id = self.panel_id;
        let state = self.wizard.state();
        let (Some(processed), Some(plan)) = (&state.processed_plot, &state.generated_plan) else {
            return Task::done(Message::Exported(
                panel_id,
                format,
                Err(plancore::GatewayError::DownloadFailed { format }.into()),
            ));
        };
        let request = DownloadRequest {
            processed_data: processed.clone(),
            generated_plan: plan.clone(),
        };
        let gateway = self.gateway.clone();
        let saver = self.saver.clone();
        Task::perform(
            async move { export_plan(&gateway, &saver, format, &request).await },
            move |result| Message::Exported(panel_id, format, result),
        )
    }

    fn restart(&mut self) {
        if let Some(handle) = self.request.take() {
            handle.abort();
        }
        self.wizard.reset();
        self.upload = UploadForm::new(self.gateway.config().max_upload_bytes);
        self.requirements = RequirementsForm::default();
        self.preview = None;
        info!("started a new project");
    }

    pub fn view(state: &Self) -> Element<'_, Message> {
        let wizard = state.wizard.state();

        let body: Element<'_, Message> = if state.wizard.is_loading() {
            loading_screen(state.wizard.in_flight())
        } else if let Some(error) = &wizard.error_message {
            error_screen(error)
        } else {
            match wizard.step {
                Step::Upload => state.upload.view().map(Message::Upload),
                Step::Requirements => state.requirements.view().map(Message::Requirements),
                Step::Preview => match &state.preview {
                    Some(panel) => panel.view(wizard).map(Message::Preview),
                    None => text("Nothing to preview yet").into(),
                },
            }
        };

        let layout = column![
            header(wizard.step),
            container(body).width(Length::Fill).center_x(Length::Fill),
            text(format!("Backend: {}", state.gateway.metrics()))
                .size(11)
                .color(MUTED),
        ]
        .spacing(16)
        .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

const ACTIVE: Color = Color::from_rgb(0.18, 0.72, 0.89);
const DONE: Color = Color::from_rgb(0.3, 0.8, 0.45);
const MUTED: Color = Color::from_rgb(0.55, 0.55, 0.6);

fn header<'a>(current: Step) -> Element<'a, Message> {
    let steps = Step::ALL.iter().fold(Row::new().spacing(18), |steps, step| {
        let (marker, color) = if *step == current {
            (step.number().to_string(), ACTIVE)
        } else if *step < current {
            ("✓".to_string(), DONE)
        } else {
            (step.number().to_string(), MUTED)
        };
        steps.push(text(format!("{marker} {}", step.label())).size(14).color(color))
    });
    row![
        text("AI Floor Plan Generator").size(22).width(Length::Fill),
        steps
    ]
    .align_y(Alignment::Center)
    .into()
}

fn loading_screen<'a>(kind: Option<RequestKind>) -> Element<'a, Message> {
    let (title, detail) = match kind {
        Some(RequestKind::GeneratePlan) => (
            "Generating your floor plan...",
            "Creating an optimized floor plan based on your requirements and Vastu preferences.",
        ),
        _ => (
            "Processing your image...",
            "Analyzing your plot image and detecting room boundaries. This may take a few moments.",
        ),
    };
    column![
        text(title).size(22),
        text(detail).size(14).color(MUTED),
        button("Cancel")
            .on_press(Message::Cancel)
            .style(button::secondary),
    ]
    .spacing(12)
    .padding(40)
    .align_x(Alignment::Center)
    .into()
}

fn error_screen(error: &str) -> Element<'_, Message> {
    container(
        Column::new()
            .push(text("Something went wrong").size(20))
            .push(text(error).size(14).color(Color::from_rgb(0.95, 0.4, 0.4)))
            .push(button("Try Again").on_press(Message::DismissError))
            .spacing(12)
            .align_x(Alignment::Center),
    )
    .padding(24)
    .max_width(480.0)
    .style(container::rounded_box)
    .into()
}
