use crate::canvas::PlotCanvas;
use iced::widget::{button, column, container, image, row, scrollable, svg, text, Canvas, Column, Row};
use iced::{Alignment, Color, Element, Length, Theme};
use log::{info, warn};
use plancore::export::{ExportError, ExportFormat, ExportTracker};
use plancore::summary::{room_area, room_dimensions, suggestion_tone, PreviewSummary, SuggestionTone};
use plancore::WizardState;
use std::path::PathBuf;

pub const DOWNLOAD_FAILED: &str = "Download failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Original,
    Analysis,
    #[default]
    Final,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Original, Tab::Analysis, Tab::Final];

    fn label(self) -> &'static str {
        match self {
            Tab::Original => "Original Plot",
            Tab::Analysis => "CV Analysis",
            Tab::Final => "Final Plan",
        }
    }
}

#[derive(Debug, Clone)]
pub enum PreviewMessage {
    TabSelected(Tab),
    Export(ExportFormat),
    ExportFinished(ExportFormat, Result<PathBuf, ExportError>),
    DismissNotice,
    Back,
    Restart,
}

pub enum Action {
    None,
    Export(ExportFormat),
    Back,
    Restart,
}

/// Preview step: result tabs plus per-format downloads.
#[derive(Debug)]
pub struct PreviewPanel {
    tab: Tab,
    pub(crate) exports: ExportTracker,
    notice: Option<&'static str>,
    pub(crate) saved: Option<PathBuf>,
    original: Option<image::Handle>,
    plan_svg: svg::Handle,
    canvas: PlotCanvas,
}

impl PreviewPanel {
    /// `None` until the wizard holds both the processed plot and the plan.
    pub fn new(state: &WizardState) -> Option<Self> {
        let processed = state.processed_plot.as_ref()?;
        let plan = state.generated_plan.as_ref()?;
        Some(Self {
            tab: Tab::default(),
            exports: ExportTracker::default(),
            notice: None,
            saved: None,
            original: state
                .plot_submission
                .as_ref()
                .map(|submission| image::Handle::from_bytes(submission.image.bytes.clone())),
            plan_svg: svg::Handle::from_memory(plan.svg_content.clone().into_bytes()),
            canvas: PlotCanvas::new(processed),
        })
    }

    pub fn update(&mut self, message: PreviewMessage) -> Action {
        match message {
            PreviewMessage::TabSelected(tab) => self.tab = tab,
            PreviewMessage::Export(format) => {
                if self.notice.is_none() && self.exports.begin(format) {
                    self.saved = None;
                    return Action::Export(format);
                }
            }
            PreviewMessage::ExportFinished(format, result) => {
                self.exports.finish(format);
                match result {
                    Ok(path) => {
                        info!("{} download saved to {}", format, path.display());
                        self.saved = Some(path);
                    }
                    Err(err) => {
                        warn!("{} download failed: {}", format, err);
                        self.notice = Some(DOWNLOAD_FAILED);
                    }
                }
            }
            PreviewMessage::DismissNotice => self.notice = None,
            PreviewMessage::Back => return Action::Back,
            PreviewMessage::Restart => {
                self.exports.clear();
                return Action::Restart;
            }
        }
        Action::None
    }

    pub fn view<'a>(&'a self, state: &'a WizardState) -> Element<'a, PreviewMessage> {
        if let Some(notice) = self.notice {
            return container(
                column![
                    text(notice).size(18).color(ADVISORY_COLOR),
                    button("OK").on_press(PreviewMessage::DismissNotice),
                ]
                .spacing(12)
                .align_x(Alignment::Center),
            )
            .padding(24)
            .style(container::rounded_box)
            .center_x(Length::Fill)
            .into();
        }

        let (Some(processed), Some(plan)) = (&state.processed_plot, &state.generated_plan) else {
            return text("Nothing to preview yet").into();
        };
        let summary = PreviewSummary::new(processed, plan);

        let tabs = Tab::ALL.iter().fold(Row::new().spacing(6), |tabs, tab| {
            let style: fn(&Theme, button::Status) -> button::Style = if *tab == self.tab {
                button::primary
            } else {
                button::secondary
            };
            tabs.push(
                button(tab.label())
                    .on_press(PreviewMessage::TabSelected(*tab))
                    .style(style),
            )
        });

        let body: Element<'a, PreviewMessage> = match self.tab {
            Tab::Original => {
                let picture: Element<'a, PreviewMessage> = match &self.original {
                    Some(handle) => image(handle.clone()).height(Length::Fixed(360.0)).into(),
                    None => text("The uploaded image is not available").size(14).into(),
                };
                column![
                    text("Original Plot Analysis").size(20),
                    picture,
                    lines(summary.original_lines(state.plot_submission.as_ref())),
                ]
                .spacing(10)
                .into()
            }
            Tab::Analysis => row![
                Canvas::new(self.canvas.clone())
                    .width(Length::Fill)
                    .height(Length::Fixed(360.0)),
                column![
                    text("Detected Elements").size(18),
                    lines(summary.analysis_lines()),
                ]
                .spacing(8)
                .width(Length::Fixed(260.0)),
            ]
            .spacing(16)
            .into(),
            Tab::Final => {
                let rooms = plan.rooms.iter().fold(Column::new().spacing(4), |col, room| {
                    col.push(
                        row![
                            text(room.name.as_str()).size(14).width(Length::Fill),
                            text(room_dimensions(room)).size(14),
                            text(room_area(room)).size(14),
                        ]
                        .spacing(12),
                    )
                });
                let suggestions =
                    plan.suggestions
                        .iter()
                        .fold(Column::new().spacing(4), |col, suggestion| {
                            let (marker, color) = match suggestion_tone(suggestion) {
                                SuggestionTone::Positive => ("✓", POSITIVE_COLOR),
                                SuggestionTone::Advisory => ("!", ADVISORY_COLOR),
                            };
                            col.push(text(format!("{marker} {suggestion}")).size(13).color(color))
                        });
                column![
                    text("Generated Floor Plan").size(20),
                    svg(self.plan_svg.clone())
                        .width(Length::Fill)
                        .height(Length::Fixed(360.0)),
                    text(summary.vastu_label()).size(22),
                    text("Room Details").size(16),
                    rooms,
                    text(summary.total_area_label()).size(15),
                    text("Vastu Analysis").size(16),
                    suggestions,
                ]
                .spacing(10)
                .into()
            }
        };

        let downloads = ExportFormat::ALL
            .iter()
            .fold(Row::new().spacing(10), |downloads, format| {
                let pending = self.exports.is_pending(*format);
                let caption = if pending {
                    "Downloading…"
                } else {
                    format.description()
                };
                downloads.push(
                    button(column![text(format.as_str()).size(16), text(caption).size(11)])
                        .padding(10)
                        .on_press_maybe((!pending).then_some(PreviewMessage::Export(*format))),
                )
            });
        let mut download_card = column![text("Download Your Floor Plan").size(18), downloads]
            .spacing(10);
        if let Some(path) = &self.saved {
            download_card = download_card.push(
                text(format!("Saved to {}", path.display()))
                    .size(12)
                    .color(POSITIVE_COLOR),
            );
        }

        let navigation = row![
            button("Back to Requirements")
                .on_press(PreviewMessage::Back)
                .style(button::secondary),
            button("Start New Project").on_press(PreviewMessage::Restart),
        ]
        .spacing(16);

        scrollable(
            column![
                tabs,
                container(body).padding(12).style(container::rounded_box),
                container(download_card)
                    .padding(12)
                    .width(Length::Fill)
                    .style(container::rounded_box),
                navigation,
            ]
            .spacing(14)
            .padding(16),
        )
        .into()
    }
}

const POSITIVE_COLOR: Color = Color::from_rgb(0.3, 0.8, 0.45);
const ADVISORY_COLOR: Color = Color::from_rgb(0.95, 0.7, 0.25);

fn lines<'a>(lines: Vec<String>) -> Element<'a, PreviewMessage> {
    lines
        .into_iter()
        .fold(Column::new().spacing(4), |col, line| col.push(text(line).size(14)))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancore::GatewayError;
    use serde_json::json;

    fn state() -> WizardState {
        WizardState {
            processed_plot: Some(
                serde_json::from_value(json!({
                    "plot_bbox_px": [0, 0, 400, 300],
                    "meters_per_px": 0.05,
                    "layout": []
                }))
                .unwrap(),
            ),
            generated_plan: Some(
                serde_json::from_value(json!({
                    "rooms": [],
                    "vastu_score": 70,
                    "suggestions": ["Good entrance placement"],
                    "svg_content": "<svg xmlns='http://www.w3.org/2000/svg'/>",
                    "total_area": 0.0
                }))
                .unwrap(),
            ),
            ..WizardState::default()
        }
    }

    #[test]
    fn panel_needs_both_results_and_opens_on_final_plan() {
        assert!(PreviewPanel::new(&WizardState::default()).is_none());
        let panel = PreviewPanel::new(&state()).unwrap();
        assert_eq!(panel.tab, Tab::Final);
        assert!(panel.original.is_none());
    }

    #[test]
    fn exports_are_tracked_per_format() {
        let mut panel = PreviewPanel::new(&state()).unwrap();
        assert!(matches!(
            panel.update(PreviewMessage::Export(ExportFormat::Pdf)),
            Action::Export(ExportFormat::Pdf)
        ));
        assert!(matches!(
            panel.update(PreviewMessage::Export(ExportFormat::Pdf)),
            Action::None
        ));
        assert!(matches!(
            panel.update(PreviewMessage::Export(ExportFormat::Dxf)),
            Action::Export(ExportFormat::Dxf)
        ));

        panel.update(PreviewMessage::ExportFinished(
            ExportFormat::Pdf,
            Ok(PathBuf::from("/tmp/floorplan.pdf")),
        ));
        assert!(!panel.exports.is_pending(ExportFormat::Pdf));
        assert!(panel.exports.is_pending(ExportFormat::Dxf));
        assert_eq!(panel.saved, Some(PathBuf::from("/tmp/floorplan.pdf")));
    }

    #[test]
    fn failed_download_blocks_until_dismissed() {
        let mut panel = PreviewPanel::new(&state()).unwrap();
        panel.update(PreviewMessage::Export(ExportFormat::Png));
        panel.update(PreviewMessage::ExportFinished(
            ExportFormat::Png,
            Err(ExportError::Download(GatewayError::DownloadFailed {
                format: ExportFormat::Png,
            })),
        ));
        assert_eq!(panel.notice, Some(DOWNLOAD_FAILED));
        assert!(matches!(
            panel.update(PreviewMessage::Export(ExportFormat::Png)),
            Action::None
        ));

        panel.update(PreviewMessage::DismissNotice);
        assert!(matches!(
            panel.update(PreviewMessage::Export(ExportFormat::Png)),
            Action::Export(ExportFormat::Png)
        ));
    }
}
