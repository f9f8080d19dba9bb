use iced::widget::{button, column, container, image, row, text, text_input, Column};
use iced::{Alignment, Color, Element, Length, Task, Theme};
use log::{info, warn};
use plancore::model::{ImageUpload, PlotSubmission, ScaleBar, UploadError};
use rfd::AsyncFileDialog;
use std::fmt;
use std::path::PathBuf;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub enum UploadMessage {
    Browse,
    FilePicked(Option<PathBuf>),
    FileHovered,
    FileDropped(PathBuf),
    HoverLeft,
    WidthChanged(String),
    HeightChanged(String),
    ScaleBarPxChanged(String),
    ScaleBarMChanged(String),
    Submit,
}

pub enum Action {
    None,
    Run(Task<UploadMessage>),
    Submit(PlotSubmission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingImage,
    MissingDimension(&'static str),
    InvalidDimension(&'static str),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingImage => f.write_str("Choose a plot image"),
            FormError::MissingDimension(field) => write!(f, "{field} is required"),
            FormError::InvalidDimension(field) => {
                write!(f, "{field} must be a positive number of meters")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Width,
    Height,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Width => "Plot width",
            Field::Height => "Plot height",
        }
    }
}

/// Form state of the upload step.
#[derive(Debug)]
pub struct UploadForm {
    max_upload_bytes: u64,
    image: Option<ImageUpload>,
    preview: Option<image::Handle>,
    file_error: Option<String>,
    drag_active: bool,
    width: String,
    height: String,
    scale_bar_px: String,
    scale_bar_m: String,
}

impl UploadForm {
    pub fn new(max_upload_bytes: u64) -> Self {
        Self {
            max_upload_bytes,
            image: None,
            preview: None,
            file_error: None,
            drag_active: false,
            width: String::new(),
            height: String::new(),
            scale_bar_px: String::new(),
            scale_bar_m: String::new(),
        }
    }

    pub fn update(&mut self, message: UploadMessage) -> Action {
        match message {
            UploadMessage::Browse => Action::Run(Task::perform(
                AsyncFileDialog::new()
                    .set_title("Choose a plot image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file(),
                |handle| UploadMessage::FilePicked(handle.map(|file| file.path().to_path_buf())),
            )),
            UploadMessage::FilePicked(Some(path)) | UploadMessage::FileDropped(path) => {
                self.drag_active = false;
                self.select_file(path);
                Action::None
            }
            UploadMessage::FilePicked(None) => Action::None,
            UploadMessage::FileHovered => {
                self.drag_active = true;
                Action::None
            }
            UploadMessage::HoverLeft => {
                self.drag_active = false;
                Action::None
            }
            UploadMessage::WidthChanged(value) => {
                self.width = value;
                Action::None
            }
            UploadMessage::HeightChanged(value) => {
                self.height = value;
                Action::None
            }
            UploadMessage::ScaleBarPxChanged(value) => {
                self.scale_bar_px = value;
                Action::None
            }
            UploadMessage::ScaleBarMChanged(value) => {
                self.scale_bar_m = value;
                Action::None
            }
            UploadMessage::Submit => match self.submission() {
                Ok(submission) => {
                    if self.scale_bar_ignored() {
                        warn!("incomplete scale bar; submitting without it");
                    }
                    Action::Submit(submission)
                }
                Err(err) => {
                    warn!("upload form incomplete: {err}");
                    Action::None
                }
            },
        }
    }

    fn select_file(&mut self, path: PathBuf) {
        match ImageUpload::load(&path, self.max_upload_bytes) {
            Ok(upload) => {
                info!("selected {} ({:.2} MB)", upload.file_name, upload.size_mb());
                self.preview = Some(image::Handle::from_bytes(upload.bytes.clone()));
                self.image = Some(upload);
                self.file_error = None;
            }
            Err(err) => {
                warn!("rejected {}: {err}", path.display());
                self.file_error = Some(err.to_string());
            }
        }
    }

    /// Builds the submission, or the first reason the form is not ready.
    pub fn submission(&self) -> Result<PlotSubmission, FormError> {
        let image = self.image.clone().ok_or(FormError::MissingImage)?;
        let width = dimension(&self.width, Field::Width)?;
        let height = dimension(&self.height, Field::Height)?;
        let submission = PlotSubmission::new(image, width, height).map_err(|err| match err {
            UploadError::InvalidDimension { field, .. } => FormError::InvalidDimension(field),
            _ => FormError::MissingImage,
        })?;
        Ok(submission.with_scale_bar(self.scale_bar()))
    }

    pub fn accepted_files(&self) -> String {
        let mb = self.max_upload_bytes as f64 / 1024.0 / 1024.0;
        if mb.fract() == 0.0 {
            format!("Supports JPG, PNG, GIF up to {mb:.0}MB")
        } else {
            format!("Supports JPG, PNG, GIF up to {mb:.1}MB")
        }
    }

    pub fn is_ready(&self) -> bool {
        self.submission().is_ok()
    }

    fn scale_bar(&self) -> Option<ScaleBar> {
        ScaleBar::from_parts(
            parse_positive(&self.scale_bar_px),
            parse_positive(&self.scale_bar_m),
        )
    }

    /// Something was typed into the scale-bar fields but it cannot be sent.
    pub fn scale_bar_ignored(&self) -> bool {
        let touched = !self.scale_bar_px.trim().is_empty() || !self.scale_bar_m.trim().is_empty();
        touched && self.scale_bar().is_none()
    }

    pub fn view(&self) -> Element<'_, UploadMessage> {
        let drop_zone: Element<'_, UploadMessage> = match (&self.image, &self.preview) {
            (Some(upload), Some(handle)) => column![
                text(upload.file_name.as_str()).size(16),
                text(format!("{:.2} MB", upload.size_mb())).size(12),
                image(handle.clone()).height(Length::Fixed(220.0)),
                button("Choose another image")
                    .on_press(UploadMessage::Browse)
                    .style(button::secondary),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into(),
            _ => column![
                text(if self.drag_active {
                    "Release to upload"
                } else {
                    "Drop your plot image here, or"
                })
                .size(16),
                button("Browse").on_press(UploadMessage::Browse),
                text(self.accepted_files()).size(12),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into(),
        };

        let zone_style: fn(&Theme) -> container::Style = if self.drag_active {
            container::bordered_box
        } else {
            container::rounded_box
        };
        let mut file_column = Column::new().spacing(6).push(
            container(drop_zone)
                .padding(24)
                .width(Length::Fill)
                .center_x(Length::Fill)
                .style(zone_style),
        );
        if let Some(err) = &self.file_error {
            file_column = file_column.push(text(err.as_str()).size(12).color(ERROR_COLOR));
        }

        let dimensions = row![
            labelled_input(
                "Plot Width (meters) *",
                "e.g., 15.5",
                &self.width,
                UploadMessage::WidthChanged
            ),
            labelled_input(
                "Plot Height (meters) *",
                "e.g., 12.0",
                &self.height,
                UploadMessage::HeightChanged
            ),
        ]
        .spacing(16);

        let mut scale_bar = column![
            text("Optional: Scale Bar (for higher accuracy)").size(14),
            row![
                labelled_input(
                    "Scale Bar Length (pixels)",
                    "e.g., 100",
                    &self.scale_bar_px,
                    UploadMessage::ScaleBarPxChanged
                ),
                labelled_input(
                    "Scale Bar Represents (meters)",
                    "e.g., 5.0",
                    &self.scale_bar_m,
                    UploadMessage::ScaleBarMChanged
                ),
            ]
            .spacing(16),
        ]
        .spacing(8);
        if self.scale_bar_ignored() {
            scale_bar = scale_bar.push(
                text("Enter both scale bar values; an incomplete scale bar is ignored.")
                    .size(12)
                    .color(WARNING_COLOR),
            );
        }

        let submit = button(text("Process Image & Continue").size(16))
            .padding(12)
            .on_press_maybe(self.is_ready().then_some(UploadMessage::Submit));

        column![
            text("Upload Your Plot Image").size(26),
            text("Upload a clear image of your plot and provide the dimensions for accurate scaling")
                .size(14),
            file_column,
            text("Plot Dimensions").size(18),
            dimensions,
            scale_bar,
            submit,
        ]
        .spacing(14)
        .padding(16)
        .max_width(720.0)
        .into()
    }
}

const ERROR_COLOR: Color = Color::from_rgb(0.95, 0.4, 0.4);
const WARNING_COLOR: Color = Color::from_rgb(0.95, 0.7, 0.25);

fn labelled_input<'a>(
    label: &'a str,
    placeholder: &'a str,
    value: &'a str,
    on_input: fn(String) -> UploadMessage,
) -> Element<'a, UploadMessage> {
    column![
        text(label).size(13),
        text_input(placeholder, value).on_input(on_input).padding(6),
    ]
    .spacing(4)
    .width(Length::Fill)
    .into()
}

fn dimension(value: &str, field: Field) -> Result<f64, FormError> {
    if value.trim().is_empty() {
        return Err(FormError::MissingDimension(field.label()));
    }
    parse_positive(value).ok_or(FormError::InvalidDimension(field.label()))
}

fn parse_positive(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite() && *parsed > 0.0)
}
