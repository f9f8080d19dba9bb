//! Display text for the three preview modes, shared by the GUI and the driver.

use crate::model::{GeneratedPlan, PlotSubmission, ProcessedPlot, Room};

/// Number of detected rooms listed in the analysis view.
pub const ANALYSIS_ROOM_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionTone {
    Positive,
    Advisory,
}

/// Praise from the scorer reads as positive; anything else is advice.
pub fn suggestion_tone(suggestion: &str) -> SuggestionTone {
    let lowered = suggestion.to_lowercase();
    if ["good", "perfect", "excellent"]
        .iter()
        .any(|word| lowered.contains(word))
    {
        SuggestionTone::Positive
    } else {
        SuggestionTone::Advisory
    }
}

pub fn room_dimensions(room: &Room) -> String {
    format!("{:.1}m × {:.1}m", room.w_m, room.h_m)
}

pub fn room_area(room: &Room) -> String {
    format!("{:.1} m²", room.area_m2)
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewSummary<'a> {
    processed: &'a ProcessedPlot,
    plan: &'a GeneratedPlan,
}

impl<'a> PreviewSummary<'a> {
    pub fn new(processed: &'a ProcessedPlot, plan: &'a GeneratedPlan) -> Self {
        Self { processed, plan }
    }

    pub fn plot_dimensions_label(&self) -> String {
        let bbox = self.processed.plot_bbox_px;
        format!("Plot dimensions: {} × {} pixels", bbox.w, bbox.h)
    }

    pub fn scale_label(&self) -> String {
        format!("{:.4} m/px", self.processed.meters_per_px)
    }

    pub fn vastu_label(&self) -> String {
        format!("Vastu Score: {}/100", self.plan.vastu_score)
    }

    pub fn total_area_label(&self) -> String {
        format!("Total Area: {:.1} m²", self.plan.total_area)
    }

    /// Summary of the uploaded plot. The submission is shown when it was kept.
    pub fn original_lines(&self, submission: Option<&PlotSubmission>) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(submission) = submission {
            lines.push(format!(
                "Image: {} ({:.2} MB)",
                submission.image.file_name,
                submission.image.size_mb()
            ));
            lines.push(format!(
                "Plot size: {} m × {} m",
                submission.plot_width_m, submission.plot_height_m
            ));
            if let Some(scale_bar) = submission.scale_bar {
                lines.push(format!(
                    "Scale bar: {} px = {} m",
                    scale_bar.pixels, scale_bar.meters
                ));
            }
        }
        lines.push(self.plot_dimensions_label());
        lines
    }

    /// Counts from the computer-vision pass plus the first detected rooms.
    pub fn analysis_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Wall Lines: {}", self.processed.wall_lines.len()),
            format!("Openings: {}", self.processed.openings.len()),
            format!("Rooms Detected: {}", self.processed.layout.len()),
            format!("Scale: {}", self.scale_label()),
        ];
        lines.extend(
            self.processed
                .layout
                .iter()
                .take(ANALYSIS_ROOM_LIMIT)
                .map(|room| format!("{}: {}", room.name, room_area(room))),
        );
        lines
    }

    pub fn final_lines(&self) -> Vec<String> {
        let mut lines = vec![self.vastu_label()];
        lines.extend(self.plan.rooms.iter().map(|room| {
            format!("{}: {} ({})", room.name, room_dimensions(room), room_area(room))
        }));
        lines.push(self.total_area_label());
        lines.extend(self.plan.suggestions.iter().map(|suggestion| {
            let marker = match suggestion_tone(suggestion) {
                SuggestionTone::Positive => "+",
                SuggestionTone::Advisory => "!",
            };
            format!("{marker} {suggestion}")
        }));
        lines
    }
}
