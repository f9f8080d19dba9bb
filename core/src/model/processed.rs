use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pixel-space rectangle, carried on the wire as `[x, y, w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<[f64; 4]> for PixelBox {
    fn from([x, y, w, h]: [f64; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<PixelBox> for [f64; 4] {
    fn from(bbox: PixelBox) -> Self {
        [bbox.x, bbox.y, bbox.w, bbox.h]
    }
}

/// A room as detected or assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub bbox_px: PixelBox,
    pub x_m: f64,
    pub y_m: f64,
    pub w_m: f64,
    pub h_m: f64,
    pub area_m2: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Output of the image-processing endpoint.
///
/// The typed fields are read from the response; the response itself is kept
/// and is what gets serialized, so the plot goes back to the backend exactly
/// as it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ProcessedPlot {
    pub plot_bbox_px: PixelBox,
    pub meters_per_px: f64,
    pub layout: Vec<Room>,
    pub wall_lines: Vec<WallLine>,
    pub openings: Vec<Opening>,
    pub dxf_path: Option<String>,
    wire: Value,
}

#[derive(Deserialize)]
struct ProcessedFields {
    plot_bbox_px: PixelBox,
    meters_per_px: f64,
    layout: Vec<Room>,
    #[serde(default)]
    wall_lines: Vec<WallLine>,
    #[serde(default)]
    openings: Vec<Opening>,
    #[serde(default)]
    dxf_path: Option<String>,
}

impl ProcessedPlot {
    pub fn room_area_sum(&self) -> f64 {
        self.layout.iter().map(|room| room.area_m2).sum()
    }
}

impl TryFrom<Value> for ProcessedPlot {
    type Error = serde_json::Error;

    fn try_from(wire: Value) -> Result<Self, Self::Error> {
        let fields = ProcessedFields::deserialize(&wire)?;
        Ok(Self {
            plot_bbox_px: fields.plot_bbox_px,
            meters_per_px: fields.meters_per_px,
            layout: fields.layout,
            wall_lines: fields.wall_lines,
            openings: fields.openings,
            dxf_path: fields.dxf_path,
            wire,
        })
    }
}

impl From<ProcessedPlot> for Value {
    fn from(plot: ProcessedPlot) -> Self {
        plot.wire
    }
}
