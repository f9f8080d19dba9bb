//! Records exchanged with the floor-plan backend.

pub mod plan;
pub mod plot;
pub mod processed;
pub mod requirements;

pub use plan::GeneratedPlan;
pub use plot::{ImageUpload, PlotSubmission, ScaleBar, UploadError, DEFAULT_MAX_UPLOAD_BYTES};
pub use processed::{Opening, PixelBox, ProcessedPlot, Room, WallLine};
pub use requirements::{
    AdditionalRooms, Direction, Quadrant, Requirements, RequirementsError, VastuPreferences,
    BATHROOM_RANGE, BEDROOM_RANGE,
};
