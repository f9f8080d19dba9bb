pub use crate::config::ClientConfig;
pub use crate::export::{DirectorySaver, DownloadRequest, ExportFormat, ExportTracker, FileSaver};
pub use crate::gateway::{Gateway, HttpGateway};
pub use crate::model::{
    AdditionalRooms, Direction, GeneratedPlan, ImageUpload, PlotSubmission, ProcessedPlot,
    Quadrant, Requirements, Room, ScaleBar, VastuPreferences,
};
pub use crate::summary::PreviewSummary;
pub use crate::wizard::{RequestKind, Step, Ticket, Wizard, WizardState};
pub use crate::{GatewayError, GatewayResult};
