//! Plan downloads and the platform file-save primitive.

use crate::config::ClientConfig;
use crate::gateway::Gateway;
use crate::model::{GeneratedPlan, ProcessedPlot};
use crate::GatewayError;
use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// File formats offered by the download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[serde(alias = "PDF")]
    Pdf,
    #[serde(alias = "PNG")]
    Png,
    #[serde(alias = "DXF")]
    Dxf,
    #[serde(alias = "JSON")]
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Png,
        ExportFormat::Dxf,
        ExportFormat::Json,
    ];

    /// Path segment used by the download endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Png => "PNG",
            ExportFormat::Dxf => "DXF",
            ExportFormat::Json => "JSON",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Dxf => "dxf",
            ExportFormat::Json => "json",
        }
    }

    pub fn file_name(self) -> String {
        format!("floorplan.{}", self.extension())
    }

    pub fn description(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "For viewing & printing",
            ExportFormat::Png => "High-quality image",
            ExportFormat::Dxf => "AutoCAD compatible",
            ExportFormat::Json => "Raw data export",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown export format {value:?} (expected pdf, png, dxf or json)"))
    }
}

/// Body of a download call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest {
    pub processed_data: ProcessedPlot,
    pub generated_plan: GeneratedPlan,
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum ExportError {
    #[error(transparent)]
    Download(#[from] GatewayError),
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Saves a downloaded file somewhere the user can find it.
pub trait FileSaver {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Writes downloads into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, or the working directory when the
    /// platform does not report one.
    pub fn downloads() -> Self {
        let dir = UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.download_dir {
            Some(dir) => Self::new(dir.clone()),
            None => Self::downloads(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(file_name);
        let write_error = |source| ExportError::Write {
            path: path.clone(),
            source: Arc::new(source),
        };
        fs::create_dir_all(&self.dir).map_err(write_error)?;
        fs::write(&path, bytes).map_err(write_error)?;
        Ok(path)
    }
}

/// Formats whose download is in flight. Each format is tracked on its own.
#[derive(Debug, Clone, Default)]
pub struct ExportTracker {
    pending: BTreeSet<ExportFormat>,
}

impl ExportTracker {
    /// Marks `format` pending. Returns `false` if it already was.
    pub fn begin(&mut self, format: ExportFormat) -> bool {
        self.pending.insert(format)
    }

    pub fn finish(&mut self, format: ExportFormat) {
        self.pending.remove(&format);
    }

    pub fn is_pending(&self, format: ExportFormat) -> bool {
        self.pending.contains(&format)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Downloads one format and hands the bytes to `saver`.
pub async fn export_plan<G: Gateway, S: FileSaver>(
    gateway: &G,
    saver: &S,
    format: ExportFormat,
    request: &DownloadRequest,
) -> Result<PathBuf, ExportError> {
    let bytes = gateway.download_file(format, request).await?;
    let path = saver.save(&format.file_name(), &bytes)?;
    info!("saved {} export to {}", format, path.display());
    Ok(path)
}
