use image::ImageFormat;
use std::fmt;
use std::fs;
use std::path::Path;

/// Upload ceiling advertised by the upload step.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("{0} is not a supported image file")]
    NotAnImage(String),
    #[error("{name} is {size} bytes, over the {limit} byte upload limit")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{field} must be a positive number of meters, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },
}

/// Image bytes plus the metadata the multipart upload needs.
#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reads an image from disk. The file type is taken from the extension only.
    pub fn load<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let format =
            ImageFormat::from_path(path).map_err(|_| UploadError::NotAnImage(display.clone()))?;

        let size = fs::metadata(path)
            .map_err(|source| UploadError::Read {
                path: display.clone(),
                source,
            })?
            .len();
        if size > max_bytes {
            return Err(UploadError::TooLarge {
                name: display,
                size,
                limit: max_bytes,
            });
        }

        let bytes = fs::read(path).map_err(|source| UploadError::Read {
            path: display.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plot".into());

        Ok(Self {
            file_name,
            mime: format.to_mime_type().to_string(),
            bytes,
        })
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reference length drawn on the plot image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBar {
    pub pixels: f64,
    pub meters: f64,
}

impl ScaleBar {
    /// Pairs the two optional scale-bar inputs. A lone or non-positive value
    /// yields `None` and the scale bar is not sent.
    pub fn from_parts(pixels: Option<f64>, meters: Option<f64>) -> Option<Self> {
        match (pixels, meters) {
            (Some(pixels), Some(meters)) if is_positive(pixels) && is_positive(meters) => {
                Some(Self { pixels, meters })
            }
            _ => None,
        }
    }
}

/// Everything the process endpoint needs for one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSubmission {
    pub image: ImageUpload,
    pub plot_width_m: f64,
    pub plot_height_m: f64,
    pub scale_bar: Option<ScaleBar>,
}

impl PlotSubmission {
    pub fn new(image: ImageUpload, plot_width_m: f64, plot_height_m: f64) -> Result<Self, UploadError> {
        if !is_positive(plot_width_m) {
            return Err(UploadError::InvalidDimension {
                field: "plot width",
                value: plot_width_m,
            });
        }
        if !is_positive(plot_height_m) {
            return Err(UploadError::InvalidDimension {
                field: "plot height",
                value: plot_height_m,
            });
        }
        Ok(Self {
            image,
            plot_width_m,
            plot_height_m,
            scale_bar: None,
        })
    }

    pub fn with_scale_bar(mut self, scale_bar: Option<ScaleBar>) -> Self {
        self.scale_bar = scale_bar;
        self
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
