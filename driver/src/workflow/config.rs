use anyhow::Context;
use log::warn;
use plancore::config::ClientConfig;
use plancore::export::{DirectorySaver, ExportFormat};
use plancore::model::{ImageUpload, PlotSubmission, Requirements, ScaleBar};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Plot image and real-world dimensions for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlotInput {
    pub image: PathBuf,
    pub width_m: f64,
    pub height_m: f64,
    #[serde(default)]
    pub scale_bar_px: Option<f64>,
    #[serde(default)]
    pub scale_bar_m: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub api: ClientConfig,
    pub plot: PlotInput,
    #[serde(default)]
    pub requirements: Requirements,
    #[serde(default)]
    pub exports: Vec<ExportFormat>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl SessionConfig {
    /// Loads a session file. A relative image path is taken relative to the
    /// file itself.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let mut config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        if config.plot.image.is_relative() {
            if let Some(parent) = path_ref.parent() {
                config.plot.image = parent.join(&config.plot.image);
            }
        }
        Ok(config)
    }

    pub fn from_args(
        api: ClientConfig,
        plot: PlotInput,
        requirements: Requirements,
        exports: Vec<ExportFormat>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            api,
            plot,
            requirements,
            exports,
            output_dir,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.validate().context("validating api settings")?;
        self.requirements
            .validate()
            .context("validating requirements")?;
        Ok(())
    }

    /// Reads the image and builds the submission. A lone scale-bar value is
    /// dropped with a warning.
    pub fn submission(&self) -> anyhow::Result<PlotSubmission> {
        let image = ImageUpload::load(&self.plot.image, self.api.max_upload_bytes)
            .with_context(|| format!("loading plot image {}", self.plot.image.display()))?;
        let scale_bar = ScaleBar::from_parts(self.plot.scale_bar_px, self.plot.scale_bar_m);
        if scale_bar.is_none()
            && (self.plot.scale_bar_px.is_some() || self.plot.scale_bar_m.is_some())
        {
            warn!("scale bar needs both a pixel length and a meter length; ignoring it");
        }
        let submission = PlotSubmission::new(image, self.plot.width_m, self.plot.height_m)?
            .with_scale_bar(scale_bar);
        Ok(submission)
    }

    pub fn saver(&self) -> DirectorySaver {
        match &self.output_dir {
            Some(dir) => DirectorySaver::new(dir.clone()),
            None => DirectorySaver::from_config(&self.api),
        }
    }
}
