use std::path::{Path, PathBuf};

use config::{Config, ConfigError};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Side of the square model input
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/sperm-yolov8.rten"),
            input_size: 640,
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub reports_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Shared markup file rewritten after every report
    pub current_report: PathBuf,
    /// Fixed template; when unset the current report (or the built-in
    /// template) is used.
    ///
    /// Values go into elements carrying `data-field="<name>"`. Such an element
    /// must hold text only: its content ends at the first closing tag, so
    /// nested markup is cut. The template needs an element for each of
    /// `patient_name`, `birth_date`, `patient_id`, `conclusion` and `doctor`.
    pub template: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            results_dir: PathBuf::from("results"),
            current_report: PathBuf::from("index.html"),
            template: None,
        }
    }
}

impl AppConfig {
    /// Read a YAML file with `SPERMAI__SECTION__KEY` environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SPERMAI").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults plus environment overrides, for runs without a config file
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::Environment::with_prefix("SPERMAI").separator("__"))
            .build()?
            .try_deserialize()
    }
}
