use std::path::PathBuf;

/// The detection model could not be brought up. Analysis is disabled, the
/// rest of the application keeps working.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to load model {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },
}

/// Per-image detection failure
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("detection model is not available")]
    ModelUnavailable,
    #[error("failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("model inference failed: {0}")]
    Runtime(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// Operator asked for something the current state cannot provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("load an image first")]
    NoImageLoaded,
    #[error("there are no analysis results to report")]
    NoAnalysisResult,
    #[error("analysis is disabled because the model failed to load")]
    AnalysisDisabled,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("failed to write {}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("template {template}: {missing}")]
    Template {
        template: String,
        #[source]
        missing: crate::report::html::MissingField,
    },
    #[error(transparent)]
    Validation(#[from] ValidationWarning),
}

impl Error {
    pub(crate) fn file_io(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::FileIo {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
