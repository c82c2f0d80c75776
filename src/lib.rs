pub mod aggregate;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod report;
pub mod session;

pub use aggregate::{AggregateResult, Aggregation, PerClass, aggregate};
pub use crate::config::AppConfig;
pub use detection::{Detector, YoloDetector};
pub use error::{Error, InferenceError, ModelLoadError, ValidationWarning};
pub use models::{BoundingBox, Detection, PatientRecord, SpermClass};
pub use report::{Report, ReportWriter, ResultsWriter, SavedResults, TemplateSource};
pub use session::{Event, Outcome, Session};
