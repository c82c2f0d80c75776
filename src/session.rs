use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::aggregate::{Aggregation, aggregate};
use crate::config::AppConfig;
use crate::detection::Detector;
use crate::error::{Error, ModelLoadError, Result, ValidationWarning};
use crate::models::PatientRecord;
use crate::report::{self, Report, ReportWriter, ResultsWriter, SavedResults};

/// Operator actions
#[derive(Debug, Clone)]
pub enum Event {
    LoadImage(PathBuf),
    RunAnalysis,
    GenerateReport(PatientRecord),
    SaveResults,
}

/// What a successful action produced
#[derive(Debug, Clone)]
pub enum Outcome {
    Analyzed(Aggregation),
    ReportWritten(Report),
    ResultsSaved(SavedResults),
}

/// State owned by the front-end: the detector, the loaded image and the
/// last aggregation. Report and save actions read from here only.
pub struct Session<D> {
    detector: Option<D>,
    reports: ReportWriter,
    results: ResultsWriter,
    image: Option<PathBuf>,
    aggregation: Option<Aggregation>,
    status: String,
}

impl<D: Detector> Session<D> {
    pub fn new(detector: D, config: &AppConfig) -> Self {
        Self {
            detector: Some(detector),
            reports: ReportWriter::from_config(&config.output),
            results: ResultsWriter::new(&config.output.results_dir),
            image: None,
            aggregation: None,
            status: "Model loaded".to_string(),
        }
    }

    /// Start from a detector load attempt. A failed load disables analysis
    /// but keeps the session usable.
    pub fn from_load(detector: std::result::Result<D, ModelLoadError>, config: &AppConfig) -> Self {
        match detector {
            Ok(detector) => Self::new(detector, config),
            Err(err) => {
                tracing::warn!(error = %err, "analysis disabled");
                let mut session = Self::without_detector(config);
                session.status = format!("Model failed to load: {err}");
                session
            }
        }
    }

    pub fn without_detector(config: &AppConfig) -> Self {
        Self {
            detector: None,
            reports: ReportWriter::from_config(&config.output),
            results: ResultsWriter::new(&config.output.results_dir),
            image: None,
            aggregation: None,
            status: "Analysis disabled".to_string(),
        }
    }

    pub fn with_report_writer(mut self, reports: ReportWriter) -> Self {
        self.reports = reports;
        self
    }

    pub fn analysis_enabled(&self) -> bool {
        self.detector.is_some()
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn aggregation(&self) -> Option<&Aggregation> {
        self.aggregation.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Dispatch one operator action
    pub fn handle(&mut self, event: Event) -> Result<Outcome> {
        self.handle_at(event, report::now())
    }

    pub fn handle_at(&mut self, event: Event, timestamp: OffsetDateTime) -> Result<Outcome> {
        let outcome = match event {
            Event::LoadImage(path) => self.load_image(path).map(Outcome::Analyzed),
            Event::RunAnalysis => self.run_analysis().map(Outcome::Analyzed),
            Event::GenerateReport(patient) => self
                .generate_report(&patient, timestamp)
                .map(Outcome::ReportWritten),
            Event::SaveResults => self.save_results(timestamp).map(Outcome::ResultsSaved),
        };
        if let Err(err) = &outcome {
            self.status = err.to_string();
        }
        outcome
    }

    /// Select an image and analyse it straight away
    pub fn load_image(&mut self, path: PathBuf) -> Result<Aggregation> {
        tracing::info!(path = %path.display(), "image loaded");
        self.image = Some(path);
        self.aggregation = None;
        self.run_analysis()
    }

    pub fn run_analysis(&mut self) -> Result<Aggregation> {
        let Some(image) = self.image.clone() else {
            return Err(ValidationWarning::NoImageLoaded.into());
        };
        let Some(detector) = &self.detector else {
            return Err(ValidationWarning::AnalysisDisabled.into());
        };

        let detections = match detector.detect(&image) {
            Ok(detections) => detections,
            Err(err) => {
                tracing::error!(error = %err, path = %image.display(), "analysis failed");
                self.image = None;
                self.aggregation = None;
                return Err(Error::Inference(err));
            }
        };

        let aggregation = aggregate(&detections);
        match &aggregation {
            Aggregation::NoDetections => {
                tracing::info!("no cells detected");
                self.status = "No sperm cells found".to_string();
            }
            Aggregation::Counted(result) => {
                tracing::info!(
                    total = result.total_count,
                    live = result.counts.live,
                    dead = result.counts.dead,
                    immature = result.counts.immature,
                    "analysis complete"
                );
                self.status = "Analysis complete".to_string();
            }
        }
        self.aggregation = Some(aggregation.clone());
        Ok(aggregation)
    }

    pub fn generate_report(
        &mut self,
        patient: &PatientRecord,
        timestamp: OffsetDateTime,
    ) -> Result<Report> {
        if self.image.is_none() {
            return Err(ValidationWarning::NoImageLoaded.into());
        }
        let Some(result) = self.aggregation.as_ref().and_then(Aggregation::result) else {
            return Err(ValidationWarning::NoAnalysisResult.into());
        };

        let report = self.reports.write(result, patient, timestamp)?;
        self.status = format!(
            "Report saved: {}, {}",
            report.text_path.display(),
            report.html_path.display()
        );
        Ok(report)
    }

    pub fn save_results(&mut self, timestamp: OffsetDateTime) -> Result<SavedResults> {
        let Some(image) = &self.image else {
            return Err(ValidationWarning::NoImageLoaded.into());
        };

        let saved = self
            .results
            .save(image, self.aggregation.as_ref(), timestamp)?;
        self.status = format!(
            "Results saved: {}, {}",
            saved.image_path.display(),
            saved.data_path.display()
        );
        Ok(saved)
    }
}
