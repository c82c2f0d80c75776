use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb};
use spermai::{AppConfig, Detection, Detector, InferenceError, PatientRecord, SpermClass};
use tempfile::TempDir;

/// Detector returning a fixed list, standing in for the model
pub struct StubDetector {
    pub detections: Vec<Detection>,
}

impl Detector for StubDetector {
    fn detect(&self, _image_path: &Path) -> Result<Vec<Detection>, InferenceError> {
        Ok(self.detections.clone())
    }
}

/// `live`, `dead`, `immature` detections in that order
pub fn make_detections(live: usize, dead: usize, immature: usize) -> Vec<Detection> {
    let mut out = Vec::with_capacity(live + dead + immature);
    out.extend((0..live).map(|_| Detection::new(SpermClass::Live, 0.9)));
    out.extend((0..dead).map(|_| Detection::new(SpermClass::Dead, 0.8)));
    out.extend((0..immature).map(|_| Detection::new(SpermClass::Immature, 0.7)));
    out
}

/// Creates a 100x100 red PNG inside `dir`
pub fn create_test_image(dir: &Path) -> PathBuf {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let path = dir.join("sample.png");
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// Config whose output paths all live under a fresh temp directory.
/// Keep the directory alive for the duration of the test.
pub fn create_test_config() -> (AppConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let mut config = AppConfig::default();
    config.output.reports_dir = dir.path().join("reports");
    config.output.results_dir = dir.path().join("results");
    config.output.current_report = dir.path().join("index.html");
    config.model.path = dir.path().join("missing-model.rten");
    (config, dir)
}

pub fn make_patient(name: &str) -> PatientRecord {
    PatientRecord {
        full_name: name.to_string(),
        birth_date: "15.06.1988".to_string(),
        id: "SP-2026/042".to_string(),
        conclusion: "Asthenozoospermia.\nRecommend repeat analysis.".to_string(),
        doctor: "Dr. Rashidova".to_string(),
    }
}

/// Number of files directly inside `dir`, zero if it does not exist
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
