use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use time::OffsetDateTime;

use crate::aggregate::Aggregation;
use crate::error::{Error, Result};
use crate::models::SpermClass;
use crate::report::{display_stamp, file_stamp, write_file};

/// Files written by one "save results" action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResults {
    pub image_path: PathBuf,
    pub data_path: PathBuf,
}

/// Stores the analysed image and a statistics snapshot
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    results_dir: PathBuf,
}

impl ResultsWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn save(
        &self,
        source_image: &Path,
        aggregation: Option<&Aggregation>,
        timestamp: OffsetDateTime,
    ) -> Result<SavedResults> {
        fs::create_dir_all(&self.results_dir).map_err(|e| Error::file_io(&self.results_dir, e))?;
        let stamp = file_stamp(timestamp);
        let data_path = self.results_dir.join(format!("data_{stamp}.txt"));
        let image_path = self.results_dir.join(format!("analysis_{stamp}.jpg"));

        write_file(&data_path, &render_snapshot(aggregation, timestamp))?;
        copy_as_jpeg(source_image, &image_path)?;

        tracing::info!(
            image = %image_path.display(),
            data = %data_path.display(),
            "results saved"
        );

        Ok(SavedResults {
            image_path,
            data_path,
        })
    }
}

/// Plain-text statistics snapshot
pub fn render_snapshot(aggregation: Option<&Aggregation>, timestamp: OffsetDateTime) -> String {
    let mut out = format!(
        "=== ANALYSIS RESULTS ===\nDate: {}\n\n",
        display_stamp(timestamp)
    );
    match aggregation.and_then(Aggregation::result) {
        Some(result) => {
            for class in SpermClass::ALL {
                out.push_str(&format!(
                    "{} sperm: {}%\n",
                    class.label(),
                    result.percentages.get(class)
                ));
            }
        }
        None => out.push_str("No sperm cells detected\n"),
    }
    out
}

/// Byte copy for JPEG sources, re-encode anything else
fn copy_as_jpeg(source: &Path, target: &Path) -> Result<()> {
    let is_jpeg = matches!(ImageFormat::from_path(source), Ok(ImageFormat::Jpeg));
    if is_jpeg {
        fs::copy(source, target).map_err(|e| Error::file_io(target, e))?;
        return Ok(());
    }

    let img = image::open(source).map_err(|e| Error::file_io(source, e))?;
    img.to_rgb8()
        .save_with_format(target, ImageFormat::Jpeg)
        .map_err(|e| Error::file_io(target, e))
}
