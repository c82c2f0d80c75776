pub mod decode;
pub mod preprocessing;
pub mod yolo;

use std::path::Path;

use crate::error::InferenceError;
use crate::models::Detection;

pub use yolo::YoloDetector;

/// Runs the detection model on one image.
///
/// An empty vector means nothing was found, which is not an error.
pub trait Detector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, InferenceError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, InferenceError> {
        (**self).detect(image_path)
    }
}
