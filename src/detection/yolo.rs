use std::path::Path;

use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;

use crate::config::ModelConfig;
use crate::detection::Detector;
use crate::detection::decode::{DecodeParams, decode_predictions};
use crate::detection::preprocessing::{letterbox, to_chw};
use crate::error::{InferenceError, ModelLoadError};
use crate::models::Detection;

/// YOLOv8 detector exported for the rten runtime
pub struct YoloDetector {
    model: Model,
    input_size: u32,
    params: DecodeParams,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_size", &self.input_size)
            .field("params", &self.params)
            .finish()
    }
}

impl YoloDetector {
    /// Load the model named in `config`
    pub fn load(config: &ModelConfig) -> Result<Self, ModelLoadError> {
        if !config.path.exists() {
            return Err(ModelLoadError::NotFound(config.path.clone()));
        }
        if config.input_size == 0 {
            return Err(ModelLoadError::Load {
                path: config.path.clone(),
                reason: "input_size must be greater than zero".to_string(),
            });
        }

        let model = Model::load_file(&config.path).map_err(|e| ModelLoadError::Load {
            path: config.path.clone(),
            reason: e.to_string(),
        })?;

        if model.input_ids().len() != 1 || model.output_ids().is_empty() {
            return Err(ModelLoadError::Load {
                path: config.path.clone(),
                reason: format!(
                    "expected one input and at least one output, found {} and {}",
                    model.input_ids().len(),
                    model.output_ids().len()
                ),
            });
        }

        tracing::info!(path = %config.path.display(), input_size = config.input_size, "detection model loaded");

        Ok(Self {
            model,
            input_size: config.input_size,
            params: DecodeParams {
                confidence_threshold: config.confidence_threshold,
                iou_threshold: config.iou_threshold,
                max_detections: config.max_detections,
            },
        })
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>, InferenceError> {
        let img = image::open(image_path).map_err(|source| InferenceError::ImageRead {
            path: image_path.to_path_buf(),
            source,
        })?;
        tracing::debug!(width = img.width(), height = img.height(), "image decoded");

        let size = self.input_size as usize;
        let (canvas, lb) = letterbox(&img, self.input_size);
        let input = NdTensor::from_data([1, 3, size, size], to_chw(&canvas));

        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;
        let output = NdTensor::<f32, 3>::try_from(output)
            .map_err(|e| InferenceError::UnexpectedOutput(e.to_string()))?;

        let [batch, rows, anchors] = output.shape();
        if batch != 1 {
            return Err(InferenceError::UnexpectedOutput(format!(
                "expected batch size 1, got {batch}"
            )));
        }
        tracing::debug!(rows, anchors, "model output received");

        let detections = decode_predictions(&output.to_vec(), rows, anchors, &lb, &self.params)?;
        tracing::debug!(count = detections.len(), "detections after suppression");
        Ok(detections)
    }
}
