use serde::{Deserialize, Serialize};

/// The three cell categories the detector is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpermClass {
    Live,
    Dead,
    Immature,
}

impl SpermClass {
    pub const ALL: [SpermClass; 3] = [SpermClass::Live, SpermClass::Dead, SpermClass::Immature];

    /// Map a model class index (0 = live, 1 = dead, 2 = immature)
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(SpermClass::Live),
            1 => Some(SpermClass::Dead),
            2 => Some(SpermClass::Immature),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SpermClass::Live => 0,
            SpermClass::Dead => 1,
            SpermClass::Immature => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpermClass::Live => "Live",
            SpermClass::Dead => "Dead",
            SpermClass::Immature => "Immature",
        }
    }
}

impl std::fmt::Display for SpermClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis-aligned box in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union, 0.0 for degenerate boxes
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Clamp to the image rectangle
    pub fn clamp(self, width: f32, height: f32) -> Self {
        Self {
            x1: self.x1.clamp(0.0, width),
            y1: self.y1.clamp(0.0, height),
            x2: self.x2.clamp(0.0, width),
            y2: self.y2.clamp(0.0, height),
        }
    }
}

/// One object found by the detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class: SpermClass,
    pub confidence: f32,
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(class: SpermClass, confidence: f32) -> Self {
        Self {
            class,
            confidence,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Operator-entered metadata attached to a report. Fields are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    pub full_name: String,
    /// Expected as DD.MM.YYYY, not checked
    pub birth_date: String,
    pub id: String,
    pub conclusion: String,
    pub doctor: String,
}
