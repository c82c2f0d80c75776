use serde::Serialize;

use crate::models::{Detection, SpermClass};

/// One value per cell category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerClass<T> {
    pub live: T,
    pub dead: T,
    pub immature: T,
}

impl<T: Copy> PerClass<T> {
    pub fn get(&self, class: SpermClass) -> T {
        match class {
            SpermClass::Live => self.live,
            SpermClass::Dead => self.dead,
            SpermClass::Immature => self.immature,
        }
    }

    fn get_mut(&mut self, class: SpermClass) -> &mut T {
        match class {
            SpermClass::Live => &mut self.live,
            SpermClass::Dead => &mut self.dead,
            SpermClass::Immature => &mut self.immature,
        }
    }

    pub fn map<U>(&self, f: impl Fn(SpermClass, T) -> U) -> PerClass<U> {
        PerClass {
            live: f(SpermClass::Live, self.live),
            dead: f(SpermClass::Dead, self.dead),
            immature: f(SpermClass::Immature, self.immature),
        }
    }
}

/// Per-class counts and percentage shares for one image.
///
/// `counts` always sums to `total_count`, which is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub total_count: u32,
    pub counts: PerClass<u32>,
    pub percentages: PerClass<u32>,
}

impl AggregateResult {
    /// Build from per-class counts; `None` when every count is zero
    pub fn from_counts(counts: PerClass<u32>) -> Option<Self> {
        let total_count = counts.live + counts.dead + counts.immature;
        if total_count == 0 {
            return None;
        }
        let percentages = counts.map(|_, count| percent(count, total_count));
        Some(Self {
            total_count,
            counts,
            percentages,
        })
    }
}

/// Outcome of aggregating one image's detections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Aggregation {
    /// The model found nothing; percentages are undefined
    NoDetections,
    Counted(AggregateResult),
}

impl Aggregation {
    pub fn result(&self) -> Option<&AggregateResult> {
        match self {
            Aggregation::NoDetections => None,
            Aggregation::Counted(result) => Some(result),
        }
    }
}

/// Count detections by class and compute their shares
pub fn aggregate(detections: &[Detection]) -> Aggregation {
    let mut counts = PerClass::<u32>::default();
    for detection in detections {
        *counts.get_mut(detection.class) += 1;
    }

    match AggregateResult::from_counts(counts) {
        Some(result) => Aggregation::Counted(result),
        None => Aggregation::NoDetections,
    }
}

/// `round(100 * count / total)` with ties going to the even neighbour.
/// Integer arithmetic only, so 12.5 and 37.5 style ties are exact.
pub fn percent(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = 100 * u64::from(count);
    let total = u64::from(total);
    let quotient = scaled / total;
    let twice_remainder = 2 * (scaled % total);

    let rounded = if twice_remainder > total || (twice_remainder == total && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };
    rounded as u32
}
