//! Product factors: map normalized measure values to a [0, 1] utility.
//!
//! The utility curve is a three-point piecewise linear function over the
//! calibrated thresholds `[low, mid, high]`:
//!
//! ```text
//! value <= low          -> 0
//! low < value < mid     -> 0.0 .. 0.5 (linear)
//! mid <= value < high   -> 0.5 .. 1.0 (linear)
//! value >= high         -> 1
//! ```
//!
//! For `HigherIsWorse` factors the curve is mirrored (`1 - u`).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether larger normalized values indicate better or worse quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    HigherIsWorse,
}

/// Three ascending calibration points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Thresholds {
    low: f64,
    mid: f64,
    high: f64,
}

impl Thresholds {
    pub fn new(low: f64, mid: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && mid.is_finite() && high.is_finite()) {
            return Err(Error::config(format!(
                "thresholds must be finite, got [{low}, {mid}, {high}]"
            )));
        }
        if low > mid || mid > high {
            return Err(Error::config(format!(
                "thresholds must be ascending, got [{low}, {mid}, {high}]"
            )));
        }
        Ok(Self { low, mid, high })
    }

    /// Thresholds spanning a benchmark bound, with `mid` at the midpoint.
    pub fn from_bounds(low: f64, high: f64) -> Result<Self> {
        Self::new(low, (low + high) / 2.0, high)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.low, self.mid, self.high]
    }

    /// Utility on the higher-is-better curve.
    fn ascending_utility(&self, value: f64) -> f64 {
        if value <= self.low {
            0.0
        } else if value < self.mid {
            0.5 * (value - self.low) / (self.mid - self.low)
        } else if value < self.high {
            0.5 + 0.5 * (value - self.mid) / (self.high - self.mid)
        } else {
            1.0
        }
    }

    pub fn utility(&self, value: f64, polarity: Polarity) -> f64 {
        let u = self.ascending_utility(value);
        match polarity {
            Polarity::HigherIsBetter => u,
            Polarity::HigherIsWorse => 1.0 - u,
        }
    }
}

impl TryFrom<Vec<f64>> for Thresholds {
    type Error = Error;

    fn try_from(v: Vec<f64>) -> Result<Self> {
        match v.as_slice() {
            [low, mid, high] => Self::new(*low, *mid, *high),
            _ => Err(Error::config(format!(
                "threshold vector must have exactly 3 entries, got {}",
                v.len()
            ))),
        }
    }
}

impl From<Thresholds> for Vec<f64> {
    fn from(t: Thresholds) -> Self {
        t.as_array().to_vec()
    }
}

/// How a factor with several measures combines them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Threshold each measure, then take the arithmetic mean.
    #[default]
    MeanOfUtilities,
    /// Threshold each measure, keep the worst utility.
    MinOfUtilities,
    /// Threshold each measure, keep the best utility.
    MaxOfUtilities,
    /// Average the normalized values, then threshold once.
    UtilityOfMean,
}

impl Combinator {
    pub fn combine(&self, values: &[f64], thresholds: &Thresholds, polarity: Polarity) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let utilities = || values.iter().map(|v| thresholds.utility(*v, polarity));
        match self {
            Self::MeanOfUtilities => utilities().sum::<f64>() / values.len() as f64,
            Self::MinOfUtilities => utilities().fold(f64::INFINITY, f64::min),
            Self::MaxOfUtilities => utilities().fold(f64::NEG_INFINITY, f64::max),
            Self::UtilityOfMean => {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                thresholds.utility(mean, polarity)
            }
        }
    }
}

/// Tree node converting one or more measures into a utility score.
#[derive(Debug, Clone)]
pub struct ProductFactor {
    pub name: String,
    pub description: String,
    pub polarity: Polarity,
    pub combinator: Combinator,
    pub thresholds: Option<Thresholds>,
    measures: BTreeSet<String>,
}

impl ProductFactor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            polarity,
            combinator: Combinator::default(),
            thresholds: None,
            measures: BTreeSet::new(),
        }
    }

    pub fn with_measure(mut self, name: impl Into<String>) -> Self {
        self.measures.insert(name.into());
        self
    }

    #[cfg(test)]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = combinator;
        self
    }

    pub fn measures(&self) -> impl Iterator<Item = &str> {
        self.measures.iter().map(String::as_str)
    }

    /// First measure name in order; used as the structural fingerprint.
    pub fn representative_measure(&self) -> Option<&str> {
        self.measures.first().map(String::as_str)
    }

    /// Utility from already-normalized measure values.
    pub fn utility(&self, measure_values: &[f64]) -> Result<f64> {
        let thresholds = self
            .thresholds
            .as_ref()
            .ok_or_else(|| Error::MissingCalibration {
                nodes: vec![self.name.clone()],
            })?;
        if measure_values.is_empty() {
            return Err(Error::evaluation(&self.name, "product factor has no measures"));
        }
        Ok(self
            .combinator
            .combine(measure_values, thresholds, self.polarity))
    }
}

/// Same name and same representative measure.
impl PartialEq for ProductFactor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.representative_measure() == other.representative_measure()
    }
}

#[cfg(test)]
#[path = "factor_test.rs"]
mod tests;
