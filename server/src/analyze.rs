//! Simulated image analysis behind `POST /analyze`.
//!
//! No model runs here: the analyzer fails a configurable share of requests
//! with a fixed error code and otherwise returns a random class and
//! confidence. The `Analyzer` trait lets tests pin the outcome.

use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "success";
pub const FAILURE_MESSAGE: &str = "Error:E50012";
pub const DEFAULT_FAILURE_RATE: f64 = 0.2;
pub const CLASS_RANGE: RangeInclusive<i64> = 1..=5;
pub const CONFIDENCE_MIN: f64 = 0.7;
pub const CONFIDENCE_MAX: f64 = 0.99;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedData {
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub success: bool,
    pub message: String,
    pub estimated_data: EstimatedData,
}

impl Analysis {
    pub fn succeeded(class: i64, confidence: f64) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            estimated_data: EstimatedData {
                class: Some(class),
                confidence: Some(confidence),
            },
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            message: FAILURE_MESSAGE.to_string(),
            estimated_data: EstimatedData::default(),
        }
    }
}

pub trait Analyzer: Send + Sync {
    fn analyze(&self, image_path: &str) -> Analysis;
}

/// Random analyzer. The rng sits behind a mutex that is only held for the
/// few draws of one call.
pub struct SimulatedAnalyzer {
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedAnalyzer {
    pub fn new(failure_rate: f64) -> Self {
        Self::with_rng(failure_rate, StdRng::from_os_rng())
    }

    pub fn seeded(failure_rate: f64, seed: u64) -> Self {
        Self::with_rng(failure_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(failure_rate: f64, rng: StdRng) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }
}

impl Analyzer for SimulatedAnalyzer {
    fn analyze(&self, _image_path: &str) -> Analysis {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.random::<f64>() < self.failure_rate {
            return Analysis::failed();
        }
        let class = rng.random_range(CLASS_RANGE);
        let confidence = rng.random_range(CONFIDENCE_MIN..CONFIDENCE_MAX);
        Analysis::succeeded(class, round4(confidence))
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
