// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration surface for detection and disposition policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, VeriscanError};

/// Tunables for the document detection engine.
///
/// Values mirror the reference model: 320x320 input, per-pixel `(p - mean) / std`
/// normalization into [0, 1), and a 0.70 centre-crop aspect ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum candidate score for a detection to be considered at all.
    pub threshold: f32,
    /// Model input width in pixels.
    pub input_width: u32,
    /// Model input height in pixels.
    pub input_height: u32,
    /// Target width:height ratio for the centre crop applied before resize.
    pub crop_aspect_ratio: f32,
    /// Normalization mean, subtracted from each pixel channel.
    pub normalize_mean: f32,
    /// Normalization divisor applied after mean subtraction.
    pub normalize_std: f32,
    /// Fixed number of candidate slots in the model output tensors.
    pub max_detections: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            input_width: 320,
            input_height: 320,
            crop_aspect_ratio: 0.70,
            normalize_mean: 0.0,
            normalize_std: 255.0,
            max_detections: 10,
        }
    }
}

impl DetectorConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(VeriscanError::InvalidConfig(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(VeriscanError::InvalidConfig(
                "model input dimensions must be positive".into(),
            ));
        }
        if self.crop_aspect_ratio <= 0.0 {
            return Err(VeriscanError::InvalidConfig(format!(
                "crop aspect ratio must be positive, got {}",
                self.crop_aspect_ratio
            )));
        }
        if self.normalize_std == 0.0 {
            return Err(VeriscanError::InvalidConfig(
                "normalization std must be non-zero".into(),
            ));
        }
        if self.max_detections == 0 {
            return Err(VeriscanError::InvalidConfig(
                "max_detections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Disposition policy for one scan type: score gate, debounce, and budget.
///
/// The state machine itself carries no tunables — it reads everything from
/// the policy passed into each transition, so policies can differ per scan
/// type (a passport page may warrant a longer timeout than a card side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPolicy {
    /// Score a detection must exceed to count as matching.
    pub score_threshold: f32,
    /// How long a matching detection must persist before it is capturable.
    pub stability_duration: Duration,
    /// Total budget for the scan attempt, measured from session start.
    pub timeout: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            score_threshold: 0.75,
            stability_duration: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }
}

impl ScanPolicy {
    /// Reject policies that could never complete a scan.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(VeriscanError::InvalidConfig(format!(
                "score threshold must be in [0, 1], got {}",
                self.score_threshold
            )));
        }
        if self.timeout <= self.stability_duration {
            return Err(VeriscanError::InvalidConfig(
                "timeout must exceed the stability duration".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_detector_config_is_valid() {
        DetectorConfig::default().validate().expect("default config");
    }

    #[test]
    fn detector_config_rejects_bad_threshold() {
        let config = DetectorConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn detector_config_rejects_zero_std() {
        let config = DetectorConfig {
            normalize_std: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_scan_policy_is_valid() {
        ScanPolicy::default().validate().expect("default policy");
    }

    #[test]
    fn scan_policy_rejects_timeout_shorter_than_stability() {
        let policy = ScanPolicy {
            stability_duration: Duration::from_secs(20),
            timeout: Duration::from_secs(10),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn scan_policy_round_trips_through_json() {
        let policy = ScanPolicy {
            score_threshold: 0.6,
            stability_duration: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
        };
        let json = serde_json::to_string(&policy).expect("serialize");
        let back: ScanPolicy = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.score_threshold, policy.score_threshold);
        assert_eq!(back.stability_duration, policy.stability_duration);
        assert_eq!(back.timeout, policy.timeout);
    }
}
