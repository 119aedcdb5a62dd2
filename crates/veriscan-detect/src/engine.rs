// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document detection engine — orchestrates preprocessing, inference, and
// post-processing for one frame at a time. Stateless across calls.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, instrument};

use veriscan_core::error::Result;
use veriscan_core::{BoundingBox, DetectorConfig};

use crate::monitor::{ModelPerformanceMonitor, Phase};
use crate::postprocess::{self, DetectionOutput};
use crate::preprocess;
use crate::runtime::InferenceRuntime;

/// Turns a camera frame into a single best-candidate detection.
///
/// Pure function of (frame, model, threshold): the engine holds no state
/// between calls, so one instance can serve a whole scan session. Exactly
/// one `analyze` call should be in flight per session — the call is
/// CPU-bound and synchronous, and belongs off the frame-producing thread.
pub struct DocumentEngine {
    runtime: Arc<dyn InferenceRuntime>,
    config: DetectorConfig,
    monitor: Arc<dyn ModelPerformanceMonitor>,
}

impl DocumentEngine {
    /// Build an engine around a loaded inference runtime.
    ///
    /// Model-load failures surface from the runtime's own constructor before
    /// this point; an invalid configuration is rejected here. Neither is
    /// ever retried per frame.
    pub fn new(
        runtime: Arc<dyn InferenceRuntime>,
        config: DetectorConfig,
        monitor: Arc<dyn ModelPerformanceMonitor>,
    ) -> Result<Self> {
        config.validate()?;
        if runtime.max_detections() != config.max_detections {
            return Err(veriscan_core::VeriscanError::InvalidConfig(format!(
                "runtime emits {} candidate slots, config expects {}",
                runtime.max_detections(),
                config.max_detections
            )));
        }
        Ok(Self {
            runtime,
            config,
            monitor,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Analyse one frame.
    ///
    /// Returns `Ok` with [`DetectionOutput::invalid`] when no candidate
    /// clears the threshold — callers must treat that as "no usable
    /// detection this frame", not an error. `Err` is reserved for inference
    /// runtime faults.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn analyze(&self, frame: &DynamicImage) -> Result<DetectionOutput> {
        let pre_start = Instant::now();
        let cropped = preprocess::center_crop_to_ratio(frame, self.config.crop_aspect_ratio);
        let tensor = preprocess::to_input_tensor(&cropped, &self.config);
        self.monitor.record(
            Phase::PreProcessing,
            pre_start.elapsed(),
            &format!("width: {}; height: {}", tensor.width, tensor.height),
        );

        let inference_start = Instant::now();
        let raw = self.runtime.run(&tensor)?;
        self.monitor
            .record(Phase::Inference, inference_start.elapsed(), "");

        let Some(winner) = postprocess::select_candidate(&raw, self.config.threshold) else {
            debug!("no candidate above threshold");
            return Ok(DetectionOutput::invalid());
        };

        let b = &raw.boxes[winner.index * 4..winner.index * 4 + 4];
        let corners = [b[0], b[1], b[2], b[3]];
        let bounding_box =
            BoundingBox::from_corners(corners[0], corners[1], corners[2], corners[3]);
        let pixel_rect =
            postprocess::map_pixel_rect(corners, cropped.width(), cropped.height());

        let candidate_image = cropped.crop_imm(
            pixel_rect.left,
            pixel_rect.top,
            pixel_rect.width(),
            pixel_rect.height(),
        );

        debug!(
            score = winner.score,
            option = ?winner.option,
            rect = ?pixel_rect,
            "frame analysed"
        );

        Ok(DetectionOutput {
            score: winner.score,
            option: winner.option,
            bounding_box,
            pixel_rect,
            cropped: Some(candidate_image),
            all_scores: postprocess::per_option_scores(&raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NoopMonitor;
    use crate::runtime::{ImageTensor, RawDetections};
    use image::{Rgb, RgbImage};
    use veriscan_core::DocumentOption;

    /// Runtime double that returns the same canned detections every frame.
    struct FixedRuntime {
        raw: RawDetections,
    }

    impl InferenceRuntime for FixedRuntime {
        fn run(&self, input: &ImageTensor) -> Result<RawDetections> {
            assert_eq!(input.data.len(), input.expected_len());
            Ok(self.raw.clone())
        }

        fn max_detections(&self) -> usize {
            self.raw.scores.len()
        }
    }

    fn frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 150])))
    }

    fn engine_with(raw: RawDetections) -> DocumentEngine {
        DocumentEngine::new(
            Arc::new(FixedRuntime { raw }),
            DetectorConfig::default(),
            Arc::new(NoopMonitor),
        )
        .expect("engine")
    }

    fn empty_detections() -> RawDetections {
        RawDetections {
            scores: vec![0.05; 10],
            boxes: vec![0.1; 40],
            classes: vec![0.0; 10],
            count: 10.0,
        }
    }

    fn single_detection(score: f32, class: f32, corners: [f32; 4]) -> RawDetections {
        let mut raw = empty_detections();
        raw.scores[3] = score;
        raw.classes[3] = class;
        raw.boxes[12..16].copy_from_slice(&corners);
        raw
    }

    #[test]
    fn below_threshold_frame_is_invalid_not_error() {
        let engine = engine_with(empty_detections());
        let output = engine.analyze(&frame(480, 640)).expect("analyze");
        assert!(!output.is_valid());
        assert_eq!(output.option, DocumentOption::Invalid);
    }

    #[test]
    fn qualifying_detection_produces_consistent_output() {
        let engine = engine_with(single_detection(0.9, 4.0, [0.1, 0.2, 0.5, 0.8]));
        let output = engine.analyze(&frame(480, 640)).expect("analyze");

        assert!(output.is_valid());
        assert_eq!(output.option, DocumentOption::IdFront);
        assert_eq!(output.score, 0.9);
        // all_scores entry for the winning option matches the score.
        let j = output.option.score_index().expect("valid option");
        assert_eq!(output.all_scores[j], 0.9);
    }

    #[test]
    fn pixel_rect_stays_within_cropped_frame() {
        let engine = engine_with(single_detection(0.9, 0.0, [-0.5, -0.5, 1.5, 1.5]));
        let output = engine.analyze(&frame(480, 640)).expect("analyze");

        // 480x640 at ratio 0.70 centre-crops to 448x640.
        assert!(output.pixel_rect.is_within(448, 640));
        let cropped = output.cropped.expect("cropped image");
        assert_eq!(cropped.width(), output.pixel_rect.width());
        assert_eq!(cropped.height(), output.pixel_rect.height());
    }

    #[test]
    fn cropped_candidate_has_positive_area() {
        let engine = engine_with(single_detection(0.8, 2.0, [0.4, 0.4, 0.401, 0.401]));
        let output = engine.analyze(&frame(480, 640)).expect("analyze");
        let cropped = output.cropped.expect("cropped image");
        assert!(cropped.width() >= 1);
        assert!(cropped.height() >= 1);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = DetectorConfig {
            threshold: 2.0,
            ..Default::default()
        };
        let result = DocumentEngine::new(
            Arc::new(FixedRuntime {
                raw: empty_detections(),
            }),
            config,
            Arc::new(NoopMonitor),
        );
        assert!(result.is_err());
    }
}
