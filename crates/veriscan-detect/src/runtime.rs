// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inference runtime contract. The engine depends only on this interface;
// a real model executor plugs in behind it (see `rten_model` when the
// `rten` feature is enabled), and tests substitute canned tensors.

use veriscan_core::error::Result;

/// A preprocessed image ready for inference: NHWC float data with an
/// implicit batch dimension of 1.
#[derive(Debug, Clone)]
pub struct ImageTensor {
    /// Row-major pixel data, `height * width * channels` values.
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
    pub channels: usize,
}

impl ImageTensor {
    /// Number of values expected for the declared dimensions.
    pub fn expected_len(&self) -> usize {
        self.height as usize * self.width as usize * self.channels
    }
}

/// Raw model output for one frame: four parallel fixed-length arrays.
///
/// Shapes follow the detection model contract: `scores` and `classes` hold
/// one entry per candidate slot, `boxes` holds four normalized corner
/// coordinates (xmin, ymin, xmax, ymax) per slot, and `count` is the model's
/// reported detection count (unused beyond array sizing).
#[derive(Debug, Clone, Default)]
pub struct RawDetections {
    pub scores: Vec<f32>,
    pub boxes: Vec<f32>,
    pub classes: Vec<f32>,
    pub count: f32,
}

impl RawDetections {
    /// Number of complete candidate slots actually present across the three
    /// parallel arrays. Guards against a runtime returning short tensors.
    pub fn candidate_slots(&self) -> usize {
        self.scores
            .len()
            .min(self.classes.len())
            .min(self.boxes.len() / 4)
    }
}

/// Executes the detection model on a preprocessed image.
///
/// Implementations must be cheap to call repeatedly — model loading happens
/// at construction time, and a corrupt or incompatible model is a
/// construction-time error, never a per-call one.
pub trait InferenceRuntime: Send + Sync {
    /// Run inference, producing the model's four output arrays.
    fn run(&self, input: &ImageTensor) -> Result<RawDetections>;

    /// Number of candidate slots the model emits per frame.
    fn max_detections(&self) -> usize;
}
