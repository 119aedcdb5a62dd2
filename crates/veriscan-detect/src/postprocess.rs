// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection post-processing — candidate selection over the model's parallel
// output arrays and mapping of the winning box into source pixel coordinates.

use image::DynamicImage;
use veriscan_core::{BoundingBox, DocumentOption, PixelRect};

use crate::runtime::RawDetections;

/// Sentinel score carried by a failed detection.
pub const INVALID_SCORE: f32 = f32::MIN;

/// The structured result of analysing one frame.
///
/// A below-threshold frame yields [`DetectionOutput::invalid`] — a normal
/// value, not an error — with `option = Invalid` and the sentinel score.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Confidence of the best candidate, in [0, 1] (or [`INVALID_SCORE`]).
    pub score: f32,
    /// Document classification of the best candidate.
    pub option: DocumentOption,
    /// Normalized bounding box relative to the processed image.
    pub bounding_box: BoundingBox,
    /// The same region in source pixel coordinates, clamped to image bounds.
    pub pixel_rect: PixelRect,
    /// Frame region inside `pixel_rect`; `None` when the detection failed.
    pub cropped: Option<DynamicImage>,
    /// Best score per document option, ordered as [`DocumentOption::ALL`].
    pub all_scores: Vec<f32>,
}

impl DetectionOutput {
    /// The "no usable detection this frame" value.
    pub fn invalid() -> Self {
        Self {
            score: INVALID_SCORE,
            option: DocumentOption::Invalid,
            bounding_box: BoundingBox {
                left: 0.0,
                top: 0.0,
                width: 0.0,
                height: 0.0,
            },
            pixel_rect: PixelRect {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
            },
            cropped: None,
            all_scores: vec![0.0; DocumentOption::ALL.len()],
        }
    }

    /// Whether this output carries a usable detection.
    pub fn is_valid(&self) -> bool {
        self.option != DocumentOption::Invalid
    }
}

/// The winning candidate of one selection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the winning slot in the parallel output arrays.
    pub index: usize,
    pub score: f32,
    pub option: DocumentOption,
}

/// Scan all candidate slots and pick the highest score above `threshold`.
///
/// Single forward pass with strict comparison: an exact score tie keeps the
/// earlier index (first-seen wins, no sorting). Returns `None` when no slot
/// clears the threshold or when the winner's class does not map to a valid
/// document option.
pub fn select_candidate(raw: &RawDetections, threshold: f32) -> Option<Candidate> {
    let mut best_score = INVALID_SCORE;
    let mut best_index = 0usize;
    let mut best_option = DocumentOption::Invalid;

    for i in 0..raw.candidate_slots() {
        let score = raw.scores[i];
        if best_score < score && score > threshold {
            best_score = score;
            best_index = i;
            best_option = DocumentOption::from_class_index(raw.classes[i] as i32);
        }
    }

    if best_option == DocumentOption::Invalid {
        return None;
    }
    Some(Candidate {
        index: best_index,
        score: best_score,
        option: best_option,
    })
}

/// Best score seen per document option across all candidate slots, ordered
/// as [`DocumentOption::ALL`]. Diagnostic output — slots whose class never
/// appears stay at 0.0.
pub fn per_option_scores(raw: &RawDetections) -> Vec<f32> {
    let mut scores = vec![0.0f32; DocumentOption::ALL.len()];
    for i in 0..raw.candidate_slots() {
        let option = DocumentOption::from_class_index(raw.classes[i] as i32);
        if let Some(j) = option.score_index() {
            scores[j] = scores[j].max(raw.scores[i]);
        }
    }
    scores
}

/// Map a normalized (xmin, ymin, xmax, ymax) box to pixel coordinates of a
/// `width` x `height` source image.
///
/// The transform deliberately swaps axes — x-coordinates scale by the image
/// *height* and y-coordinates by the *width* — matching the detection
/// model's coordinate convention. Edges are clamped so the rect stays inside
/// the image with at least one pixel of area.
pub fn map_pixel_rect(corners: [f32; 4], width: u32, height: u32) -> PixelRect {
    let x_min = corners[0] * height as f32;
    let y_min = corners[1] * width as f32;
    let x_max = corners[2] * height as f32;
    let y_max = corners[3] * width as f32;

    let left = (y_min as i64).max(1).min(width as i64 - 1) as u32;
    let top = (x_min as i64).max(1).min(height as i64 - 1) as u32;
    let right = (y_max as i64).min(width as i64).max(left as i64 + 1) as u32;
    let bottom = (x_max as i64).min(height as i64).max(top as i64 + 1) as u32;

    PixelRect {
        left,
        top,
        right,
        bottom,
    }
}
