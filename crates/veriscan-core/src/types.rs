// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Veriscan scan engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document classification produced by the detection model for one candidate.
///
/// `Invalid` is the "no usable detection" value — it is a normal result, not
/// an error, and never matches any [`ScanType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOption {
    DlBack,
    DlFront,
    IdBack,
    IdFront,
    Passport,
    Invalid,
}

impl DocumentOption {
    /// All valid options, in the order used for per-option score vectors.
    pub const ALL: [DocumentOption; 5] = [
        Self::DlBack,
        Self::DlFront,
        Self::IdBack,
        Self::IdFront,
        Self::Passport,
    ];

    /// Map a raw model class index to a document option.
    ///
    /// The detection model emits: 0 = passport, 1 = driving licence back,
    /// 2 = driving licence front, 3 = ID card back, 4 = ID card front.
    /// Anything else (including the -1 sentinel) is `Invalid`.
    pub fn from_class_index(index: i32) -> Self {
        match index {
            0 => Self::Passport,
            1 => Self::DlBack,
            2 => Self::DlFront,
            3 => Self::IdBack,
            4 => Self::IdFront,
            _ => Self::Invalid,
        }
    }

    /// Position of this option within [`DocumentOption::ALL`], if valid.
    pub fn score_index(&self) -> Option<usize> {
        Self::ALL.iter().position(|o| o == self)
    }
}

/// Which document side (or selfie) a scan session is trying to capture.
///
/// Fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanType {
    DlBack,
    DlFront,
    IdBack,
    IdFront,
    Passport,
    Selfie,
}

impl ScanType {
    /// Whether this scan targets the front of a document.
    pub fn is_front(&self) -> bool {
        matches!(self, Self::DlFront | Self::IdFront | Self::Passport)
    }

    /// Whether this scan targets the back of a document.
    pub fn is_back(&self) -> bool {
        matches!(self, Self::DlBack | Self::IdBack)
    }

    /// Whether a detected document option satisfies this scan type.
    ///
    /// `Invalid` never matches, and `Selfie` is never satisfied by the
    /// document model — selfie frames are qualified by a separate face
    /// engine outside this crate.
    pub fn matches(&self, option: DocumentOption) -> bool {
        match self {
            Self::DlBack => option == DocumentOption::DlBack,
            Self::DlFront => option == DocumentOption::DlFront,
            Self::IdBack => option == DocumentOption::IdBack,
            Self::IdFront => option == DocumentOption::IdFront,
            Self::Passport => option == DocumentOption::Passport,
            Self::Selfie => false,
        }
    }
}

/// Normalized bounding box in [0, 1] coordinates relative to the processed
/// (cropped) image: `left`/`top` are the minimum corner, not the centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build from model corner coordinates (xmin, ymin, xmax, ymax).
    pub fn from_corners(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            left: xmin,
            top: ymin,
            width: xmax - xmin,
            height: ymax - ymin,
        }
    }
}

/// Axis-aligned rectangle in source-image pixel coordinates.
///
/// Edges are clamped to the image bounds on construction, so a rect derived
/// from a valid detection always has positive area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Whether the rect lies within a `width` x `height` image and encloses
    /// at least one pixel.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && self.right <= width
            && self.bottom <= height
    }
}
