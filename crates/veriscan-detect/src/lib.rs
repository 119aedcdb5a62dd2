// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veriscan-detect — Document detection for the Veriscan scan engine.
//
// Turns a camera frame into a single best-candidate detection: a document-type
// classification, a confidence score, a bounding region, and a cropped image.
// Preprocessing (centre crop, resize, normalization) and candidate selection
// live here; the inference runtime itself sits behind the `InferenceRuntime`
// trait, with an optional `rten`-backed implementation behind the `rten`
// feature gate.

pub mod engine;
pub mod monitor;
pub mod postprocess;
pub mod preprocess;
pub mod runtime;

#[cfg(feature = "rten")]
pub mod rten_model;

pub use engine::DocumentEngine;
pub use monitor::{ModelPerformanceMonitor, NoopMonitor, Phase, TracingMonitor};
pub use postprocess::DetectionOutput;
pub use runtime::{ImageTensor, InferenceRuntime, RawDetections};

#[cfg(feature = "rten")]
pub use rten_model::RtenRuntime;
