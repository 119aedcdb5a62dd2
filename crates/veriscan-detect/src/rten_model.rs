// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `rten`-backed inference runtime. Only available when the `rten` feature is
// enabled.
//
// The detection model takes a [1, H, W, 3] float image and emits four
// outputs, mapped by index: 0 = per-candidate document-type scores, 1 =
// bounding boxes (xmin, ymin, xmax, ymax per candidate), 2 = detection
// count, 3 = predicted class indices.
//
// # Performance
//
// `rten` must be compiled in release mode — debug builds are drastically
// slower, which on a live camera feed means dropped frames.

use std::path::Path;

use rten::{Model, NodeId};
use rten_tensor::prelude::*;
use rten_tensor::Tensor;
use tracing::{info, instrument};

use veriscan_core::error::{Result, VeriscanError};

use crate::runtime::{ImageTensor, InferenceRuntime, RawDetections};

/// Output tensor indices in the detection model's output list.
const OUTPUT_SCORES: usize = 0;
const OUTPUT_BOXES: usize = 1;
const OUTPUT_COUNT: usize = 2;
const OUTPUT_CLASSES: usize = 3;

/// Inference runtime backed by a loaded `rten` model.
pub struct RtenRuntime {
    model: Model,
    max_detections: usize,
}

impl RtenRuntime {
    /// Load a detection model from a `.rten` file.
    ///
    /// A missing, corrupt, or incompatible model fails here — construction
    /// is the only place model errors can surface.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_file(path: impl AsRef<Path>, max_detections: usize) -> Result<Self> {
        let model = Model::load_file(path.as_ref()).map_err(|err| {
            VeriscanError::ModelLoad(format!(
                "failed to load detection model from {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!("detection model loaded");
        Ok(Self {
            model,
            max_detections,
        })
    }

    /// Load a detection model from in-memory bytes.
    pub fn load_bytes(data: Vec<u8>, max_detections: usize) -> Result<Self> {
        let model = Model::load(data).map_err(|err| {
            VeriscanError::ModelLoad(format!("failed to load detection model: {}", err))
        })?;
        Ok(Self {
            model,
            max_detections,
        })
    }

    fn input_id(&self) -> Result<NodeId> {
        self.model
            .input_ids()
            .first()
            .copied()
            .ok_or_else(|| VeriscanError::ModelOutput("model declares no inputs".into()))
    }
}

/// Flatten one model output into a plain float vector.
fn to_floats(value: rten::Value, what: &str) -> Result<Vec<f32>> {
    let tensor: Tensor<f32> = value
        .try_into()
        .map_err(|_| VeriscanError::ModelOutput(format!("{what} output is not float")))?;
    Ok(tensor.iter().copied().collect())
}

impl InferenceRuntime for RtenRuntime {
    fn run(&self, input: &ImageTensor) -> Result<RawDetections> {
        let shape = [
            1,
            input.height as usize,
            input.width as usize,
            input.channels,
        ];
        let tensor = Tensor::from_data(&shape[..], input.data.clone());

        let input_id = self.input_id()?;
        let output_ids: Vec<NodeId> = self.model.output_ids().to_vec();
        if output_ids.len() <= OUTPUT_CLASSES {
            return Err(VeriscanError::ModelOutput(format!(
                "expected 4 model outputs, found {}",
                output_ids.len()
            )));
        }

        let mut outputs = self
            .model
            .run(vec![(input_id, tensor.into())], &output_ids, None)
            .map_err(|err| VeriscanError::Inference(err.to_string()))?;

        // Drain back-to-front so the earlier indices stay valid.
        let classes = to_floats(outputs.remove(OUTPUT_CLASSES), "classes")?;
        let count = to_floats(outputs.remove(OUTPUT_COUNT), "count")?
            .first()
            .copied()
            .unwrap_or(0.0);
        let boxes = to_floats(outputs.remove(OUTPUT_BOXES), "boxes")?;
        let scores = to_floats(outputs.remove(OUTPUT_SCORES), "scores")?;

        Ok(RawDetections {
            scores,
            boxes,
            classes,
            count,
        })
    }

    fn max_detections(&self) -> usize {
        self.max_detections
    }
}
