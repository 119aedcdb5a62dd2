// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame preprocessing — centre crop to the model's aspect ratio, bilinear
// resize to the model input resolution, and mean/std normalization into a
// flat float tensor.

use image::DynamicImage;
use tracing::debug;

use veriscan_core::DetectorConfig;

use crate::runtime::ImageTensor;

/// Largest centred sub-rectangle of `frame` with the target width:height
/// ratio. A frame already at the target ratio is returned whole.
pub fn center_crop_to_ratio(frame: &DynamicImage, ratio: f32) -> DynamicImage {
    let (w, h) = (frame.width(), frame.height());

    // Fit by width first; fall back to fitting by height for wide frames.
    let mut crop_w = (h as f32 * ratio).round() as u32;
    let mut crop_h = h;
    if crop_w > w {
        crop_w = w;
        crop_h = (w as f32 / ratio).round() as u32;
    }
    let crop_w = crop_w.clamp(1, w);
    let crop_h = crop_h.clamp(1, h);

    let x = (w - crop_w) / 2;
    let y = (h - crop_h) / 2;

    debug!(crop_w, crop_h, x, y, "centre crop");
    frame.crop_imm(x, y, crop_w, crop_h)
}

/// Resize to the model input resolution and normalize each channel with
/// `(value - mean) / std`, producing an NHWC tensor (batch of 1 implied).
///
/// Bilinear filtering matches the reference preprocessing pipeline
/// (`FilterType::Triangle` in the `image` crate).
pub fn to_input_tensor(image: &DynamicImage, config: &DetectorConfig) -> ImageTensor {
    let resized = image.resize_exact(
        config.input_width,
        config.input_height,
        image::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();

    let mut data = Vec::with_capacity(
        config.input_width as usize * config.input_height as usize * 3,
    );
    for pixel in rgb.pixels() {
        for channel in pixel.0 {
            data.push((channel as f32 - config.normalize_mean) / config.normalize_std);
        }
    }

    ImageTensor {
        data,
        width: config.input_width,
        height: config.input_height,
        channels: 3,
    }
}
