// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Veriscan.

use thiserror::Error;

/// Top-level error type for all Veriscan operations.
#[derive(Debug, Error)]
pub enum VeriscanError {
    // -- Detection errors --
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    ModelOutput(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Session errors --
    #[error("scan session already ended")]
    SessionEnded,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VeriscanError>;
