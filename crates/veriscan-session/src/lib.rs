// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veriscan-session — Scan disposition tracking for the Veriscan scan engine.
//
// Consumes detection outputs over time and decides, per frame, whether the
// scan attempt is still searching, stable enough to capture, rejected, done,
// or out of time. The state machine is a pure transition function over
// immutable disposition snapshots; the session controller wires it to a
// detection engine and a single-slot camera frame mailbox.

pub mod disposition;
pub mod machine;
pub mod mailbox;
pub mod session;

pub use disposition::{DispositionState, ScanDisposition};
pub use mailbox::{frame_mailbox, FrameReceiver, FrameSender};
pub use session::{CapturedDocument, ScanOutcome, ScanSession};
