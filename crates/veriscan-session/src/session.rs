// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session controller — the thin coordinator that feeds admitted frames
// to the detection engine, drives the disposition machine, and reacts to
// terminal states. Navigation, uploads, and UI stay outside; the session
// only emits disposition snapshots and the final outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use image::DynamicImage;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use veriscan_core::error::{Result, VeriscanError};
use veriscan_core::{ScanPolicy, ScanType, SessionId};
use veriscan_detect::DocumentEngine;

use crate::disposition::{DispositionState, ScanDisposition};
use crate::machine;
use crate::mailbox::FrameReceiver;

/// How often the session checks the timeout budget between frames, so a
/// stalled camera still terminates the scan.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// An accepted capture, ready to hand to an upload collaborator.
#[derive(Debug, Clone)]
pub struct CapturedDocument {
    pub session: SessionId,
    pub scan_type: ScanType,
    /// Detection confidence of the accepted frame.
    pub score: f32,
    /// The cropped candidate region of the accepted frame.
    pub image: DynamicImage,
    pub captured_at: DateTime<Utc>,
}

/// How a scan session ended.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// An acceptable capture was obtained.
    Completed(CapturedDocument),
    /// The timeout budget ran out before any frame stabilized.
    TimedOut,
}

/// One active scan attempt for a single document side or selfie.
///
/// The session is the exclusive owner of its current disposition; the run
/// loop is the only writer, which is what lets the machine stay lock-free.
pub struct ScanSession {
    id: SessionId,
    scan_type: ScanType,
    engine: Arc<DocumentEngine>,
    policy: ScanPolicy,
    created_at: DateTime<Utc>,
    disposition: ScanDisposition,
    updates: watch::Sender<ScanDisposition>,
}

impl ScanSession {
    /// Begin a scan session for the given scan type.
    pub fn new(
        scan_type: ScanType,
        engine: Arc<DocumentEngine>,
        policy: ScanPolicy,
    ) -> Result<Self> {
        policy.validate()?;
        let disposition = ScanDisposition::start(scan_type, Instant::now());
        let (updates, _) = watch::channel(disposition);
        Ok(Self {
            id: SessionId::new(),
            scan_type,
            engine,
            policy,
            created_at: Utc::now(),
            disposition,
            updates,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current disposition snapshot.
    pub fn disposition(&self) -> ScanDisposition {
        self.disposition
    }

    /// Subscribe to disposition changes (for overlays/status indicators).
    pub fn subscribe(&self) -> watch::Receiver<ScanDisposition> {
        self.updates.subscribe()
    }

    fn apply(&mut self, next: ScanDisposition) {
        if next.state != self.disposition.state {
            debug!(
                session = %self.id,
                from = self.disposition.state.name(),
                to = next.state.name(),
                "disposition changed"
            );
        }
        self.disposition = next;
        // Receivers are optional; a send failure just means nobody watches.
        let _ = self.updates.send(next);
    }

    /// Drive the session to a terminal state.
    ///
    /// Consumes frames from the mailbox one at a time — at most one
    /// `analyze` call is ever in flight, and frames offered meanwhile are
    /// dropped by the mailbox. Between frames, a periodic tick enforces the
    /// timeout budget even if the camera stalls. Returns the terminal
    /// outcome, or `SessionEnded` if the camera detaches first.
    #[instrument(skip_all, fields(session = %self.id, scan_type = ?self.scan_type))]
    pub async fn run(mut self, mut frames: FrameReceiver<DynamicImage>) -> Result<ScanOutcome> {
        info!("scan session started");
        loop {
            let frame = tokio::select! {
                frame = frames.recv() => frame,
                _ = tokio::time::sleep(TICK_INTERVAL) => {
                    let ticked = machine::tick(&self.disposition, &self.policy, Instant::now());
                    self.apply(ticked);
                    if self.disposition.terminate() {
                        info!("scan timed out waiting for frames");
                        return Ok(ScanOutcome::TimedOut);
                    }
                    continue;
                }
            };
            let Some(frame) = frame else {
                info!("camera detached; session ended");
                return Err(VeriscanError::SessionEnded);
            };

            let engine = Arc::clone(&self.engine);
            let output = tokio::task::spawn_blocking(move || engine.analyze(&frame))
                .await
                .map_err(|err| VeriscanError::Inference(format!("analysis task: {err}")))??;

            let next = machine::next(&self.disposition, &output, &self.policy, Instant::now());
            self.apply(next);

            if let DispositionState::Desired { .. } = self.disposition.state {
                // The frame is capturable: accept it and finish.
                if let Some(image) = output.cropped {
                    self.apply(machine::accept(&self.disposition));
                    info!(score = output.score, "capture accepted");
                    return Ok(ScanOutcome::Completed(CapturedDocument {
                        session: self.id,
                        scan_type: self.scan_type,
                        score: output.score,
                        image,
                        captured_at: Utc::now(),
                    }));
                }
            }

            if self.disposition.terminate() {
                info!("scan timed out");
                return Ok(ScanOutcome::TimedOut);
            }
        }
    }
}
