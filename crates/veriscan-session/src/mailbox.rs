// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-slot frame mailbox between the camera pipeline and the analysis
// loop. Frames arriving while the slot is occupied are dropped, not queued
// — analysis latency must never build a backlog of buffered frames.

use tokio::sync::mpsc;
use tracing::trace;

/// Producer half: offers frames without ever blocking the camera thread.
#[derive(Debug, Clone)]
pub struct FrameSender<T> {
    tx: mpsc::Sender<T>,
}

/// Consumer half: awaits the next admitted frame.
#[derive(Debug)]
pub struct FrameReceiver<T> {
    rx: mpsc::Receiver<T>,
}

/// Create a connected mailbox pair with a single frame slot.
pub fn frame_mailbox<T>() -> (FrameSender<T>, FrameReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (FrameSender { tx }, FrameReceiver { rx })
}

impl<T> FrameSender<T> {
    /// Offer a frame. Returns `false` when the slot is occupied or the
    /// consumer is gone — the frame is simply dropped either way.
    pub fn offer(&self, frame: T) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("frame dropped: analysis busy");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!("frame dropped: session ended");
                false
            }
        }
    }
}

impl<T> FrameReceiver<T> {
    /// Await the next frame. `None` once every sender has been dropped,
    /// i.e. the camera has detached.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop admitting new frames. Already-admitted frames can still be
    /// received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
