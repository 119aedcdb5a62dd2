// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan disposition — the decision state of one document/selfie scan attempt.
//
// Dispositions are immutable snapshots: every transition produces a new
// value, so the current disposition can be handed around and compared
// without locking. All behaviour lives in the `machine` module; a
// disposition carries only identity and timing.

use std::time::Instant;

use veriscan_core::ScanType;

/// Decision state of a scan attempt.
///
/// `reached_at` is stamped when a state is *entered* and never re-stamped
/// while the same state persists — every duration comparison in the machine
/// relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionState {
    /// No confident detection yet.
    Start,
    /// A detection of the correct scan type just occurred, not yet stable.
    Detected { reached_at: Instant },
    /// The detection has remained matching for the stability window —
    /// the current frame is a capturable candidate.
    Desired { reached_at: Instant },
    /// The detection mismatched or its score dropped after having matched.
    Undesired { reached_at: Instant },
    /// Terminal: an acceptable capture was obtained.
    Completed,
    /// Terminal: the scan was abandoned, no acceptable capture in time.
    Timeout,
}

impl DispositionState {
    /// Whether this state absorbs all further input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Timeout)
    }

    /// When the current state was entered. `None` for `Start` and the
    /// terminal states, which carry no timer of their own.
    pub fn reached_at(&self) -> Option<Instant> {
        match self {
            Self::Detected { reached_at }
            | Self::Desired { reached_at }
            | Self::Undesired { reached_at } => Some(*reached_at),
            Self::Start | Self::Completed | Self::Timeout => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Detected { .. } => "detected",
            Self::Desired { .. } => "desired",
            Self::Undesired { .. } => "undesired",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
        }
    }
}

/// Disposition snapshot for one scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDisposition {
    /// Which document side or selfie this session is capturing. Fixed for
    /// the life of the session.
    pub scan_type: ScanType,
    pub state: DispositionState,
    /// When the session began — the global timeout budget counts from here.
    pub started_at: Instant,
}

impl ScanDisposition {
    /// Fresh disposition for a new scan session.
    pub fn start(scan_type: ScanType, now: Instant) -> Self {
        Self {
            scan_type,
            state: DispositionState::Start,
            started_at: now,
        }
    }

    /// True only for `Completed` and `Timeout` — derived from state
    /// identity, never separately mutable.
    pub fn terminate(&self) -> bool {
        self.state.is_terminal()
    }

    /// Snapshot with a new state, preserving identity and session start.
    pub(crate) fn with_state(&self, state: DispositionState) -> Self {
        Self {
            scan_type: self.scan_type,
            state,
            started_at: self.started_at,
        }
    }
}
