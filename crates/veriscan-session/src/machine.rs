// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Disposition transition functions. Pure: given the current disposition, a
// detection output (or just the clock), and a policy, produce the next
// disposition. No hidden state, no side effects — the whole machine can be
// driven by synthetic detection sequences and clocks in tests.

use std::time::Instant;

use tracing::debug;

use veriscan_core::ScanPolicy;
use veriscan_detect::DetectionOutput;

use crate::disposition::{DispositionState, ScanDisposition};

/// Advance a disposition with a new detection output at time `now`.
///
/// The global timeout budget (counted from session start) is checked before
/// any per-state logic, so an exhausted budget wins over match quality from
/// every non-terminal state.
pub fn next(
    current: &ScanDisposition,
    output: &DetectionOutput,
    policy: &ScanPolicy,
    now: Instant,
) -> ScanDisposition {
    if current.terminate() {
        return *current;
    }
    if now.duration_since(current.started_at) >= policy.timeout {
        return timed_out(current);
    }

    let matched = current.scan_type.matches(output.option)
        && output.score > policy.score_threshold;

    let state = match current.state {
        DispositionState::Start => {
            if matched {
                DispositionState::Detected { reached_at: now }
            } else {
                DispositionState::Start
            }
        }
        DispositionState::Detected { reached_at } => {
            if !matched {
                DispositionState::Undesired { reached_at: now }
            } else if now.duration_since(reached_at) >= policy.stability_duration {
                DispositionState::Desired { reached_at: now }
            } else {
                // Repeat matches do not restart the stability timer.
                DispositionState::Detected { reached_at }
            }
        }
        DispositionState::Desired { reached_at } => {
            if matched {
                DispositionState::Desired { reached_at }
            } else {
                // A transient mismatch demotes to Undesired; only the
                // global budget can turn that into Timeout.
                DispositionState::Undesired { reached_at: now }
            }
        }
        DispositionState::Undesired { reached_at } => {
            if matched {
                DispositionState::Detected { reached_at: now }
            } else {
                DispositionState::Undesired { reached_at }
            }
        }
        // Terminals were handled above.
        DispositionState::Completed | DispositionState::Timeout => current.state,
    };

    current.with_state(state)
}

/// Time-only transition: lets a wall-clock timer drive the timeout even
/// when no frames arrive. Everything except the global budget is unchanged.
pub fn tick(current: &ScanDisposition, policy: &ScanPolicy, now: Instant) -> ScanDisposition {
    if current.terminate() {
        return *current;
    }
    if now.duration_since(current.started_at) >= policy.timeout {
        return timed_out(current);
    }
    *current
}

/// Controller-driven acceptance of a capturable frame: `Desired` becomes
/// `Completed`. Any other state is returned unchanged — acceptance is only
/// meaningful once the machine has marked the frame capturable.
pub fn accept(current: &ScanDisposition) -> ScanDisposition {
    match current.state {
        DispositionState::Desired { .. } => current.with_state(DispositionState::Completed),
        _ => *current,
    }
}

fn timed_out(current: &ScanDisposition) -> ScanDisposition {
    debug!(
        scan_type = ?current.scan_type,
        from = current.state.name(),
        "scan budget exhausted"
    );
    current.with_state(DispositionState::Timeout)
}
