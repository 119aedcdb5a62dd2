// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end scan flow: synthetic camera frames through the detection
// engine and disposition machine to a terminal outcome, with a canned
// inference runtime standing in for the real model.

use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};

use veriscan_core::error::{Result, VeriscanError};
use veriscan_core::{DetectorConfig, ScanPolicy, ScanType};
use veriscan_detect::{
    DocumentEngine, ImageTensor, InferenceRuntime, NoopMonitor, RawDetections,
};
use veriscan_session::{frame_mailbox, ScanOutcome, ScanSession};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Runtime double that emits the same detections for every frame.
struct FixedRuntime {
    raw: RawDetections,
}

impl InferenceRuntime for FixedRuntime {
    fn run(&self, _input: &ImageTensor) -> Result<RawDetections> {
        Ok(self.raw.clone())
    }

    fn max_detections(&self) -> usize {
        self.raw.scores.len()
    }
}

/// Ten empty candidate slots.
fn no_detections() -> RawDetections {
    RawDetections {
        scores: vec![0.05; 10],
        boxes: vec![0.1; 40],
        classes: vec![0.0; 10],
        count: 10.0,
    }
}

/// One strong ID-card-front candidate in slot 0 (model class 4).
fn id_front_detections() -> RawDetections {
    let mut raw = no_detections();
    raw.scores[0] = 0.9;
    raw.classes[0] = 4.0;
    raw.boxes[0..4].copy_from_slice(&[0.2, 0.2, 0.8, 0.8]);
    raw
}

fn engine_with(raw: RawDetections) -> Arc<DocumentEngine> {
    Arc::new(
        DocumentEngine::new(
            Arc::new(FixedRuntime { raw }),
            DetectorConfig::default(),
            Arc::new(NoopMonitor),
        )
        .expect("engine"),
    )
}

fn camera_frame() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(480, 640, Rgb([100, 110, 120])))
}

fn fast_policy() -> ScanPolicy {
    ScanPolicy {
        score_threshold: 0.6,
        stability_duration: Duration::from_millis(80),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn steady_detections_complete_the_scan() {
    init_tracing();

    let engine = engine_with(id_front_detections());
    let session = ScanSession::new(ScanType::IdFront, engine, fast_policy()).expect("session");
    let session_id = session.id();

    let (tx, rx) = frame_mailbox();
    let producer = tokio::spawn(async move {
        loop {
            tx.offer(camera_frame());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let outcome = session.run(rx).await.expect("run");
    producer.abort();

    match outcome {
        ScanOutcome::Completed(capture) => {
            assert_eq!(capture.session, session_id);
            assert_eq!(capture.scan_type, ScanType::IdFront);
            assert_eq!(capture.score, 0.9);
            assert!(capture.image.width() >= 1);
            assert!(capture.image.height() >= 1);
        }
        ScanOutcome::TimedOut => panic!("steady detections must not time out"),
    }
}

#[tokio::test]
async fn frames_without_detections_run_out_the_budget() {
    init_tracing();

    let engine = engine_with(no_detections());
    let policy = ScanPolicy {
        timeout: Duration::from_millis(300),
        stability_duration: Duration::from_millis(80),
        score_threshold: 0.6,
    };
    let session = ScanSession::new(ScanType::IdFront, engine, policy).expect("session");

    let (tx, rx) = frame_mailbox();
    let producer = tokio::spawn(async move {
        loop {
            tx.offer(camera_frame());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let outcome = session.run(rx).await.expect("run");
    producer.abort();

    assert!(matches!(outcome, ScanOutcome::TimedOut));
}

#[tokio::test]
async fn stalled_camera_still_times_out() {
    init_tracing();

    let engine = engine_with(id_front_detections());
    let policy = ScanPolicy {
        timeout: Duration::from_millis(300),
        stability_duration: Duration::from_millis(80),
        score_threshold: 0.6,
    };
    let session = ScanSession::new(ScanType::IdFront, engine, policy).expect("session");

    // Keep the sender alive but never offer a frame: only the periodic
    // tick can terminate the session.
    let (tx, rx) = frame_mailbox::<DynamicImage>();
    let outcome = session.run(rx).await.expect("run");
    drop(tx);

    assert!(matches!(outcome, ScanOutcome::TimedOut));
}

#[tokio::test]
async fn detached_camera_ends_the_session() {
    init_tracing();

    let engine = engine_with(id_front_detections());
    let session = ScanSession::new(ScanType::IdFront, engine, fast_policy()).expect("session");

    let (tx, rx) = frame_mailbox::<DynamicImage>();
    drop(tx);

    let result = session.run(rx).await;
    assert!(matches!(result, Err(VeriscanError::SessionEnded)));
}

#[tokio::test]
async fn wrong_document_side_never_completes() {
    init_tracing();

    // Model keeps seeing an ID front while the session wants the back.
    let engine = engine_with(id_front_detections());
    let policy = ScanPolicy {
        timeout: Duration::from_millis(300),
        stability_duration: Duration::from_millis(80),
        score_threshold: 0.6,
    };
    let session = ScanSession::new(ScanType::IdBack, engine, policy).expect("session");

    let (tx, rx) = frame_mailbox();
    let producer = tokio::spawn(async move {
        loop {
            tx.offer(camera_frame());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let outcome = session.run(rx).await.expect("run");
    producer.abort();

    assert!(matches!(outcome, ScanOutcome::TimedOut));
}

#[tokio::test]
async fn disposition_updates_are_observable() {
    init_tracing();

    let engine = engine_with(id_front_detections());
    let session = ScanSession::new(ScanType::IdFront, engine, fast_policy()).expect("session");
    let mut updates = session.subscribe();

    let (tx, rx) = frame_mailbox();
    let producer = tokio::spawn(async move {
        loop {
            tx.offer(camera_frame());
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    let outcome = session.run(rx).await.expect("run");
    producer.abort();

    assert!(matches!(outcome, ScanOutcome::Completed(_)));
    // The last published snapshot is the terminal one.
    let last = *updates.borrow_and_update();
    assert!(last.terminate());
}
