//! An iteration whose state vanishes mid-run is abandoned and logged.
//!
//! Installs a global subscriber, so it lives in its own test binary.

mod common;

use std::io;
use std::sync::{Arc, Mutex};

use common::{eventually, Harness, WORKSPACE};
use sift_core::models::{IterationStatus, ModelStatus};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_errors() -> Captured {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::ERROR)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();
    captured
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn vanished_iteration_is_abandoned_with_a_logged_error() {
    let logs = capture_errors();
    let h = Harness::new();
    h.label_gold(10, 10);
    h.provider.hold_inference();
    h.start();

    eventually("corpus inference held", || {
        h.orchestrator.iteration_status(WORKSPACE, h.category(), 0).ok() == Some(IterationStatus::RunningInference)
    })
    .await;
    let iterations = h.orchestrator.iterations(WORKSPACE, h.category()).unwrap();
    assert_eq!(iterations[0].model.model_status, ModelStatus::Ready);

    // The model is no longer training, so the category can go.
    h.orchestrator.delete_category(WORKSPACE, h.category()).unwrap();
    h.provider.release_inference();

    eventually("iteration abandoned", || h.orchestrator.metrics().iterations_failed == 1).await;
    eventually("recovery failure logged", || logs.contents().contains("could not record iteration failure")).await;
    let logged = logs.contents();
    assert!(logged.contains("workspace=newsroom"), "{logged}");
    assert!(logged.contains("category=sports"), "{logged}");
    assert!(logged.contains("iteration=0"), "{logged}");
    assert!(logged.contains("model_id=fake-0"), "{logged}");
    assert_eq!(h.orchestrator.metrics().iterations_ready, 0);
}
