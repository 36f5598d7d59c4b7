//! Model warm-up and readiness tracking.
//!
//! Hosted models are often cold and answer the first requests with errors
//! while they load. A warm-up call with a fixed paragraph both triggers the
//! load and tells us whether the endpoint works. The outcome is kept in
//! [`Readiness`], which `/summarize` consults before spending an article
//! fetch on a model that cannot answer yet.

use crate::inference::{InferenceError, InferenceOutcome};
use crate::server::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

pub const DEFAULT_WARMUP_DELAY: Duration = Duration::from_secs(5);

/// Long enough to clear the inference client's minimum-length check.
pub const WARMUP_TEXT: &str = "The city opened a new public library on Monday. \
    Officials said the building will offer free classes, study rooms and a large \
    collection of books for readers of all ages.";

/// Whether the inference endpoint has answered successfully.
///
/// Concurrent writers are harmless: the latest probe wins.
#[derive(Debug, Default)]
pub struct Readiness {
    ready: AtomicBool,
}

impl Readiness {
    pub fn new(ready: bool) -> Self {
        Self {
            ready: AtomicBool::new(ready),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

/// Send the warm-up paragraph through the inference client and record the
/// result in the readiness flag.
#[instrument(level = "info", skip_all)]
pub async fn warm_up(state: &AppState) -> Result<String, InferenceError> {
    match state.inference.summarize(WARMUP_TEXT).await {
        InferenceOutcome::Summary(summary) => {
            state.readiness.set(true);
            info!("Model warm-up succeeded; accepting summarize requests");
            Ok(summary)
        }
        InferenceOutcome::Failed(failure) => {
            state.readiness.set(false);
            error!(error = %failure.error, "Model warm-up failed");
            Err(failure.error)
        }
    }
}

/// Warm the model once, `delay` after startup.
pub fn spawn_startup_probe(state: AppState, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        info!(?delay, "Running startup warm-up");
        // Failures are already logged and reflected in the flag.
        let _ = warm_up(&state).await;
    })
}
