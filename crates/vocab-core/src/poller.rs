//! Polling client for the backend's batch word-analysis job.
//!
//! The backend never pushes progress; the poller fetches a snapshot immediately, then keeps
//! fetching on a fixed interval while the job is extracting or analyzing. Each poller owns at
//! most one polling task. Starting again, stopping, cancelling or dropping the poller retires the
//! previous task and silences its stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::InvocationClient;
use crate::envelope::Envelope;
use crate::progress::{BatchAnalysisProgress, BatchStatus};
use crate::services::word_analysis::{CANCEL_COMMAND, GET_PROGRESS_COMMAND};
use crate::transport::Args;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Why a polling session ended unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// The progress request itself failed. Polling does not retry.
    Fetch(String),
    /// The job ran and the backend reported it as failed.
    Job(String),
}

impl std::fmt::Display for PollFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(message) => write!(f, "Failed to fetch analysis progress: {message}"),
            Self::Job(message) => write!(f, "Batch analysis failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Progress(BatchAnalysisProgress),
    Failed(PollFailure),
}

/// Stream of events for one polling session.
///
/// Yields `None` once the session reached a terminal state or was superseded.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<PollEvent>,
    generation: Arc<AtomicU64>,
    session: u64,
}

impl ProgressStream {
    pub async fn next(&mut self) -> Option<PollEvent> {
        if !self.is_current() {
            return None;
        }
        let event = self.rx.recv().await?;
        self.is_current().then_some(event)
    }

    fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.session
    }
}

pub struct BatchProgressPoller {
    client: InvocationClient,
    interval: Duration,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BatchProgressPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProgressPoller")
            .field("interval", &self.interval)
            .field("polling", &self.is_polling())
            .finish()
    }
}

impl BatchProgressPoller {
    pub fn new(client: InvocationClient) -> Self {
        Self {
            client,
            interval: DEFAULT_POLL_INTERVAL,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.interval = interval;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Begin a new polling session, retiring any previous one first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> ProgressStream {
        self.stop();
        let session = self.generation.load(Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(poll_loop(
            self.client.clone(),
            self.interval,
            Arc::clone(&self.generation),
            session,
            tx,
        ));
        self.task = Some(task);
        info!(
            session,
            interval_ms = self.interval.as_millis() as u64,
            "Batch progress polling started"
        );

        ProgressStream {
            rx,
            generation: Arc::clone(&self.generation),
            session,
        }
    }

    /// Whether a polling task is still running.
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Retire the current session. Safe to call when nothing is running.
    pub fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("Batch progress polling stopped");
            }
            task.abort();
        }
    }

    /// Ask the backend to abandon the job and stop polling.
    ///
    /// Local polling is torn down even when the backend call fails; the failure is returned.
    pub async fn cancel(&mut self) -> Envelope<Value> {
        self.stop();
        let outcome = self.client.invoke_raw(CANCEL_COMMAND, Args::new()).await;
        match outcome.error() {
            Some(message) => warn!(error = %message, "Batch analysis cancel request failed"),
            None => info!("Batch analysis cancelled"),
        }
        outcome
    }
}

impl Drop for BatchProgressPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

async fn poll_loop(
    client: InvocationClient,
    interval: Duration,
    generation: Arc<AtomicU64>,
    session: u64,
    tx: mpsc::UnboundedSender<PollEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let envelope = client
            .invoke::<BatchAnalysisProgress>(GET_PROGRESS_COMMAND, Args::new())
            .await;

        if generation.load(Ordering::SeqCst) != session {
            debug!(session, "Discarding progress from a retired polling session");
            return;
        }

        match envelope {
            Envelope::Success(progress) => {
                let status = progress.status;
                let job_error = (status == BatchStatus::Error).then(|| {
                    progress
                        .error_message
                        .clone()
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| "unknown error".to_string())
                });

                if tx.send(PollEvent::Progress(progress)).is_err() {
                    debug!(session, "Progress receiver dropped; polling ends");
                    return;
                }
                if let Some(message) = job_error {
                    let _ = tx.send(PollEvent::Failed(PollFailure::Job(message)));
                    return;
                }
                if !status.is_active() {
                    debug!(session, ?status, "Batch job reached a resting state");
                    return;
                }
            }
            Envelope::Failure(message) => {
                warn!(session, error = %message, "Batch progress request failed");
                let _ = tx.send(PollEvent::Failed(PollFailure::Fetch(message)));
                return;
            }
        }
    }
}
