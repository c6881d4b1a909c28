use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::{TranscriptionMessage, TranscriptionRunner};

pub const CANCELLED_MESSAGE: &str = "cancelled during shutdown";

/// Drains the upload queue and runs each task on its own tokio task, with at
/// most `max_concurrent_jobs` collaborator calls in flight.
pub struct TranscriptionWorker {
    receiver: mpsc::Receiver<TranscriptionMessage>,
    runner: Arc<TranscriptionRunner>,
    permits: Arc<Semaphore>,
    max_concurrent_jobs: usize,
    cancel: CancellationToken,
}

impl TranscriptionWorker {
    pub fn new(
        receiver: mpsc::Receiver<TranscriptionMessage>,
        runner: Arc<TranscriptionRunner>,
        max_concurrent_jobs: usize,
        cancel: CancellationToken,
    ) -> Self {
        let max_concurrent_jobs = max_concurrent_jobs.max(1);
        Self {
            receiver,
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent_jobs)),
            max_concurrent_jobs,
            cancel,
        }
    }

    /// Runs until the channel closes or the token is cancelled. On
    /// cancellation, queued and in-flight tasks are recorded as failed.
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent_jobs = self.max_concurrent_jobs,
            "Transcription worker started"
        );
        let mut jobs = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Transcription job panicked");
                    }
                }
                msg = self.receiver.recv() => {
                    let Some(msg) = msg else {
                        tracing::info!("Transcription queue closed");
                        break;
                    };

                    let permit = tokio::select! {
                        _ = self.cancel.cancelled() => {
                            self.runner.mark_failed(msg.task_id, CANCELLED_MESSAGE).await;
                            break;
                        }
                        permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                    };

                    let runner = Arc::clone(&self.runner);
                    let cancel = self.cancel.child_token();
                    let span = tracing::info_span!(
                        "transcription_job",
                        task_id = %msg.task_id,
                        video = %msg.video_path,
                    );

                    jobs.spawn(
                        async move {
                            let _permit = permit;
                            let task_id = msg.task_id;
                            tokio::select! {
                                status = runner.run(msg) => {
                                    tracing::debug!(status = %status, "Transcription job finished");
                                }
                                _ = cancel.cancelled() => {
                                    tracing::warn!("Transcription job cancelled");
                                    runner.mark_failed(task_id, CANCELLED_MESSAGE).await;
                                }
                            }
                        }
                        .instrument(span),
                    );
                }
            }
        }

        self.receiver.close();
        while let Some(msg) = self.receiver.recv().await {
            self.runner.mark_failed(msg.task_id, CANCELLED_MESSAGE).await;
        }
        while let Some(joined) = jobs.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Transcription job panicked");
            }
        }

        tracing::info!("Transcription worker stopped");
    }
}
