//! History-writer worker consuming the persistence work queue.
//!
//! The tick loop and the control handlers enqueue [`PersistCommand`]s
//! without waiting; this worker consumes them in order on its own task
//! and maps them onto store calls. Every failure is logged and
//! discarded -- persistence is best-effort and must never feed back into
//! the live delivery path. Because there is a single consumer, a
//! session-end command is always applied after every sample enqueued
//! before it.

use physim_types::PersistCommand;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::sample_store::SampleStore;
use crate::session_store::SessionStore;
use crate::sqlite::HistoryPool;

/// Capacity of the persistence work queue.
///
/// When the store stalls long enough to fill the queue, further commands
/// are dropped at the sending side with a warning; durable history may
/// then understate what was broadcast.
pub const PERSIST_QUEUE_CAPACITY: usize = 256;

/// Create the persistence work queue with the standard capacity.
pub fn persist_channel() -> (
    mpsc::Sender<PersistCommand>,
    mpsc::Receiver<PersistCommand>,
) {
    mpsc::channel(PERSIST_QUEUE_CAPACITY)
}

/// Spawn the history writer on a background task.
///
/// The worker runs until every sender half of the queue has been
/// dropped, then drains the remaining commands and exits. The caller
/// should await the returned handle during shutdown so the final
/// session-end write lands before the pool closes.
pub fn spawn_history_writer(
    pool: HistoryPool,
    mut commands: mpsc::Receiver<PersistCommand>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("history writer started");
        while let Some(command) = commands.recv().await {
            apply(&pool, command).await;
        }
        info!("history writer stopped");
    })
}

/// Apply one command to the store, logging and discarding any failure.
async fn apply(pool: &HistoryPool, command: PersistCommand) {
    match command {
        PersistCommand::SessionStarted {
            session_id,
            started_at,
        } => {
            if let Err(err) = SessionStore::new(pool.pool())
                .create_session(session_id, started_at)
                .await
            {
                warn!(session = %session_id, error = %err, "failed to create session record");
            }
        }
        PersistCommand::Sample { session_id, sample } => {
            let iteration = sample.iteration_number;
            if let Err(err) = SampleStore::new(pool.pool())
                .insert_sample(session_id, &sample)
                .await
            {
                warn!(
                    session = %session_id,
                    iteration,
                    error = %err,
                    "failed to persist sample"
                );
            }
        }
        PersistCommand::SessionEnded {
            session_id,
            stopped_at,
            iteration_count,
        } => {
            if let Err(err) = SessionStore::new(pool.pool())
                .end_session(session_id, stopped_at, iteration_count)
                .await
            {
                warn!(session = %session_id, error = %err, "failed to end session record");
            }
        }
    }
}
