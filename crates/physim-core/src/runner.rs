//! The long-lived tick loop driving sample generation, fan-out, and
//! fire-and-forget persistence.
//!
//! Once per configured interval the loop asks the clock for a sample,
//! pushes it into every current subscriber's outbound queue, and hands
//! the same sample to the persistence work queue without waiting on it.
//! The sleep interval is read *after* production, so a configuration
//! update takes effect starting with the next sleep. A full or closed
//! persistence queue costs a logged warning and the dropped command --
//! never the broadcast and never the loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use physim_types::{PersistCommand, StreamEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::SimulationClock;
use crate::registry::SubscriberRegistry;
use crate::shutdown::ShutdownToken;

/// Run the tick loop until the shutdown token is cancelled.
///
/// On entry the clock is started and the new session's durable record is
/// enqueued best-effort. On cancellation the clock is stopped and a
/// session-end command carrying the final iteration count is enqueued,
/// also best-effort; the single-consumer queue applies it after every
/// sample enqueued before it.
pub async fn run_stream_loop(
    clock: Arc<SimulationClock>,
    registry: Arc<SubscriberRegistry>,
    persist: mpsc::Sender<PersistCommand>,
    shutdown: Arc<ShutdownToken>,
) {
    let entry_session = clock.start();
    info!(session = %entry_session, "stream loop starting");
    enqueue(
        &persist,
        PersistCommand::SessionStarted {
            session_id: entry_session,
            started_at: Utc::now(),
        },
    );

    while !shutdown.is_cancelled() {
        // The session can change underneath the loop (an operator may
        // stop and restart via the API); samples are attributed to the
        // session whose iteration numbers they carry.
        if let Some(session_id) = clock.current_session_id() {
            if let Some(sample) = clock.generate_sample() {
                let delivered = registry.broadcast(&StreamEvent::SampleReceived {
                    sample: sample.clone(),
                });
                debug!(
                    iteration = sample.iteration_number,
                    delivered, "broadcast sample"
                );
                enqueue(&persist, PersistCommand::Sample { session_id, sample });
            }
        }

        // Read the interval after production so a config update applies
        // to the very next sleep.
        let interval = clock.update_interval_ms();
        tokio::select! {
            () = shutdown.cancelled() => break,
            () = tokio::time::sleep(Duration::from_millis(interval)) => {}
        }
    }

    let final_iterations = clock.current_iteration();
    let session_id = clock.stop().unwrap_or(entry_session);
    enqueue(
        &persist,
        PersistCommand::SessionEnded {
            session_id,
            stopped_at: Utc::now(),
            iteration_count: final_iterations,
        },
    );
    info!(
        session = %session_id,
        iterations = final_iterations,
        "stream loop stopped"
    );
}

/// Enqueue a persistence command without waiting.
///
/// A rejected command is logged and discarded: durable history may lag
/// or lose samples under pressure, but live delivery never pays for it.
fn enqueue(persist: &mpsc::Sender<PersistCommand>, command: PersistCommand) {
    if let Err(err) = persist.try_send(command) {
        warn!(error = %err, "history queue rejected command, dropping");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use physim_types::SimulationConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn fast_clock() -> Arc<SimulationClock> {
        let config = SimulationConfig {
            update_interval_ms: 5,
            ..SimulationConfig::default()
        };
        Arc::new(SimulationClock::with_rng(config, StdRng::seed_from_u64(3)))
    }

    async fn run_briefly(
        clock: Arc<SimulationClock>,
    ) -> (Vec<PersistCommand>, Arc<SubscriberRegistry>) {
        let registry = Arc::new(SubscriberRegistry::new());
        let (tx, mut rx) = mpsc::channel(256);
        let shutdown = Arc::new(ShutdownToken::new());

        let handle = tokio::spawn(run_stream_loop(
            clock,
            Arc::clone(&registry),
            tx,
            Arc::clone(&shutdown),
        ));

        tokio::time::sleep(Duration::from_millis(40)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        (commands, registry)
    }

    #[tokio::test]
    async fn loop_creates_samples_and_ends_session_with_final_count() {
        let clock = fast_clock();
        let (commands, _registry) = run_briefly(Arc::clone(&clock)).await;

        let session_id = match commands.first() {
            Some(PersistCommand::SessionStarted { session_id, .. }) => *session_id,
            other => panic!("first command must create the session, got {other:?}"),
        };

        let sample_count = commands
            .iter()
            .filter(|c| matches!(c, PersistCommand::Sample { .. }))
            .count() as u64;
        assert!(sample_count >= 1, "expected at least one tick");

        let (ended_id, iteration_count) = match commands.last() {
            Some(PersistCommand::SessionEnded {
                session_id,
                iteration_count,
                ..
            }) => (*session_id, *iteration_count),
            other => panic!("last command must end the session, got {other:?}"),
        };
        assert_eq!(ended_id, session_id);
        assert_eq!(iteration_count, sample_count);
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn samples_carry_strictly_increasing_iterations() {
        let clock = fast_clock();
        let (commands, _registry) = run_briefly(clock).await;

        let iterations: Vec<u64> = commands
            .iter()
            .filter_map(|c| match c {
                PersistCommand::Sample { sample, .. } => Some(sample.iteration_number),
                _ => None,
            })
            .collect();
        for (offset, iteration) in iterations.iter().enumerate() {
            assert_eq!(*iteration, (offset as u64).saturating_add(1));
        }
    }

    #[tokio::test]
    async fn cancel_during_sleep_exits_promptly() {
        // A long interval must not delay shutdown: cancellation is
        // observed inside the sleep.
        let config = SimulationConfig {
            update_interval_ms: 60_000,
            ..SimulationConfig::default()
        };
        let clock = Arc::new(SimulationClock::with_rng(
            config,
            StdRng::seed_from_u64(5),
        ));
        let registry = Arc::new(SubscriberRegistry::new());
        let (tx, _rx) = mpsc::channel(16);
        let shutdown = Arc::new(ShutdownToken::new());

        let handle = tokio::spawn(run_stream_loop(
            clock,
            registry,
            tx,
            Arc::clone(&shutdown),
        ));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_millis(500), handle).await;
        assert!(result.is_ok(), "loop did not observe cancellation in-sleep");
    }

    #[tokio::test]
    async fn subscribers_receive_broadcast_samples() {
        let clock = fast_clock();
        let registry = Arc::new(SubscriberRegistry::new());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let _ = registry.register(event_tx);

        let (tx, _rx) = mpsc::channel(256);
        let shutdown = Arc::new(ShutdownToken::new());
        let handle = tokio::spawn(run_stream_loop(
            clock,
            Arc::clone(&registry),
            tx,
            Arc::clone(&shutdown),
        ));

        tokio::time::sleep(Duration::from_millis(40)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let mut received = 0;
        while let Ok(event) = event_rx.try_recv() {
            assert!(matches!(event, StreamEvent::SampleReceived { .. }));
            received += 1;
        }
        assert!(received >= 1, "subscriber saw no samples");
    }

    #[tokio::test]
    async fn closed_queue_does_not_stop_the_loop() {
        let clock = fast_clock();
        let registry = Arc::new(SubscriberRegistry::new());
        let (tx, rx) = mpsc::channel(256);
        drop(rx);
        let shutdown = Arc::new(ShutdownToken::new());

        let handle = tokio::spawn(run_stream_loop(
            Arc::clone(&clock),
            registry,
            tx,
            Arc::clone(&shutdown),
        ));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(clock.current_iteration() >= 1, "loop stalled on dead queue");
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
