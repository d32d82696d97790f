//! Search-as-you-type input settling

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

use super::cancellation::{CancelScope, TaskHandle};

/// Output of the debouncer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// Input stayed unchanged for the full quiet period
    Query(String),
    /// Input was cleared; downstream results reset immediately
    Cleared,
}

/// Delays each query until typing pauses for `quiet`.
///
/// Every keystroke restarts the quiet period and discards the pending value,
/// so rapid typing never produces fetches for intermediate values.
#[derive(Debug)]
pub struct QueryDebouncer {
    input_tx: mpsc::UnboundedSender<String>,
    handle: TaskHandle,
}

impl QueryDebouncer {
    pub fn spawn(quiet: Duration, parent: &CancelScope) -> (Self, mpsc::UnboundedReceiver<Settled>) {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let scope = parent.child();
        let task_scope = scope.clone();

        let handle = TaskHandle::spawn(scope, async move {
            let timer = sleep(quiet);
            tokio::pin!(timer);

            let mut pending: Option<String> = None;

            loop {
                tokio::select! {
                    _ = task_scope.cancelled() => break,
                    next = input_rx.recv() => {
                        let Some(raw) = next else { break };

                        if raw.trim().is_empty() {
                            pending = None;
                            if settled_tx.send(Settled::Cleared).is_err() {
                                break;
                            }
                        } else {
                            pending = Some(raw);
                            timer.as_mut().reset(Instant::now() + quiet);
                        }
                    }
                    _ = timer.as_mut(), if pending.is_some() => {
                        let Some(query) = pending.take() else { continue };
                        let query = query.trim().to_string();

                        tracing::debug!(query = %query, "Query settled");
                        if settled_tx.send(Settled::Query(query)).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { input_tx, handle }, settled_rx)
    }

    /// Feeds the full current input value; call on every keystroke
    pub fn input(&self, raw: impl Into<String>) {
        if self.input_tx.send(raw.into()).is_err() {
            tracing::debug!("Debouncer stopped; input dropped");
        }
    }

    pub fn shutdown(&self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(400);

    #[tokio::test(start_paused = true)]
    async fn test_only_final_value_settles() {
        let root = CancelScope::root();
        let (debouncer, mut settled) = QueryDebouncer::spawn(QUIET, &root);

        for partial in ["I", "In", "Inter", "Interstellar"] {
            debouncer.input(partial);
            sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(
            settled.recv().await,
            Some(Settled::Query("Interstellar".to_string()))
        );

        sleep(QUIET * 3).await;
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_settles_before_quiet_period() {
        let root = CancelScope::root();
        let (debouncer, mut settled) = QueryDebouncer::spawn(QUIET, &root);

        debouncer.input("Dune");
        sleep(QUIET - Duration::from_millis(10)).await;
        assert!(settled.try_recv().is_err());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(settled.try_recv().ok(), Some(Settled::Query("Dune".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_discards_pending_value() {
        let root = CancelScope::root();
        let (debouncer, mut settled) = QueryDebouncer::spawn(QUIET, &root);

        debouncer.input("Breaking");
        sleep(Duration::from_millis(100)).await;
        debouncer.input("");

        assert_eq!(settled.recv().await, Some(Settled::Cleared));
        sleep(QUIET * 2).await;
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retyped_value_settles_again() {
        let root = CancelScope::root();
        let (debouncer, mut settled) = QueryDebouncer::spawn(QUIET, &root);

        debouncer.input("Dune");
        assert_eq!(settled.recv().await, Some(Settled::Query("Dune".to_string())));

        // Editing back to the same value re-arms the cycle
        debouncer.input("Dun");
        debouncer.input("Dune");
        assert_eq!(settled.recv().await, Some(Settled::Query("Dune".to_string())));

        debouncer.input("");
        assert_eq!(settled.recv().await, Some(Settled::Cleared));
        debouncer.input("Dune");
        assert_eq!(settled.recv().await, Some(Settled::Query("Dune".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_parent_stops_debouncer() {
        let root = CancelScope::root();
        let (debouncer, mut settled) = QueryDebouncer::spawn(QUIET, &root);

        debouncer.input("Solaris");
        root.cancel();

        assert_eq!(settled.recv().await, None);
    }
}
