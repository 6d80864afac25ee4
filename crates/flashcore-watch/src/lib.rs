//! Live indexing progress driven by the backend's `indexing-progress` push
//! channel.
//!
//! Phases move `idle → scanning → indexing → done → idle`. Only the last step
//! is taken by the client itself, after a fixed delay, so a completion
//! indicator stays visible for a moment. A backend that reports `idle` when a
//! run ends still gets the `done` phase first.

use std::sync::Arc;
use std::time::Duration;

use flashcore_index::{IndexStatus, ProgressEvent};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(5);

/// Point-in-time view of indexing progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: IndexStatus,
    pub total: u64,
    pub processed: u64,
    pub current_file: String,
    pub files_per_second: Option<f64>,
    pub eta_seconds: Option<u64>,
    pub current_folder: Option<String>,
}

impl ProgressSnapshot {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.processed as f32 / self.total as f32).clamp(0.0, 1.0)
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, IndexStatus::Scanning | IndexStatus::Indexing)
    }

    fn absorb(&mut self, event: ProgressEvent) {
        self.total = event.total;
        self.processed = event.processed;
        self.current_file = event.current_file;
        self.files_per_second = event.files_per_second;
        self.eta_seconds = event.eta_seconds;
        self.current_folder = event.current_folder;
    }
}

struct TrackerState {
    snapshot: ProgressSnapshot,
    reset_ticket: u64,
    reset_task: Option<JoinHandle<()>>,
}

impl TrackerState {
    fn cancel_reset(&mut self) {
        self.reset_ticket += 1;
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

/// Cloneable handle; all clones share one state.
#[derive(Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<TrackerState>>,
    updates: watch::Sender<ProgressSnapshot>,
    reset_delay: Duration,
    runtime: Option<Handle>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_DELAY)
    }
}

impl ProgressTracker {
    /// Remembers the current runtime, if any, so reset timers can be armed
    /// from threads outside it.
    pub fn new(reset_delay: Duration) -> Self {
        let (updates, _) = watch::channel(ProgressSnapshot::default());
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                snapshot: ProgressSnapshot::default(),
                reset_ticket: 0,
                reset_task: None,
            })),
            updates,
            reset_delay,
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().snapshot.clone()
    }

    pub fn phase(&self) -> IndexStatus {
        self.state.lock().snapshot.phase
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.updates.subscribe()
    }

    /// Applies one push event. A `done` event, or `idle` ending a run, arms
    /// the reset timer; an `idle` while already done leaves the timer alone.
    pub fn apply(&self, event: ProgressEvent) {
        let mut state = self.state.lock();
        let previous = state.snapshot.phase;
        let incoming = event.status;

        let (next, arm) = match (previous, incoming) {
            // counters only, the phase never regresses mid-run
            (IndexStatus::Indexing, IndexStatus::Scanning) => (IndexStatus::Indexing, false),
            (IndexStatus::Scanning | IndexStatus::Indexing, IndexStatus::Idle) => {
                (IndexStatus::Done, true)
            }
            (IndexStatus::Done, IndexStatus::Idle) => (IndexStatus::Done, false),
            (IndexStatus::Done, IndexStatus::Scanning | IndexStatus::Indexing) => {
                state.cancel_reset();
                (incoming, false)
            }
            (_, IndexStatus::Done) => (IndexStatus::Done, true),
            (_, status) => (status, false),
        };

        state.snapshot.absorb(event);
        state.snapshot.phase = next;

        if arm {
            state.cancel_reset();
            let ticket = state.reset_ticket;
            state.reset_task = self.spawn_reset(ticket);
        }

        let snapshot = state.snapshot.clone();
        drop(state);

        if previous != next {
            tracing::debug!(from = previous.label(), to = next.label(), "progress_transition");
        }
        self.updates.send_replace(snapshot);
    }

    /// Consumes a push channel until it closes.
    pub fn follow(&self, mut events: mpsc::Receiver<ProgressEvent>) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                tracker.apply(event);
            }
            tracing::debug!("progress_channel_closed");
        })
    }

    fn spawn_reset(&self, ticket: u64) -> Option<JoinHandle<()>> {
        let Some(runtime) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            tracing::warn!("progress_reset_without_runtime");
            return None;
        };

        let tracker = self.clone();
        let delay = self.reset_delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = tracker.state.lock();
            if state.reset_ticket != ticket || state.snapshot.phase != IndexStatus::Done {
                return;
            }
            state.snapshot = ProgressSnapshot::default();
            state.reset_task = None;
            drop(state);
            tracing::debug!(from = "done", to = "idle", "progress_transition");
            tracker.publish_current();
        });
        Some(task)
    }

    fn publish_current(&self) {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: IndexStatus, processed: u64, total: u64) -> ProgressEvent {
        ProgressEvent::new(status, processed, total)
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_ends_idle_after_delay() {
        let tracker = ProgressTracker::default();
        tracker.apply(event(IndexStatus::Scanning, 0, 0));
        tracker.apply(event(IndexStatus::Indexing, 5, 10));
        tracker.apply(event(IndexStatus::Done, 10, 10));
        assert_eq!(tracker.phase(), IndexStatus::Done);

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(tracker.phase(), IndexStatus::Done);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(tracker.phase(), IndexStatus::Idle);
        assert_eq!(tracker.snapshot().processed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scanning_during_indexing_only_updates_counters() {
        let tracker = ProgressTracker::default();
        tracker.apply(event(IndexStatus::Indexing, 1, 10));
        tracker.apply(event(IndexStatus::Scanning, 3, 10));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.phase, IndexStatus::Indexing);
        assert_eq!(snapshot.processed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn new_run_while_done_cancels_reset() {
        let tracker = ProgressTracker::new(Duration::from_secs(5));
        tracker.apply(event(IndexStatus::Done, 4, 4));
        tokio::time::sleep(Duration::from_secs(3)).await;

        tracker.apply(event(IndexStatus::Scanning, 0, 0));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(tracker.phase(), IndexStatus::Scanning);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_done_rearms_timer() {
        let tracker = ProgressTracker::new(Duration::from_secs(5));
        tracker.apply(event(IndexStatus::Done, 1, 1));
        tokio::time::sleep(Duration::from_secs(4)).await;
        tracker.apply(event(IndexStatus::Done, 2, 2));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(tracker.phase(), IndexStatus::Done);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(tracker.phase(), IndexStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn follow_consumes_channel_and_publishes() {
        let tracker = ProgressTracker::default();
        let mut updates = tracker.subscribe();
        let (tx, rx) = mpsc::channel(8);
        let task = tracker.follow(rx);

        let mut payload = event(IndexStatus::Indexing, 2, 8);
        payload.current_file = "C:/docs/a.pdf".into();
        tx.send(payload).await.unwrap();
        drop(tx);
        task.await.unwrap();

        updates.changed().await.unwrap();
        let seen = updates.borrow().clone();
        assert_eq!(seen.phase, IndexStatus::Indexing);
        assert_eq!(seen.current_file, "C:/docs/a.pdf");
        assert!((seen.fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_while_done_keeps_done_until_the_delay() {
        let tracker = ProgressTracker::new(Duration::from_secs(5));
        tracker.apply(event(IndexStatus::Indexing, 9, 10));
        tracker.apply(event(IndexStatus::Done, 10, 10));
        tokio::time::sleep(Duration::from_secs(1)).await;

        tracker.apply(event(IndexStatus::Idle, 10, 10));
        assert_eq!(tracker.phase(), IndexStatus::Done);
        assert_eq!(tracker.snapshot().processed, 10);

        tokio::time::sleep(Duration::from_millis(3_900)).await;
        assert_eq!(tracker.phase(), IndexStatus::Done);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(tracker.phase(), IndexStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn scanner_status_lines_end_in_done_then_idle() {
        let tracker = ProgressTracker::new(Duration::from_secs(5));
        let lines = [
            r#"{"total":0,"processed":0,"current_file":"a.txt","status":"Scanning filenames..."}"#,
            r#"{"total":3,"processed":3,"current_file":"Scan complete","status":"Filenames indexed"}"#,
            r#"{"total":3,"processed":1,"current_file":"a.txt","status":"Indexing contents..."}"#,
            r#"{"total":3,"processed":3,"current_file":"","status":"Idle"}"#,
        ];

        let mut phases = Vec::new();
        for line in lines {
            tracker.apply(ProgressEvent::from_json(line).unwrap());
            phases.push(tracker.phase());
        }
        assert_eq!(
            phases,
            vec![
                IndexStatus::Scanning,
                IndexStatus::Scanning,
                IndexStatus::Indexing,
                IndexStatus::Done,
            ]
        );
        assert_eq!(tracker.snapshot().processed, 3);

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(tracker.phase(), IndexStatus::Idle);
    }

    #[test]
    fn done_outside_a_runtime_does_not_panic() {
        let tracker = ProgressTracker::default();
        tracker.apply(event(IndexStatus::Done, 1, 1));
        assert_eq!(tracker.phase(), IndexStatus::Done);
    }

    #[test]
    fn reset_runs_on_the_runtime_the_tracker_was_built_in() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let tracker = {
            let _guard = runtime.enter();
            ProgressTracker::new(Duration::from_secs(5))
        };

        tracker.apply(event(IndexStatus::Done, 2, 2));
        assert_eq!(tracker.phase(), IndexStatus::Done);

        runtime.block_on(async { tokio::time::sleep(Duration::from_secs(6)).await });
        assert_eq!(tracker.phase(), IndexStatus::Idle);
    }

    #[test]
    fn fraction_handles_zero_total() {
        assert_eq!(ProgressSnapshot::default().fraction(), 0.0);
    }
}
