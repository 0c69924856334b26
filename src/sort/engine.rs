/// Visual selection sort
///
/// `SortEngine::request_sort` spawns a worker task on the sort runtime. The
/// worker walks the store one comparison at a time, sleeping between steps so
/// the UI can show each one, and sends `SortUpdate`s back over a channel.
/// Only one run may be active per store, across all engines that share it.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use super::event::{SortUpdate, StepEvent};
use crate::config::SortConfig;
use crate::error::{ConcurrentSortError, IndexError};
use crate::state::data::SortKey;
use crate::state::store::{RecordStore, SortClaim};

/// Lifecycle of the engine's most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortRunState {
    pub active: bool,
    pub current_pass: usize,
    pub current_min_index: usize,
    pub compare_index: usize,
}

/// Starts visual sorts over a shared store, one at a time
pub struct SortEngine {
    store: Arc<RecordStore>,
    config: SortConfig,
    runtime: Handle,
    phase: Arc<Mutex<SortPhase>>,
}

impl SortEngine {
    /// `runtime` is where workers are spawned; it must not be the thread that renders.
    pub fn new(store: Arc<RecordStore>, config: SortConfig, runtime: Handle) -> Self {
        Self {
            store,
            config,
            runtime,
            phase: Arc::new(Mutex::new(SortPhase::Idle)),
        }
    }

    pub fn phase(&self) -> SortPhase {
        *self.phase.lock()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == SortPhase::Running
    }

    /// Start sorting the store by `key`.
    ///
    /// Fails without side effects if a run is already in progress on the store,
    /// whether this engine or another one started it.
    pub fn request_sort(&self, key: SortKey) -> Result<SortHandle, ConcurrentSortError> {
        let Some(claim) = self.store.try_claim_sort() else {
            log::warn!("Rejected sort by {}: another sort is running", key);
            return Err(ConcurrentSortError);
        };
        *self.phase.lock() = SortPhase::Running;

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let progress = Arc::new(Mutex::new(SortRunState {
            active: true,
            ..SortRunState::default()
        }));

        let worker = SortWorker {
            store: Arc::clone(&self.store),
            claim: Some(claim),
            key,
            compare_delay: self.config.compare_delay(),
            swap_delay: self.config.swap_delay(),
            token: token.clone(),
            updates: updates_tx,
            phase: Arc::clone(&self.phase),
            progress: Arc::clone(&progress),
        };

        log::info!("🔀 Sorting {} books by {}", self.store.len(), key);
        self.runtime.spawn(worker.run());

        Ok(SortHandle {
            key,
            token,
            progress,
            updates: Some(updates_rx),
        })
    }
}

/// Control over one sort run
#[derive(Debug)]
pub struct SortHandle {
    key: SortKey,
    token: CancellationToken,
    progress: Arc<Mutex<SortRunState>>,
    updates: Option<UnboundedReceiver<SortUpdate>>,
}

impl SortHandle {
    pub fn key(&self) -> SortKey {
        self.key
    }

    /// Ask the run to stop. Takes effect at the worker's next pause.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            log::info!("⏹️  Cancelling sort by {}", self.key);
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn progress(&self) -> SortRunState {
        *self.progress.lock()
    }

    /// The run's update stream. Can only be taken once; the channel closes after the terminal event.
    pub fn take_updates(&mut self) -> Option<UnboundedReceiver<SortUpdate>> {
        self.updates.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    Cancelled,
}

struct SortWorker {
    store: Arc<RecordStore>,
    /// Held for the whole run
    claim: Option<SortClaim>,
    key: SortKey,
    compare_delay: Duration,
    swap_delay: Duration,
    token: CancellationToken,
    updates: UnboundedSender<SortUpdate>,
    phase: Arc<Mutex<SortPhase>>,
    progress: Arc<Mutex<SortRunState>>,
}

impl SortWorker {
    async fn run(mut self) {
        let outcome = match self.run_passes().await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Sort by {} aborted: {}", self.key, e);
                RunOutcome::Cancelled
            }
        };

        self.emit(SortUpdate::StoreChanged(self.store.snapshot()));

        let (phase, terminal) = match outcome {
            RunOutcome::Completed => (SortPhase::Completed, StepEvent::SortComplete { key: self.key }),
            RunOutcome::Cancelled => (SortPhase::Cancelled, StepEvent::Cancelled),
        };

        // Leave Running before the terminal event so the receiver can start a new sort right away
        self.progress.lock().active = false;
        *self.phase.lock() = phase;
        drop(self.claim.take());

        match outcome {
            RunOutcome::Completed => log::info!("✅ Books sorted by {}", self.key),
            RunOutcome::Cancelled => log::info!("Sort by {} stopped", self.key),
        }
        self.step(terminal);
    }

    /// Selection sort, ascending. On ties the earliest index stays the minimum.
    async fn run_passes(&self) -> Result<RunOutcome, IndexError> {
        if self.token.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        let n = self.store.len();
        for i in 0..n.saturating_sub(1) {
            let mut min_index = i;
            self.track(|run| {
                run.current_pass = i;
                run.current_min_index = i;
            });
            self.step(StepEvent::PassStart { pass: i });

            for j in (i + 1)..n {
                self.track(|run| run.compare_index = j);
                self.step(StepEvent::CompareStart { index: j });

                if !self.pause(self.compare_delay).await {
                    return Ok(RunOutcome::Cancelled);
                }

                if self.store.compare_at(j, min_index, self.key)?.is_lt() {
                    min_index = j;
                    self.track(|run| run.current_min_index = j);
                }
                self.step(StepEvent::CompareEnd { index: j });
            }

            if min_index != i {
                self.store.swap_at(i, min_index)?;
            }
            self.step(StepEvent::Swap { pass: i, min_index });
            if min_index != i {
                self.emit(SortUpdate::StoreChanged(self.store.snapshot()));
            }

            if !self.pause(self.swap_delay).await {
                return Ok(RunOutcome::Cancelled);
            }
        }

        Ok(RunOutcome::Completed)
    }

    /// Suspension point. Returns false if the run was cancelled.
    async fn pause(&self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    fn track(&self, update: impl FnOnce(&mut SortRunState)) {
        update(&mut *self.progress.lock());
    }

    fn step(&self, event: StepEvent) {
        log::trace!("sort by {}: {:?}", self.key, event);
        self.emit(SortUpdate::Step(event));
    }

    fn emit(&self, update: SortUpdate) {
        // Nobody is listening any more; stop at the next pause
        if self.updates.send(update).is_err() && !self.token.is_cancelled() {
            log::debug!("Sort update receiver dropped, cancelling sort by {}", self.key);
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{BookFields, BookRecord};

    fn store_with(books: &[(i64, &str)]) -> Arc<RecordStore> {
        let store = Arc::new(RecordStore::new());
        for (id, title) in books {
            store
                .insert(&BookFields {
                    id: id.to_string(),
                    title: title.to_string(),
                    author: "Author".to_string(),
                    year: "1999".to_string(),
                })
                .unwrap();
        }
        store
    }

    fn engine_for(store: &Arc<RecordStore>, config: SortConfig) -> SortEngine {
        SortEngine::new(Arc::clone(store), config, Handle::current())
    }

    async fn drain(updates: &mut UnboundedReceiver<SortUpdate>) -> Vec<SortUpdate> {
        let mut out = Vec::new();
        while let Some(update) = updates.recv().await {
            out.push(update);
        }
        out
    }

    async fn run_to_end(engine: &SortEngine, key: SortKey) -> Vec<StepEvent> {
        let mut handle = engine.request_sort(key).unwrap();
        let mut updates = handle.take_updates().unwrap();
        steps(drain(&mut updates).await)
    }

    fn steps(updates: Vec<SortUpdate>) -> Vec<StepEvent> {
        updates
            .into_iter()
            .filter_map(|update| match update {
                SortUpdate::Step(event) => Some(event),
                SortUpdate::StoreChanged(_) => None,
            })
            .collect()
    }

    fn ids(store: &RecordStore) -> Vec<i64> {
        store.snapshot().iter().map(|b| b.id).collect()
    }

    /// Deterministic pseudo-random ids, including duplicates and negatives
    fn scrambled_ids(seed: u64, len: usize) -> Vec<i64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                ((state >> 33) % 40) as i64 - 10
            })
            .collect()
    }

    #[tokio::test]
    async fn test_three_record_example() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let engine = engine_for(&store, SortConfig::instant());

        let events = run_to_end(&engine, SortKey::Id).await;

        assert_eq!(
            events,
            vec![
                StepEvent::PassStart { pass: 0 },
                StepEvent::CompareStart { index: 1 },
                StepEvent::CompareEnd { index: 1 },
                StepEvent::CompareStart { index: 2 },
                StepEvent::CompareEnd { index: 2 },
                StepEvent::Swap { pass: 0, min_index: 1 },
                StepEvent::PassStart { pass: 1 },
                StepEvent::CompareStart { index: 2 },
                StepEvent::CompareEnd { index: 2 },
                StepEvent::Swap { pass: 1, min_index: 2 },
                StepEvent::SortComplete { key: SortKey::Id },
            ]
        );
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(engine.phase(), SortPhase::Completed);
    }

    #[tokio::test]
    async fn test_sort_by_id_is_non_decreasing() {
        for seed in 1..=8 {
            let books: Vec<(i64, &str)> = scrambled_ids(seed, 9).into_iter().map(|id| (id, "T")).collect();
            let store = store_with(&books);
            let engine = engine_for(&store, SortConfig::instant());

            run_to_end(&engine, SortKey::Id).await;

            let sorted = ids(&store);
            assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "seed {seed}: {sorted:?}");
            assert_eq!(sorted.len(), 9);
        }
    }

    #[tokio::test]
    async fn test_sort_by_title_is_lexicographic() {
        let store = store_with(&[
            (1, "hobbit"),
            (2, "Silmarillion"),
            (3, "Hobbit"),
            (4, "Beren"),
            (5, "children of Hurin"),
        ]);
        let engine = engine_for(&store, SortConfig::instant());

        run_to_end(&engine, SortKey::Title).await;

        let titles: Vec<String> = store.snapshot().into_iter().map(|b| b.title).collect();
        assert_eq!(
            titles,
            vec!["Beren", "Hobbit", "Silmarillion", "children of Hurin", "hobbit"]
        );
    }

    #[tokio::test]
    async fn test_already_sorted_makes_no_swaps() {
        let store = store_with(&[(1, "A"), (2, "B"), (3, "C"), (4, "D")]);
        let before = store.snapshot();
        let engine = engine_for(&store, SortConfig::instant());

        let events = run_to_end(&engine, SortKey::Id).await;

        let swaps: Vec<&StepEvent> = events.iter().filter(|e| matches!(e, StepEvent::Swap { .. })).collect();
        assert_eq!(swaps.len(), 3);
        assert!(swaps.iter().all(|e| !e.swapped()));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_equal_keys_keep_first_minimum() {
        let store = store_with(&[(2, "first"), (1, "second"), (1, "third")]);
        let engine = engine_for(&store, SortConfig::instant());

        let events = run_to_end(&engine, SortKey::Id).await;

        assert!(events.contains(&StepEvent::Swap { pass: 0, min_index: 1 }));
        let titles: Vec<String> = store.snapshot().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["second", "third", "first"]);
    }

    #[tokio::test]
    async fn test_tiny_stores_complete_immediately() {
        for books in [vec![], vec![(5, "Only")]] {
            let store = store_with(&books);
            let engine = engine_for(&store, SortConfig::instant());

            let events = run_to_end(&engine, SortKey::Title).await;

            assert_eq!(events, vec![StepEvent::SortComplete { key: SortKey::Title }]);
        }
    }

    #[tokio::test]
    async fn test_cancel_before_first_event() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let before = store.snapshot();
        let engine = engine_for(&store, SortConfig::instant());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        handle.cancel();
        let mut updates = handle.take_updates().unwrap();
        let events = steps(drain(&mut updates).await);

        assert_eq!(events, vec![StepEvent::Cancelled]);
        assert_eq!(store.snapshot(), before);
        assert_eq!(engine.phase(), SortPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_compare() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let before = store.snapshot();
        let engine = engine_for(&store, SortConfig::default());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        let mut updates = handle.take_updates().unwrap();

        assert_eq!(updates.recv().await, Some(SortUpdate::Step(StepEvent::PassStart { pass: 0 })));
        assert_eq!(updates.recv().await, Some(SortUpdate::Step(StepEvent::CompareStart { index: 1 })));
        assert_eq!(handle.progress().compare_index, 1);
        handle.cancel();

        let rest = drain(&mut updates).await;
        assert_eq!(
            rest,
            vec![
                SortUpdate::StoreChanged(before.clone()),
                SortUpdate::Step(StepEvent::Cancelled),
            ]
        );
        assert_eq!(store.snapshot(), before);
        assert!(!handle.progress().active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_rejected_while_running() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let reference = {
            let copy = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
            run_to_end(&engine_for(&copy, SortConfig::instant()), SortKey::Id).await
        };
        let engine = engine_for(&store, SortConfig::default());

        let mut first = engine.request_sort(SortKey::Id).unwrap();
        assert_eq!(engine.request_sort(SortKey::Title).unwrap_err(), ConcurrentSortError);
        assert!(engine.is_running());

        let mut updates = first.take_updates().unwrap();
        let events = steps(drain(&mut updates).await);

        assert_eq!(events, reference);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert!(engine.request_sort(SortKey::Title).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_engines_sharing_a_store_sort_one_at_a_time() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let first = engine_for(&store, SortConfig::default());
        let second = engine_for(&store, SortConfig::default());

        let mut handle = first.request_sort(SortKey::Id).unwrap();
        assert_eq!(second.request_sort(SortKey::Title).unwrap_err(), ConcurrentSortError);
        assert!(store.is_sorting());
        assert_eq!(second.phase(), SortPhase::Idle);

        let mut updates = handle.take_updates().unwrap();
        let events = steps(drain(&mut updates).await);

        assert_eq!(events.last(), Some(&StepEvent::SortComplete { key: SortKey::Id }));
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert!(!store.is_sorting());
        assert!(second.request_sort(SortKey::Title).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_during_sort_stays_past_sorted_range() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let engine = engine_for(&store, SortConfig::default());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        let mut updates = handle.take_updates().unwrap();
        assert_eq!(updates.recv().await, Some(SortUpdate::Step(StepEvent::PassStart { pass: 0 })));

        store
            .insert(&BookFields {
                id: "0".to_string(),
                title: "Late".to_string(),
                author: "Author".to_string(),
                year: "2024".to_string(),
            })
            .unwrap();

        let events = steps(drain(&mut updates).await);

        assert_eq!(events.last(), Some(&StepEvent::SortComplete { key: SortKey::Id }));
        assert!(events.iter().all(|e| match e {
            StepEvent::CompareStart { index } | StepEvent::CompareEnd { index } => *index < 3,
            StepEvent::Swap { min_index, .. } => *min_index < 3,
            _ => true,
        }));
        assert_eq!(ids(&store), vec![1, 2, 3, 0]);
    }

    #[tokio::test]
    async fn test_new_sort_allowed_once_terminal_event_seen() {
        let store = store_with(&[(2, "B"), (1, "A")]);
        let engine = engine_for(&store, SortConfig::instant());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        let mut updates = handle.take_updates().unwrap();
        while let Some(update) = updates.recv().await {
            if let SortUpdate::Step(event) = update {
                if event.is_terminal() {
                    assert!(!engine.is_running());
                    assert!(engine.request_sort(SortKey::Title).is_ok());
                }
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_receiver_cancels_run() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let engine = engine_for(&store, SortConfig::default());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        drop(handle.take_updates());

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(handle.is_cancelled());
        assert_eq!(engine.phase(), SortPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleared_mid_run_ends_as_cancelled() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let engine = engine_for(&store, SortConfig::default());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        let mut updates = handle.take_updates().unwrap();
        assert_eq!(updates.recv().await, Some(SortUpdate::Step(StepEvent::PassStart { pass: 0 })));
        store.clear();

        let events = steps(drain(&mut updates).await);
        assert_eq!(events.last(), Some(&StepEvent::Cancelled));
        assert_eq!(engine.phase(), SortPhase::Cancelled);
    }

    #[tokio::test]
    async fn test_store_changed_follows_each_real_swap() {
        let store = store_with(&[(3, "C"), (1, "A"), (2, "B")]);
        let engine = engine_for(&store, SortConfig::instant());

        let mut handle = engine.request_sort(SortKey::Id).unwrap();
        let mut updates = handle.take_updates().unwrap();
        let all = drain(&mut updates).await;

        let after_first_swap = all
            .iter()
            .position(|u| *u == SortUpdate::Step(StepEvent::Swap { pass: 0, min_index: 1 }))
            .unwrap();
        let expected: Vec<BookRecord> = vec![
            BookRecord::new(1, "A", "Author", "1999"),
            BookRecord::new(3, "C", "Author", "1999"),
            BookRecord::new(2, "B", "Author", "1999"),
        ];
        assert_eq!(all[after_first_swap + 1], SortUpdate::StoreChanged(expected));
    }
}
