use crate::api::{
    dataset::DatasetSummary, metrics::MetricsSnapshot, score::ScoreRow, train::TrainResult,
};
use crate::pipeline::stage::{Stage, StageStatus};
use log::debug;
use std::sync::{Arc, Mutex};

type Listener = Arc<dyn Fn(Stage) + Send + Sync>;

/// Proof that a request was issued for a stage.
///
/// Settling a slot requires the ticket from the matching `begin`; a ticket
/// that is no longer the latest issue for its stage is stale and its
/// outcome is discarded.
#[derive(Debug, Clone)]
pub struct Ticket {
    stage: Stage,
    seq: u64,
}

impl Ticket {
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// Snapshot of one stage slot.
///
/// `value` is the last successful result; it survives later failures and
/// is then flagged `stale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageView<T> {
    pub status: StageStatus,
    pub value: Option<T>,
    pub stale: bool,
}

struct SlotState<T> {
    status: StageStatus,
    value: Option<T>,
    stale: bool,
    // sequence number of the most recently issued request
    issued: u64,
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot {
            state: Mutex::new(SlotState {
                status: StageStatus::Idle,
                value: None,
                stale: false,
                issued: 0,
            }),
        }
    }
}

impl<T> Slot<T> {
    fn begin(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.issued += 1;
        state.status = StageStatus::Pending;
        state.issued
    }

    fn succeed(&self, seq: u64, value: T) -> bool {
        let mut state = self.state.lock().unwrap();
        if seq != state.issued {
            return false;
        }
        state.status = StageStatus::Succeeded;
        state.value = Some(value);
        state.stale = false;
        true
    }

    fn fail(&self, seq: u64, reason: String) -> bool {
        let mut state = self.state.lock().unwrap();
        if seq != state.issued {
            return false;
        }
        state.stale = state.value.is_some();
        state.status = StageStatus::Failed(reason);
        true
    }

    fn status(&self) -> StageStatus {
        self.state.lock().unwrap().status.clone()
    }
}

impl<T: Clone> Slot<T> {
    fn view(&self) -> StageView<T> {
        let state = self.state.lock().unwrap();
        StageView {
            status: state.status.clone(),
            value: state.value.clone(),
            stale: state.stale,
        }
    }
}

/// Single source of truth for the four stage results and their statuses.
///
/// Written only through tickets handed out by [`StageStore::begin`]; read
/// by anything. Every applied update notifies subscribed observers.
#[derive(Default)]
pub struct StageStore {
    dataset: Slot<DatasetSummary>,
    train: Slot<TrainResult>,
    metrics: Slot<MetricsSnapshot>,
    scores: Slot<Vec<ScoreRow>>,
    listeners: Mutex<Vec<Listener>>,
}

impl StageStore {
    pub fn new() -> Self {
        StageStore::default()
    }

    /// Issue a new request for `stage`: the slot turns Pending and any
    /// earlier in-flight ticket for the stage becomes stale.
    pub fn begin(&self, stage: Stage) -> Ticket {
        let seq = match stage {
            Stage::Dataset => self.dataset.begin(),
            Stage::Train => self.train.begin(),
            Stage::Metrics => self.metrics.begin(),
            Stage::Score => self.scores.begin(),
        };
        self.notify(stage);
        Ticket { stage, seq }
    }

    pub fn fail(&self, ticket: &Ticket, reason: impl Into<String>) {
        let reason = reason.into();
        let applied = match ticket.stage {
            Stage::Dataset => self.dataset.fail(ticket.seq, reason),
            Stage::Train => self.train.fail(ticket.seq, reason),
            Stage::Metrics => self.metrics.fail(ticket.seq, reason),
            Stage::Score => self.scores.fail(ticket.seq, reason),
        };
        self.settled(ticket, applied);
    }

    pub fn put_dataset(&self, ticket: &Ticket, summary: DatasetSummary) {
        debug_assert_eq!(ticket.stage, Stage::Dataset);
        let applied = self.dataset.succeed(ticket.seq, summary);
        self.settled(ticket, applied);
    }

    pub fn put_train(&self, ticket: &Ticket, result: TrainResult) {
        debug_assert_eq!(ticket.stage, Stage::Train);
        let applied = self.train.succeed(ticket.seq, result);
        self.settled(ticket, applied);
    }

    pub fn put_metrics(&self, ticket: &Ticket, snapshot: MetricsSnapshot) {
        debug_assert_eq!(ticket.stage, Stage::Metrics);
        let applied = self.metrics.succeed(ticket.seq, snapshot);
        self.settled(ticket, applied);
    }

    pub fn put_scores(&self, ticket: &Ticket, scores: Vec<ScoreRow>) {
        debug_assert_eq!(ticket.stage, Stage::Score);
        let applied = self.scores.succeed(ticket.seq, scores);
        self.settled(ticket, applied);
    }

    pub fn dataset(&self) -> StageView<DatasetSummary> {
        self.dataset.view()
    }

    pub fn train(&self) -> StageView<TrainResult> {
        self.train.view()
    }

    pub fn metrics(&self) -> StageView<MetricsSnapshot> {
        self.metrics.view()
    }

    pub fn scores(&self) -> StageView<Vec<ScoreRow>> {
        self.scores.view()
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Dataset => self.dataset.status(),
            Stage::Train => self.train.status(),
            Stage::Metrics => self.metrics.status(),
            Stage::Score => self.scores.status(),
        }
    }

    /// Register an observer called with the touched stage after every
    /// applied update. Must not subscribe from within a callback.
    pub fn subscribe(&self, listener: impl Fn(Stage) + Send + Sync + 'static) {
        self.listeners.lock().unwrap().push(Arc::new(listener));
    }

    fn settled(&self, ticket: &Ticket, applied: bool) {
        if applied {
            self.notify(ticket.stage);
        } else {
            debug!(
                "discarding stale {} response (request {} superseded)",
                ticket.stage, ticket.seq
            );
        }
    }

    // Listeners are cloned out so a callback can read the store without
    // holding the listener lock.
    fn notify(&self, stage: Stage) {
        let listeners: Vec<Listener> = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> DatasetSummary {
        DatasetSummary {
            columns: vec!["customer_id".to_owned(), "plan".to_owned()],
            rows: 500,
        }
    }

    #[test]
    fn begin_turns_the_stage_pending_synchronously() {
        let store = StageStore::new();
        assert_eq!(store.status(Stage::Dataset), StageStatus::Idle);
        let _ticket = store.begin(Stage::Dataset);
        assert_eq!(store.status(Stage::Dataset), StageStatus::Pending);
    }

    #[test]
    fn success_replaces_the_result() {
        let store = StageStore::new();
        let ticket = store.begin(Stage::Dataset);
        store.put_dataset(&ticket, summary());
        let view = store.dataset();
        assert_eq!(view.status, StageStatus::Succeeded);
        assert_eq!(view.value, Some(summary()));
        assert!(!view.stale);
    }

    #[test]
    fn failure_retains_the_previous_result_as_stale() {
        let store = StageStore::new();
        let first = store.begin(Stage::Dataset);
        store.put_dataset(&first, summary());

        let second = store.begin(Stage::Dataset);
        store.fail(&second, "connection refused");

        let view = store.dataset();
        assert_eq!(
            view.status,
            StageStatus::Failed("connection refused".to_owned())
        );
        assert_eq!(view.value, Some(summary()));
        assert!(view.stale);
    }

    #[test]
    fn failure_without_a_previous_result_is_not_stale() {
        let store = StageStore::new();
        let ticket = store.begin(Stage::Metrics);
        store.fail(&ticket, "boom");
        let view = store.metrics();
        assert_eq!(view.value, None);
        assert!(!view.stale);
    }

    #[test]
    fn a_fresh_success_clears_the_stale_flag() {
        let store = StageStore::new();
        let first = store.begin(Stage::Dataset);
        store.put_dataset(&first, summary());
        let second = store.begin(Stage::Dataset);
        store.fail(&second, "boom");
        let third = store.begin(Stage::Dataset);
        store.put_dataset(&third, summary());
        let view = store.dataset();
        assert_eq!(view.status, StageStatus::Succeeded);
        assert!(!view.stale);
    }

    #[test]
    fn superseded_success_is_discarded() {
        let store = StageStore::new();
        let first = store.begin(Stage::Dataset);
        let _second = store.begin(Stage::Dataset);

        store.put_dataset(&first, summary());

        // The older response must not settle the newer request.
        let view = store.dataset();
        assert_eq!(view.status, StageStatus::Pending);
        assert_eq!(view.value, None);
    }

    #[test]
    fn later_issued_request_wins_regardless_of_arrival_order() {
        let store = StageStore::new();
        let first = store.begin(Stage::Score);
        let second = store.begin(Stage::Score);

        let newer = vec![ScoreRow {
            customer_id: Some("C1".into()),
            index: Some(0),
            prob: 0.9,
            recommendation: "call".to_owned(),
        }];
        store.put_scores(&second, newer.clone());
        // The first request settles last; its failure must be ignored.
        store.fail(&first, "timed out");

        let view = store.scores();
        assert_eq!(view.status, StageStatus::Succeeded);
        assert_eq!(view.value, Some(newer));
    }

    #[test]
    fn stages_are_independent() {
        let store = StageStore::new();
        let ticket = store.begin(Stage::Train);
        store.fail(&ticket, "boom");
        assert_eq!(store.status(Stage::Dataset), StageStatus::Idle);
        assert_eq!(store.status(Stage::Metrics), StageStatus::Idle);
        assert_eq!(store.status(Stage::Score), StageStatus::Idle);
    }

    #[test]
    fn observers_see_every_applied_update() {
        let store = StageStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |stage| sink.lock().unwrap().push(stage));

        let ticket = store.begin(Stage::Metrics);
        store.fail(&ticket, "boom");

        assert_eq!(*seen.lock().unwrap(), vec![Stage::Metrics, Stage::Metrics]);
    }

    #[test]
    fn discarded_updates_do_not_notify() {
        let store = StageStore::new();
        let first = store.begin(Stage::Dataset);
        let second = store.begin(Stage::Dataset);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |stage| sink.lock().unwrap().push(stage));

        store.put_dataset(&first, summary());
        assert!(seen.lock().unwrap().is_empty());

        store.put_dataset(&second, summary());
        assert_eq!(*seen.lock().unwrap(), vec![Stage::Dataset]);
    }
}
