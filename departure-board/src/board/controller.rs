//! Ties the board state to the refresh scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info};

use super::display::{BoardLayout, BoardState};
use super::fetcher::ArrivalsSource;
use crate::domain::{RouteConfig, RouteId};
use crate::scheduler::{RefreshOutcome, Scheduler, spawn_refresh};

/// The running board: what is shown, and when to refresh it.
///
/// Owned by the UI loop. Fetches run on spawned tasks and report back
/// through the outcome channel; only [`Board::on_outcome`] writes their
/// results into the state.
pub struct Board<S> {
    state: BoardState,
    scheduler: Scheduler,
    routes: Vec<Arc<RouteConfig>>,
    source: Arc<S>,
    outcomes: UnboundedSender<RefreshOutcome>,
}

impl<S: ArrivalsSource> Board<S> {
    /// Create a board for `routes`; the first tick is due shortly after `now`.
    pub fn new(
        routes: Vec<RouteConfig>,
        layout: BoardLayout,
        period: Duration,
        source: Arc<S>,
        outcomes: UnboundedSender<RefreshOutcome>,
        now: Instant,
    ) -> Self {
        let routes: Vec<Arc<RouteConfig>> = routes.into_iter().map(Arc::new).collect();

        Self {
            state: BoardState::new(routes.clone(), layout),
            scheduler: Scheduler::new(period, now),
            routes,
            source,
            outcomes,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// When the next tick is due, or `None` while one is still running.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Run one tick: fetch every monitored route that isn't already busy.
    pub fn on_tick(&mut self, now: Instant) {
        let tick = self.scheduler.start_tick();
        let routes = self.state.monitored();
        debug!(tick, routes = routes.len(), "tick");

        for id in routes {
            self.dispatch(id, tick);
        }

        self.scheduler.rearm_if_idle(now);
    }

    /// Apply a finished fetch to the display.
    pub fn on_outcome(&mut self, outcome: RefreshOutcome, now: Instant) {
        self.state
            .apply(outcome.route, &outcome.result, outcome.attempted_at.time());
        self.scheduler.finish(outcome.route, now);
    }

    /// Switch the active route and refresh it straight away.
    ///
    /// Does nothing in split layout.
    pub fn toggle(&mut self) -> Option<RouteId> {
        let id = self.state.toggle()?;
        info!(%id, title = %self.state.title(), "switched route");

        let tick = self.scheduler.tick_count();
        self.dispatch(id, tick);
        Some(id)
    }

    fn dispatch(&mut self, id: RouteId, tick: u64) -> bool {
        let Some(route) = self.routes.get(id.0) else {
            return false;
        };

        if !self.scheduler.try_begin(id) {
            debug!(%id, tick, "previous fetch still running, skipping");
            return false;
        }

        self.state.begin_refresh(id);
        spawn_refresh(
            Arc::clone(&self.source),
            id,
            Arc::clone(route),
            tick,
            self.outcomes.clone(),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{Notify, mpsc};

    use super::*;
    use crate::board::RefreshPhase;
    use crate::domain::{ARCHWAY_BUS_STOP, ARCHWAY_TUBE_STOP, NO_FURTHER_SERVICES, PLACEHOLDER};
    use crate::tfl::{ArrivalPrediction, FetchError};

    const PERIOD: Duration = Duration::from_secs(15);

    /// In-memory source keyed by stop id; a missing stop fails like a
    /// dropped connection.
    #[derive(Default)]
    struct MapSource {
        stops: HashMap<String, Vec<ArrivalPrediction>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
        panics: bool,
    }

    impl MapSource {
        fn with_stop(mut self, stop: &str, predictions: Vec<ArrivalPrediction>) -> Self {
            self.stops.insert(stop.to_string(), predictions);
            self
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn panicking(mut self) -> Self {
            self.panics = true;
            self
        }
    }

    impl ArrivalsSource for MapSource {
        async fn arrivals(
            &self,
            stop_id: &str,
            _line_id: &str,
        ) -> Result<Vec<ArrivalPrediction>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.panics {
                panic!("source for {stop_id} panicked");
            }
            self.stops
                .get(stop_id)
                .cloned()
                .ok_or_else(|| FetchError::Unavailable("connection reset".to_string()))
        }
    }

    fn bus_to_tottenham_hale(secs: i64) -> ArrivalPrediction {
        ArrivalPrediction {
            time_to_station: Some(secs),
            destination_name: Some("Tottenham Hale".to_string()),
            ..Default::default()
        }
    }

    fn routes() -> Vec<RouteConfig> {
        vec![
            RouteConfig::archway_northern(),
            RouteConfig::archway_bus_41(ARCHWAY_BUS_STOP),
        ]
    }

    fn board(
        source: MapSource,
        layout: BoardLayout,
    ) -> (Board<MapSource>, mpsc::UnboundedReceiver<RefreshOutcome>, Arc<MapSource>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(source);
        let board = Board::new(routes(), layout, PERIOD, Arc::clone(&source), tx, Instant::now());
        (board, rx, source)
    }

    #[tokio::test]
    async fn failed_route_does_not_affect_the_other() {
        // No tube stop registered: the tube fetch fails.
        let source = MapSource::default()
            .with_stop(ARCHWAY_BUS_STOP, vec![bus_to_tottenham_hale(400), bus_to_tottenham_hale(90)]);
        let (mut board, mut rx, _) = board(source, BoardLayout::Split);

        board.on_tick(Instant::now());
        assert_eq!(board.deadline(), None);

        for _ in 0..2 {
            let outcome = rx.recv().await.unwrap();
            board.on_outcome(outcome, Instant::now());
        }

        let tube = board.state().section(RouteId(0)).unwrap();
        assert_eq!(tube.phase(), RefreshPhase::Error);
        assert_eq!(tube.slots()[0].eta, PLACEHOLDER);
        assert!(tube.slots()[0].destination.starts_with("Error fetching data:"));
        assert!(tube.slots()[0].destination.contains("connection reset"));
        assert_eq!(tube.slots()[1].destination, NO_FURTHER_SERVICES);
        assert_eq!(tube.slots()[2].destination, NO_FURTHER_SERVICES);

        let bus = board.state().section(RouteId(1)).unwrap();
        assert_eq!(bus.phase(), RefreshPhase::Rendered);
        assert_eq!(bus.slots()[0].eta, "1 min");
        assert_eq!(bus.slots()[1].eta, "6 min");
        assert_eq!(bus.slots()[2].destination, NO_FURTHER_SERVICES);

        assert!(board.state().footer().starts_with("Last updated "));
        assert_ne!(board.state().footer(), "Last updated —");
    }

    #[tokio::test]
    async fn timer_rearms_after_failure_and_next_tick_fires() {
        let (mut board, mut rx, source) = board(MapSource::default(), BoardLayout::Toggle);

        board.on_tick(Instant::now());
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.tick, 1);
        assert!(outcome.result.is_err());

        let handled_at = Instant::now();
        board.on_outcome(outcome, handled_at);
        assert_eq!(board.deadline(), Some(handled_at + PERIOD));

        board.on_tick(handled_at + PERIOD);
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.tick, 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicked_fetch_releases_route_and_rearms() {
        let (mut board, mut rx, _) = board(MapSource::default().panicking(), BoardLayout::Toggle);

        board.on_tick(Instant::now());
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome.result, Err(FetchError::Aborted(_))));

        let handled_at = Instant::now();
        board.on_outcome(outcome, handled_at);
        assert_eq!(board.deadline(), Some(handled_at + PERIOD));

        let tube = board.state().section(RouteId(0)).unwrap();
        assert_eq!(tube.phase(), RefreshPhase::Error);
        assert!(tube.slots()[0].destination.starts_with("Error fetching data: fetch task failed"));
    }

    #[tokio::test]
    async fn busy_route_is_skipped() {
        let gate = Arc::new(Notify::new());
        let source = MapSource::default()
            .with_stop(ARCHWAY_TUBE_STOP, vec![])
            .gated(Arc::clone(&gate));
        let (mut board, mut rx, source) = board(source, BoardLayout::Toggle);

        board.on_tick(Instant::now());
        board.on_tick(Instant::now());
        tokio::task::yield_now().await;

        gate.notify_one();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.tick, 1);
        board.on_outcome(outcome, Instant::now());

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
        assert!(board.deadline().is_some());
    }

    #[tokio::test]
    async fn toggle_refreshes_new_route_immediately() {
        let source = MapSource::default()
            .with_stop(ARCHWAY_TUBE_STOP, vec![])
            .with_stop(ARCHWAY_BUS_STOP, vec![bus_to_tottenham_hale(20)]);
        let (mut board, mut rx, _) = board(source, BoardLayout::Toggle);
        let deadline = board.deadline();

        assert_eq!(board.toggle(), Some(RouteId(1)));
        assert_eq!(board.state().active(), RouteId(1));

        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.route, RouteId(1));
        board.on_outcome(outcome, Instant::now());

        let bus = board.state().section(RouteId(1)).unwrap();
        assert_eq!(bus.slots()[0].eta, "Due");
        assert_eq!(bus.slots()[0].destination, "Tottenham Hale");

        // The regular schedule is untouched.
        assert_eq!(board.deadline(), deadline);
    }

    #[tokio::test]
    async fn toggle_in_split_layout_is_ignored() {
        let (mut board, mut rx, source) = board(MapSource::default(), BoardLayout::Split);

        assert_eq!(board.toggle(), None);
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
