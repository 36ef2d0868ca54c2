//! Refresh timer and background fetch tasks.
//!
//! The timer fires once per period. Each firing (a tick) spawns one fetch
//! task per monitored route; results come back over a channel to the UI
//! loop. The timer re-arms only after every fetch of the tick has been
//! handled, and a route with a fetch still in flight is skipped.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::board::{ArrivalsSource, fetch_rows};
use crate::domain::{DisplayRow, RouteConfig, RouteId};
use crate::tfl::FetchError;

/// Default time between refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(15);

/// Delay before the first tick after start-up.
pub const FIRST_TICK_DELAY: Duration = Duration::from_millis(200);

/// Result of one route's fetch, delivered to the UI loop.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// Which route was fetched.
    pub route: RouteId,
    /// Tick that started the fetch.
    pub tick: u64,
    /// Local time the fetch started; rows are timed from here.
    pub attempted_at: NaiveDateTime,
    /// Formatted rows, or why there are none.
    pub result: Result<Vec<DisplayRow>, FetchError>,
}

/// Tracks when the next tick is due and which routes are mid-fetch.
#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    deadline: Option<Instant>,
    in_flight: HashSet<RouteId>,
    tick: u64,
}

impl Scheduler {
    /// Create a scheduler whose first tick is due shortly after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            deadline: Some(now + FIRST_TICK_DELAY),
            in_flight: HashSet::new(),
            tick: 0,
        }
    }

    /// When the next tick is due, or `None` while a tick is still running.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Number of ticks started so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Start a tick and disarm the timer until it completes.
    pub fn start_tick(&mut self) -> u64 {
        self.deadline = None;
        self.tick += 1;
        self.tick
    }

    /// Claim `route` for a fetch. Returns false if one is already running.
    pub fn try_begin(&mut self, route: RouteId) -> bool {
        self.in_flight.insert(route)
    }

    pub fn is_in_flight(&self, route: RouteId) -> bool {
        self.in_flight.contains(&route)
    }

    /// Release `route` after its outcome has been handled.
    pub fn finish(&mut self, route: RouteId, now: Instant) {
        self.in_flight.remove(&route);
        self.rearm_if_idle(now);
    }

    /// Arm the timer for one period from `now` if a tick has completed.
    pub fn rearm_if_idle(&mut self, now: Instant) {
        if self.deadline.is_none() && self.in_flight.is_empty() {
            self.deadline = Some(now + self.period);
        }
    }
}

/// Fetch one route on a worker task and send the outcome to `outcomes`.
///
/// An outcome is sent even if the fetch itself panics, so the route is
/// always released and the timer can re-arm.
pub fn spawn_refresh<S: ArrivalsSource>(
    source: Arc<S>,
    id: RouteId,
    route: Arc<RouteConfig>,
    tick: u64,
    outcomes: UnboundedSender<RefreshOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let attempted_at = Local::now().naive_local();
        let fetch = tokio::spawn({
            let route = Arc::clone(&route);
            async move { fetch_rows(source.as_ref(), &route, attempted_at).await }
        });
        let result = match fetch.await {
            Ok(result) => result,
            Err(err) => Err(FetchError::Aborted(err.to_string())),
        };

        match &result {
            Ok(rows) => debug!(%id, tick, line = %route.line_id, rows = rows.len(), "refresh complete"),
            Err(err) => warn!(%id, tick, line = %route.line_id, error = %err, "refresh failed"),
        }

        let outcome = RefreshOutcome {
            route: id,
            tick,
            attempted_at,
            result,
        };

        // The receiver is gone once the board has shut down.
        if outcomes.send(outcome).is_err() {
            debug!(%id, tick, "board closed, dropping refresh outcome");
        }
    })
}
