//! On-screen board state.
//!
//! Holds the text of every row slot, independent of how it is drawn. Only
//! the UI loop mutates it, one refresh outcome at a time.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveTime;

use crate::domain::{DisplayRow, MAX_ROWS, PLACEHOLDER, RouteConfig, RouteId};

/// How the monitored routes share the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardLayout {
    /// One route at a time, switched with the toggle key.
    #[default]
    Toggle,
    /// Every route stacked on one screen.
    Split,
}

/// Error returned when parsing an unknown layout name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layout {0:?} (expected \"toggle\" or \"split\")")]
pub struct InvalidLayout(String);

impl FromStr for BoardLayout {
    type Err = InvalidLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(BoardLayout::Toggle),
            "split" => Ok(BoardLayout::Split),
            _ => Err(InvalidLayout(s.to_string())),
        }
    }
}

impl fmt::Display for BoardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardLayout::Toggle => f.write_str("toggle"),
            BoardLayout::Split => f.write_str("split"),
        }
    }
}

/// Where a route's section is in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Not yet fetched.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// Last fetch succeeded.
    Rendered,
    /// Last fetch failed.
    Error,
}

/// Text of one visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub eta: String,
    pub time: String,
    pub destination: String,
}

impl Slot {
    /// Text shown before the first fetch completes.
    fn initial() -> Self {
        Self {
            eta: "--".to_string(),
            time: "--:--".to_string(),
            destination: PLACEHOLDER.to_string(),
        }
    }

    fn set(&mut self, row: &DisplayRow) {
        self.eta.clone_from(&row.eta);
        self.time.clone_from(&row.scheduled_time);
        self.destination.clone_from(&row.destination);
    }
}

/// One route's table on the board.
#[derive(Debug, Clone)]
pub struct Section {
    route: Arc<RouteConfig>,
    slots: [Slot; MAX_ROWS],
    phase: RefreshPhase,
    last_updated: Option<NaiveTime>,
}

impl Section {
    fn new(route: Arc<RouteConfig>) -> Self {
        Self {
            route,
            slots: std::array::from_fn(|_| Slot::initial()),
            phase: RefreshPhase::Idle,
            last_updated: None,
        }
    }

    /// Overwrite every slot from `rows`.
    ///
    /// Slots past the end of `rows` show the "no further services" filler,
    /// so stale rows never survive a refresh.
    pub fn update(&mut self, rows: &[DisplayRow]) {
        let empty = DisplayRow::empty();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.set(rows.get(i).unwrap_or(&empty));
        }
        self.phase = RefreshPhase::Rendered;
    }

    /// Replace the table with a single error row.
    pub fn show_error(&mut self, cause: impl fmt::Display) {
        self.update(&[DisplayRow::error(cause)]);
        self.phase = RefreshPhase::Error;
    }

    pub fn route(&self) -> &RouteConfig {
        &self.route
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// When this section's latest refresh attempt started.
    pub fn last_updated(&self) -> Option<NaiveTime> {
        self.last_updated
    }
}

/// Everything the board shows.
#[derive(Debug, Clone)]
pub struct BoardState {
    layout: BoardLayout,
    sections: Vec<Section>,
    active: RouteId,
    last_updated: Option<NaiveTime>,
}

impl BoardState {
    /// Create a board for `routes`, with the first one active.
    pub fn new(routes: Vec<Arc<RouteConfig>>, layout: BoardLayout) -> Self {
        Self {
            layout,
            sections: routes.into_iter().map(Section::new).collect(),
            active: RouteId(0),
            last_updated: None,
        }
    }

    /// The route whose table is shown in toggle layout.
    pub fn active(&self) -> RouteId {
        self.active
    }

    pub fn section(&self, id: RouteId) -> Option<&Section> {
        self.sections.get(id.0)
    }

    /// Routes whose data should be refreshed on each tick.
    pub fn monitored(&self) -> Vec<RouteId> {
        match self.layout {
            BoardLayout::Toggle => vec![self.active],
            BoardLayout::Split => (0..self.sections.len()).map(RouteId).collect(),
        }
    }

    /// Sections to draw, top to bottom.
    pub fn visible(&self) -> Vec<&Section> {
        match self.layout {
            BoardLayout::Toggle => self.section(self.active).into_iter().collect(),
            BoardLayout::Split => self.sections.iter().collect(),
        }
    }

    /// Mark a route as having a fetch in flight.
    pub fn begin_refresh(&mut self, id: RouteId) {
        if let Some(section) = self.sections.get_mut(id.0) {
            section.phase = RefreshPhase::Fetching;
        }
    }

    /// Record the result of a refresh attempt made at `attempted_at`.
    ///
    /// The footer advances whether or not the fetch succeeded.
    pub fn apply<E: fmt::Display>(
        &mut self,
        id: RouteId,
        result: &Result<Vec<DisplayRow>, E>,
        attempted_at: NaiveTime,
    ) {
        if let Some(section) = self.sections.get_mut(id.0) {
            match result {
                Ok(rows) => section.update(rows),
                Err(err) => section.show_error(err),
            }
            section.last_updated = Some(attempted_at);
        }
        self.last_updated = Some(attempted_at);
    }

    /// Switch to the next route.
    ///
    /// Returns the newly active route, or `None` in split layout where
    /// every route is already on screen.
    pub fn toggle(&mut self) -> Option<RouteId> {
        if self.layout != BoardLayout::Toggle || self.sections.len() < 2 {
            return None;
        }
        self.active = self.next_route();
        Some(self.active)
    }

    fn next_route(&self) -> RouteId {
        RouteId((self.active.0 + 1) % self.sections.len().max(1))
    }

    /// Key hint naming the route the toggle would switch to.
    pub fn toggle_hint(&self) -> Option<String> {
        if self.layout != BoardLayout::Toggle || self.sections.len() < 2 {
            return None;
        }
        let other = self.section(self.next_route())?;
        Some(format!("[T] Show {}", other.route().label))
    }

    /// Footer text: the time of the latest refresh attempt on screen.
    ///
    /// In toggle layout that is the active route's; a result for the
    /// hidden route does not move it.
    pub fn footer(&self) -> String {
        let last_updated = match self.layout {
            BoardLayout::Toggle => self.section(self.active).and_then(Section::last_updated),
            BoardLayout::Split => self.last_updated,
        };
        match last_updated {
            Some(at) => format!("Last updated {}", at.format("%H:%M:%S")),
            None => format!("Last updated {PLACEHOLDER}"),
        }
    }

    /// Window title for the active route.
    pub fn title(&self) -> String {
        match self.section(self.active) {
            Some(section) => format!("{} — {}", section.route().title, section.route().subtitle),
            None => "Departures".to_string(),
        }
    }
}
