//! Monitored routes and their arrival filters.

use std::fmt;

use crate::tfl::ArrivalPrediction;

/// NaPTAN id of Archway Underground station.
pub const ARCHWAY_TUBE_STOP: &str = "940GZZLUACY";

/// Default NaPTAN id of the Archway stop served by route 41 towards
/// Tottenham Hale. Override with `BOARD_BUS_STOP_ID`.
pub const ARCHWAY_BUS_STOP: &str = "490000008B";

/// Decorative suffix TfL appends to tube destination names.
const TUBE_STATION_SUFFIX: &str = " Underground Station";

/// Position of a route on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// Which predictions a route cares about.
///
/// Keywords are stored lower-case and matched against lower-cased text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFilter {
    /// Southbound trains that run through a named interchange.
    ///
    /// A train qualifies if its text names the `via` branch, or names the
    /// `terminus` of that branch without also naming the `excluded` branch.
    Interchange {
        via: String,
        terminus: String,
        excluded: String,
    },

    /// Services whose destination or heading names a target stop.
    Destination { target: String },
}

impl RouteFilter {
    /// Build an interchange filter.
    pub fn interchange(via: &str, terminus: &str, excluded: &str) -> Self {
        RouteFilter::Interchange {
            via: via.to_lowercase(),
            terminus: terminus.to_lowercase(),
            excluded: excluded.to_lowercase(),
        }
    }

    /// Build a destination filter.
    pub fn destination(target: &str) -> Self {
        RouteFilter::Destination {
            target: target.to_lowercase(),
        }
    }

    /// Whether `prediction` belongs on this route's board.
    pub fn matches(&self, prediction: &ArrivalPrediction) -> bool {
        match self {
            RouteFilter::Interchange {
                via,
                terminus,
                excluded,
            } => {
                let text = prediction.combined_text();
                let southbound = text.contains("southbound") || prediction.has_direction("inbound");
                let via_interchange = text.contains(via.as_str())
                    || (text.contains(terminus.as_str()) && !text.contains(excluded.as_str()));
                southbound && via_interchange
            }
            RouteFilter::Destination { target } => [&prediction.destination_name, &prediction.towards]
                .iter()
                .filter_map(|field| field.as_deref())
                .any(|field| field.to_lowercase().contains(target.as_str())),
        }
    }
}

/// A route the board monitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// NaPTAN id of the stop to poll.
    pub stop_id: String,

    /// TfL line id, e.g. "northern" or "41".
    pub line_id: String,

    /// Which predictions to keep.
    pub filter: RouteFilter,

    /// Header title, e.g. "NORTHERN".
    pub title: String,

    /// Header subtitle, e.g. "Archway → Tottenham Court Road".
    pub subtitle: String,

    /// Short name used by the toggle hint, e.g. "Northern line".
    pub label: String,

    /// Suffix removed from destination names before display.
    pub strip_suffix: Option<String>,
}

impl RouteConfig {
    /// Northern line from Archway, southbound trains via Charing Cross.
    pub fn archway_northern() -> Self {
        Self {
            stop_id: ARCHWAY_TUBE_STOP.to_string(),
            line_id: "northern".to_string(),
            filter: RouteFilter::interchange(
                "via charing cross",
                "battersea power station",
                "via bank",
            ),
            title: "NORTHERN".to_string(),
            subtitle: "Archway → Tottenham Court Road".to_string(),
            label: "Northern line".to_string(),
            strip_suffix: Some(TUBE_STATION_SUFFIX.to_string()),
        }
    }

    /// Route 41 from the given Archway stop towards Tottenham Hale.
    pub fn archway_bus_41(stop_id: impl Into<String>) -> Self {
        Self {
            stop_id: stop_id.into(),
            line_id: "41".to_string(),
            filter: RouteFilter::destination("Tottenham Hale"),
            title: "BUS 41".to_string(),
            subtitle: "Archway → Tottenham Hale".to_string(),
            label: "41 bus".to_string(),
            strip_suffix: None,
        }
    }

    /// Display text for a prediction's destination.
    ///
    /// Uses the destination name, falling back to the heading, with this
    /// route's suffix removed.
    pub fn destination_text(&self, prediction: &ArrivalPrediction) -> String {
        let raw = prediction
            .destination_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(prediction.towards.as_deref())
            .unwrap_or("");

        match &self.strip_suffix {
            Some(suffix) => raw.replace(suffix.as_str(), ""),
            None => raw.to_string(),
        }
    }
}
