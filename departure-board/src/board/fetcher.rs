//! Fetch, filter and format one route's arrivals.

use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::{DisplayRow, MAX_ROWS, RouteConfig};
use crate::tfl::{ArrivalPrediction, FetchError, MockArrivals, TflClient};

/// Something that can produce raw arrival predictions for a stop.
///
/// This abstraction lets the board run against the live API, the file
/// mock, or in-memory sources in tests.
pub trait ArrivalsSource: Send + Sync + 'static {
    /// Fetch every prediction for `line_id` at `stop_id`.
    fn arrivals(
        &self,
        stop_id: &str,
        line_id: &str,
    ) -> impl Future<Output = Result<Vec<ArrivalPrediction>, FetchError>> + Send;
}

impl ArrivalsSource for TflClient {
    fn arrivals(
        &self,
        stop_id: &str,
        line_id: &str,
    ) -> impl Future<Output = Result<Vec<ArrivalPrediction>, FetchError>> + Send {
        self.get_arrivals(stop_id, line_id)
    }
}

impl ArrivalsSource for MockArrivals {
    fn arrivals(
        &self,
        stop_id: &str,
        line_id: &str,
    ) -> impl Future<Output = Result<Vec<ArrivalPrediction>, FetchError>> + Send {
        self.get_arrivals(stop_id, line_id)
    }
}

/// Fetch `route`'s arrivals and reduce them to at most three rows.
///
/// An empty result means no matching services and is not an error.
pub async fn fetch_rows<S: ArrivalsSource>(
    source: &S,
    route: &RouteConfig,
    now: NaiveDateTime,
) -> Result<Vec<DisplayRow>, FetchError> {
    let predictions = source.arrivals(&route.stop_id, &route.line_id).await?;
    Ok(select_rows(route, predictions, now))
}

/// Filter, sort and truncate predictions, then format the survivors.
pub fn select_rows(
    route: &RouteConfig,
    predictions: Vec<ArrivalPrediction>,
    now: NaiveDateTime,
) -> Vec<DisplayRow> {
    let mut kept: Vec<ArrivalPrediction> = predictions
        .into_iter()
        .filter(|p| route.filter.matches(p))
        .collect();

    // Stable, so equal times keep upstream order.
    kept.sort_by_key(ArrivalPrediction::sort_key);

    kept.iter()
        .take(MAX_ROWS)
        .map(|p| {
            let secs = p.time_to_station.unwrap_or(0);
            DisplayRow::new(secs, route.destination_text(p), now)
        })
        .collect()
}
