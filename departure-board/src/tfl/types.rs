//! TfL arrivals response DTOs.
//!
//! `GET /StopPoint/{id}/Arrivals` returns a JSON array with one object per
//! vehicle heading for the stop. Only the fields the board needs are mapped,
//! and every one of them is optional: TfL omits or nulls fields freely, and a
//! missing value is never a reason to reject the whole response.

use serde::{Deserialize, Deserializer};

use super::error::FetchError;

/// One vehicle's predicted arrival at a stop.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArrivalPrediction {
    /// Seconds until the vehicle reaches the stop.
    #[serde(deserialize_with = "lenient_seconds")]
    pub time_to_station: Option<i64>,

    /// Final destination, e.g. "Morden Underground Station".
    pub destination_name: Option<String>,

    /// Free-text heading, e.g. "Morden via Charing Cross".
    pub towards: Option<String>,

    /// Platform or stop letter, e.g. "Southbound - Platform 2".
    pub platform_name: Option<String>,

    /// "inbound" or "outbound".
    pub direction: Option<String>,
}

impl ArrivalPrediction {
    /// Platform, heading and destination joined and lower-cased, for keyword
    /// matching.
    pub fn combined_text(&self) -> String {
        [&self.platform_name, &self.towards, &self.destination_name]
            .iter()
            .map(|field| field.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Whether the direction field equals `direction`, ignoring case.
    pub fn has_direction(&self, direction: &str) -> bool {
        self.direction
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case(direction))
    }

    /// Seconds to arrival, with a missing value sorting after every real one.
    pub fn sort_key(&self) -> i64 {
        self.time_to_station.unwrap_or(i64::MAX)
    }
}

/// Accept integer or fractional seconds; anything else reads as absent.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Parse an arrivals response body.
///
/// The body must be a JSON array of objects. Fields inside each object are
/// read permissively.
pub fn parse_arrivals(body: &str) -> Result<Vec<ArrivalPrediction>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Malformed {
        message: e.to_string(),
    })
}
