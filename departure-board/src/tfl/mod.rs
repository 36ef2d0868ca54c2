//! TfL unified API client.
//!
//! This module provides an HTTP client for the TfL StopPoint arrivals
//! endpoint, plus a file-backed mock with the same interface.
//!
//! Key characteristics of the arrivals feed:
//! - Predictions are unordered; callers sort by `timeToStation`
//! - `timeToStation` is in seconds from the time of the request
//! - Tube destinations carry an " Underground Station" suffix, bus ones don't

mod client;
mod error;
mod mock;
mod types;

pub use client::{Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, TflClient, TflConfig};
pub use error::FetchError;
pub use mock::MockArrivals;
pub use types::{ArrivalPrediction, parse_arrivals};
