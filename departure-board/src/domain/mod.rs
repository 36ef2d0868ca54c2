//! Domain types for the departure board.
//!
//! Routes describe what the board watches; rows are what it shows.

mod route;
mod row;

pub use route::{ARCHWAY_BUS_STOP, ARCHWAY_TUBE_STOP, RouteConfig, RouteFilter, RouteId};
pub use row::{
    DUE_THRESHOLD_SECS, DisplayRow, MAX_ROWS, NO_FURTHER_SERVICES, PLACEHOLDER, format_eta,
    format_scheduled,
};
