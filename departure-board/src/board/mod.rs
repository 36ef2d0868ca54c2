//! The departure board: fetch pipeline, display state and controller.

mod controller;
mod display;
mod fetcher;

pub use controller::Board;
pub use display::{BoardLayout, BoardState, InvalidLayout, RefreshPhase, Section, Slot};
pub use fetcher::{ArrivalsSource, fetch_rows, select_rows};
