//! Live departure board for a fixed stop.
//!
//! Polls the TfL arrivals API for the routes the board monitors, keeps the
//! first three relevant arrivals per route and renders them as a dot-matrix
//! style table in the terminal.

pub mod app;
pub mod board;
pub mod config;
pub mod domain;
pub mod scheduler;
pub mod tfl;
pub mod ui;
