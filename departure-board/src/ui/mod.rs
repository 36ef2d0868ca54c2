//! Terminal display surface.

mod render;
pub mod terminal;

pub use render::{AMBER, BACKGROUND, GREEN, draw};
