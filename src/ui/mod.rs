//! Terminal user interface: rendering, input handling, and the
//! navigation gate that keeps the displayed screen group consistent
//! with the session state.

pub mod gate;
pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
