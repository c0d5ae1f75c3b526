//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, surfaces and overlays
//! - `input`: keyboard and mouse handling
//! - `styles`: colours and text styles
//! - `views`: line builders for each view's content

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
