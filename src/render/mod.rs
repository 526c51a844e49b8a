//! Presentation: styles, line rendering and the terminal display.

pub mod display;
pub mod renderer;
pub mod styles;
