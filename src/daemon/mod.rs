//! Run loop: tick scheduler, process runner and signal-driven style state.

pub mod loop_main;
pub mod runner;
pub mod signals;
