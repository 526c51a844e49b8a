//! Platform hooks used at startup.

pub mod process;
