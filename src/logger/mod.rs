//! Output side channels: the JSONL activity log and the tab-separated trace.

pub mod jsonl;
pub mod trace;
