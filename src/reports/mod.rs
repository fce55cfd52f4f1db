//! Rendering of reports and statistics for the console and as JSON.

pub mod console;
pub mod json;
