//! Core data structures for phenology extraction.

mod daily_series;

pub use daily_series::DailySeries;
