//! Phenology transition detection.
//!
//! This module provides the six rule-based scans that turn the fitted
//! curve's third derivative into discrete seasonal transition indices:
//! SOS/MOS/EOS for the spring growth pulse, SOF/MOF/EOF for the autumn
//! senescence pulse.

mod transitions;

pub use transitions::{
    detect_transitions, end_of_fall, end_of_season, middle_of_fall, middle_of_season,
    start_of_fall, start_of_season, SearchWindows, TransitionIndices,
};
