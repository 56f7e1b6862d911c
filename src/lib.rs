//! # greenwave
//!
//! Extraction of land-surface vegetation phenology transition dates from a
//! noisy, gap-filled daily vegetation-index time series — one location,
//! one year, one pass.
//!
//! The pipeline regularizes a sparse date-keyed series onto a complete
//! daily grid, suppresses noise with a Savitzky-Golay filter, fits a
//! double-logistic seasonal curve by bounded least squares, differentiates
//! the fit numerically, and scans the third derivative for six transition
//! events: SOS/MOS/EOS for the spring growth pulse and SOF/MOF/EOF for the
//! autumn senescence pulse. Detected indices map back to calendar dates
//! through the regularized series.
//!
//! Acquisition (imagery querying, cloud masking, spatial reduction) and
//! presentation (plotting) are the caller's concern: input is a mapping
//! from calendar date to optional index value, output is the fitted curve,
//! its derivatives, and six optional (day-index, date) pairs.
//!
//! ```
//! use chrono::NaiveDate;
//! use greenwave::prelude::*;
//! use std::collections::BTreeMap;
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
//!
//! // A clean synthetic annual cycle observed every third day.
//! let observations: BTreeMap<_, _> = (0..365)
//!     .step_by(3)
//!     .map(|i| {
//!         let x = i as f64;
//!         let spring = 0.6 / (1.0 + (-0.07 * (x - 110.0)).exp()) + 0.2;
//!         let autumn = 1.0 + 0.7 / (1.0 + (0.08 * (x - 280.0)).exp());
//!         (
//!             start + chrono::Days::new(i as u64),
//!             Some(spring * autumn),
//!         )
//!     })
//!     .collect();
//!
//! let output = run_phenology(start, end, &observations, &PhenologyConfig::default()).unwrap();
//! assert_eq!(output.fitted.len(), 365);
//! if let Some(date) = output.transitions.sos.date {
//!     println!("start of season: {date}");
//! }
//! ```

pub mod core;
pub mod derivative;
pub mod detection;
pub mod error;
pub mod fit;
pub mod pipeline;
pub mod smoothing;

pub use error::{PhenologyError, Result};

pub mod prelude {
    pub use crate::core::DailySeries;
    pub use crate::detection::{SearchWindows, TransitionIndices};
    pub use crate::error::{PhenologyError, Result};
    pub use crate::fit::FitParameters;
    pub use crate::pipeline::{
        run_phenology, run_phenology_on, PhenologyConfig, PhenologyOutput, TransitionEvent,
        Transitions,
    };
}
