//! End-to-end phenology extraction pipeline.
//!
//! Stages run strictly in order — regularize, smooth, fit, differentiate,
//! detect, map dates — and the first stage error aborts the run, so a bad
//! fit never propagates into derivative or detection stages. The whole
//! pipeline is a pure function of its inputs: single-threaded, no shared
//! state, deterministic given the data-derived initial guess.

use crate::core::DailySeries;
use crate::derivative::{gradient, third_derivative};
use crate::detection::{detect_transitions, SearchWindows, TransitionIndices};
use crate::error::Result;
use crate::fit::{fit_double_logistic, FitConfig, FitParameters};
use crate::smoothing::savgol_filter;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Configuration for a phenology extraction run.
#[derive(Debug, Clone)]
pub struct PhenologyConfig {
    /// Savitzky-Golay window length (forced odd, reduced for short series).
    pub window_length: usize,
    /// Savitzky-Golay polynomial order.
    pub poly_order: usize,
    /// Day-index search windows for the six transition scans.
    pub windows: SearchWindows,
    /// Curve-fit settings.
    pub fit: FitConfig,
}

impl Default for PhenologyConfig {
    fn default() -> Self {
        Self {
            window_length: 51,
            poly_order: 3,
            windows: SearchWindows::default(),
            fit: FitConfig::default(),
        }
    }
}

impl PhenologyConfig {
    /// Set the smoothing window length.
    pub fn with_window_length(mut self, window_length: usize) -> Self {
        self.window_length = window_length;
        self
    }

    /// Set the smoothing polynomial order.
    pub fn with_poly_order(mut self, poly_order: usize) -> Self {
        self.poly_order = poly_order;
        self
    }

    /// Set the transition search windows.
    pub fn with_windows(mut self, windows: SearchWindows) -> Self {
        self.windows = windows;
        self
    }
}

/// A single detected transition: the day-index found by the scan and the
/// calendar date it maps to. `date` is `None` when no index was found or
/// the index falls outside the covered date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    pub index: Option<usize>,
    pub date: Option<NaiveDate>,
}

impl TransitionEvent {
    fn resolve(index: Option<usize>, series: &DailySeries) -> Self {
        Self {
            index,
            date: index.and_then(|i| series.date_at(i)),
        }
    }
}

/// The six phenology transitions with resolved calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transitions {
    /// Start of (spring growth) season.
    pub sos: TransitionEvent,
    /// Middle of season.
    pub mos: TransitionEvent,
    /// End of season.
    pub eos: TransitionEvent,
    /// Start of fall (senescence).
    pub sof: TransitionEvent,
    /// Middle of fall.
    pub mof: TransitionEvent,
    /// End of fall.
    pub eof: TransitionEvent,
}

impl Transitions {
    fn resolve(indices: TransitionIndices, series: &DailySeries) -> Self {
        Self {
            sos: TransitionEvent::resolve(indices.sos, series),
            mos: TransitionEvent::resolve(indices.mos, series),
            eos: TransitionEvent::resolve(indices.eos, series),
            sof: TransitionEvent::resolve(indices.sof, series),
            mof: TransitionEvent::resolve(indices.mof, series),
            eof: TransitionEvent::resolve(indices.eof, series),
        }
    }
}

/// Full output of a phenology extraction run.
#[derive(Debug, Clone)]
pub struct PhenologyOutput {
    /// Regularized daily input series.
    pub series: DailySeries,
    /// Smoothed daily values.
    pub smoothed: Vec<f64>,
    /// Fitted double-logistic parameters.
    pub params: FitParameters,
    /// Fitted curve, one value per day.
    pub fitted: Vec<f64>,
    /// First derivative of the fitted curve.
    pub first_derivative: Vec<f64>,
    /// Third derivative of the fitted curve.
    pub third_derivative: Vec<f64>,
    /// Detected transition indices and dates.
    pub transitions: Transitions,
}

/// Extract phenology transitions from sparse observations over a date range.
///
/// `observations` maps calendar dates to optional vegetation-index values
/// (`None` marks discarded observations). See [`DailySeries::regularize`]
/// for the gap-filling rules.
pub fn run_phenology(
    start: NaiveDate,
    end: NaiveDate,
    observations: &BTreeMap<NaiveDate, Option<f64>>,
    config: &PhenologyConfig,
) -> Result<PhenologyOutput> {
    let series = DailySeries::regularize(start, end, observations)?;
    run_phenology_on(series, config)
}

/// Run the pipeline on an already-regularized daily series.
pub fn run_phenology_on(series: DailySeries, config: &PhenologyConfig) -> Result<PhenologyOutput> {
    let smoothed = savgol_filter(series.values(), config.window_length, config.poly_order)?;
    let fit = fit_double_logistic(&smoothed, &config.fit)?;

    let first_derivative = gradient(&fit.fitted);
    let d3 = third_derivative(&fit.fitted);

    let indices = detect_transitions(&d3, &config.windows);
    let transitions = Transitions::resolve(indices, &series);

    Ok(PhenologyOutput {
        series,
        smoothed,
        params: fit.params,
        fitted: fit.fitted,
        first_derivative,
        third_derivative: d3,
        transitions,
    })
}
