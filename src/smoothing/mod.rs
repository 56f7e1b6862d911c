//! Noise suppression for daily vegetation-index series.

mod savgol;

pub use savgol::{effective_window, savgol_coefficients, savgol_filter};
