//! Regularized daily vegetation-index series.

use crate::error::{PhenologyError, Result};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// A complete daily series over a contiguous calendar-date range.
///
/// Day-index 0 corresponds to the start date; index `i` maps one-to-one to
/// `start + i` days. Every position holds a finite value once constructed
/// through [`DailySeries::regularize`].
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Build a complete daily series from sparse observations.
    ///
    /// `observations` maps calendar dates to optional index values; `None`
    /// marks an observation discarded upstream (e.g. clouded). Dates outside
    /// `[start, end]` are ignored. Interior gaps are filled by linear
    /// interpolation between the nearest known neighbors; gaps touching
    /// either edge are filled with the nearest available value.
    ///
    /// # Errors
    /// * `InvalidParameter` if `end` precedes `start`.
    /// * `DataInsufficient` if no finite observation falls inside the range.
    pub fn regularize(
        start: NaiveDate,
        end: NaiveDate,
        observations: &BTreeMap<NaiveDate, Option<f64>>,
    ) -> Result<Self> {
        let span = end.signed_duration_since(start).num_days();
        if span < 0 {
            return Err(PhenologyError::InvalidParameter(
                "end date precedes start date".to_string(),
            ));
        }
        let n = span as usize + 1;

        let mut values = vec![f64::NAN; n];
        for (date, value) in observations.range(start..=end) {
            if let Some(v) = value {
                if v.is_finite() {
                    let idx = date.signed_duration_since(start).num_days() as usize;
                    values[idx] = *v;
                }
            }
        }

        if values.iter().all(|v| v.is_nan()) {
            return Err(PhenologyError::DataInsufficient);
        }

        interpolate_gaps(&mut values);

        Ok(Self { start, values })
    }

    /// Wrap an already-complete daily sequence.
    ///
    /// # Errors
    /// `DataInsufficient` if `values` is empty, `InvalidParameter` if any
    /// value is non-finite.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PhenologyError::DataInsufficient);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PhenologyError::InvalidParameter(
                "daily values must be finite".to_string(),
            ));
        }
        Ok(Self { start, values })
    }

    /// Number of days in the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Daily values in day-index order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a specific day-index.
    pub fn value_at(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(PhenologyError::IndexOutOfBounds {
                index,
                size: self.values.len(),
            })
    }

    /// First calendar date of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar date of the range.
    pub fn end(&self) -> NaiveDate {
        // Non-empty by construction.
        self.date_at(self.values.len().saturating_sub(1))
            .unwrap_or(self.start)
    }

    /// Map a day-index to its calendar date.
    ///
    /// Returns `None` for indices at or beyond the series length, guarding
    /// against event indices produced outside the covered range.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.values.len() {
            return None;
        }
        self.start.checked_add_days(Days::new(index as u64))
    }
}

/// Fill NaN gaps in place: linear interpolation between known neighbors,
/// nearest-value fill at both edges.
fn interpolate_gaps(values: &mut [f64]) {
    let n = values.len();
    let mut i = 0;
    while i < n {
        if !values[i].is_nan() {
            i += 1;
            continue;
        }

        let gap_start = i;
        while i < n && values[i].is_nan() {
            i += 1;
        }
        let gap_end = i;

        let left = if gap_start > 0 {
            Some(values[gap_start - 1])
        } else {
            None
        };
        let right = if gap_end < n { Some(values[gap_end]) } else { None };

        match (left, right) {
            (Some(l), Some(r)) => {
                // Gap spans (gap_end - gap_start + 1) segments between anchors.
                let segments = (gap_end - gap_start + 1) as f64;
                for (j, idx) in (gap_start..gap_end).enumerate() {
                    let t = (j + 1) as f64 / segments;
                    values[idx] = l + t * (r - l);
                }
            }
            (Some(l), None) => values[gap_start..gap_end].fill(l),
            (None, Some(r)) => values[gap_start..gap_end].fill(r),
            // All-NaN input is rejected before interpolation.
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn observations(start: NaiveDate, values: &[Option<f64>]) -> BTreeMap<NaiveDate, Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Days::new(i as u64), *v))
            .collect()
    }

    #[test]
    fn complete_input_is_returned_unchanged() {
        let start = date(2023, 1, 1);
        let obs = observations(start, &[Some(0.2), Some(0.3), Some(0.4), Some(0.5)]);

        let series = DailySeries::regularize(start, date(2023, 1, 4), &obs).unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.values(), &[0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn single_gap_is_position_weighted_average() {
        let start = date(2023, 1, 1);
        let obs = observations(start, &[Some(0.2), None, Some(0.8)]);

        let series = DailySeries::regularize(start, date(2023, 1, 3), &obs).unwrap();

        assert_relative_eq!(series.values()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn multi_day_gap_interpolates_linearly() {
        let start = date(2023, 1, 1);
        let obs = observations(start, &[Some(1.0), None, None, None, Some(5.0)]);

        let series = DailySeries::regularize(start, date(2023, 1, 5), &obs).unwrap();

        assert_eq!(series.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn edges_are_filled_with_nearest_value() {
        let start = date(2023, 1, 1);
        let obs = observations(start, &[None, None, Some(0.4), Some(0.6), None]);

        let series = DailySeries::regularize(start, date(2023, 1, 5), &obs).unwrap();

        assert_eq!(series.values(), &[0.4, 0.4, 0.4, 0.6, 0.6]);
    }

    #[test]
    fn missing_dates_are_treated_as_gaps() {
        let start = date(2023, 1, 1);
        let mut obs = BTreeMap::new();
        obs.insert(date(2023, 1, 1), Some(1.0));
        obs.insert(date(2023, 1, 5), Some(5.0));

        let series = DailySeries::regularize(start, date(2023, 1, 5), &obs).unwrap();

        assert_eq!(series.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn out_of_range_observations_are_ignored() {
        let start = date(2023, 2, 1);
        let mut obs = BTreeMap::new();
        obs.insert(date(2023, 1, 15), Some(9.0));
        obs.insert(date(2023, 2, 1), Some(0.3));
        obs.insert(date(2023, 2, 2), Some(0.4));
        obs.insert(date(2023, 3, 20), Some(9.0));

        let series = DailySeries::regularize(start, date(2023, 2, 2), &obs).unwrap();

        assert_eq!(series.values(), &[0.3, 0.4]);
    }

    #[test]
    fn clouded_and_non_finite_observations_are_gaps() {
        let start = date(2023, 1, 1);
        let obs = observations(start, &[Some(1.0), None, Some(f64::NAN), Some(4.0)]);

        let series = DailySeries::regularize(start, date(2023, 1, 4), &obs).unwrap();

        assert_eq!(series.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn empty_range_fails_with_data_insufficient() {
        let start = date(2023, 1, 1);
        let obs = BTreeMap::new();

        let result = DailySeries::regularize(start, date(2023, 12, 31), &obs);
        assert_eq!(result, Err(PhenologyError::DataInsufficient));

        let obs = observations(start, &[None, None, Some(f64::INFINITY)]);
        let result = DailySeries::regularize(start, date(2023, 1, 3), &obs);
        assert_eq!(result, Err(PhenologyError::DataInsufficient));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let obs = BTreeMap::new();
        let result = DailySeries::regularize(date(2023, 6, 1), date(2023, 1, 1), &obs);
        assert!(matches!(result, Err(PhenologyError::InvalidParameter(_))));
    }

    #[test]
    fn date_mapping_is_contiguous_and_pure() {
        let start = date(2023, 1, 1);
        let series = DailySeries::from_values(start, vec![0.0; 365]).unwrap();

        assert_eq!(series.date_at(0), Some(date(2023, 1, 1)));
        assert_eq!(series.date_at(31), Some(date(2023, 2, 1)));
        assert_eq!(series.date_at(364), Some(date(2023, 12, 31)));
        assert_eq!(series.end(), date(2023, 12, 31));

        // Pure function of index: repeated calls agree.
        assert_eq!(series.date_at(120), series.date_at(120));
    }

    #[test]
    fn date_mapping_guards_out_of_range_indices() {
        let series = DailySeries::from_values(date(2023, 1, 1), vec![0.0; 10]).unwrap();

        assert_eq!(series.date_at(10), None);
        assert_eq!(series.date_at(usize::MAX), None);
    }

    #[test]
    fn value_access_is_bounds_checked() {
        let series = DailySeries::from_values(date(2023, 1, 1), vec![0.1, 0.2]).unwrap();

        assert_eq!(series.value_at(1), Ok(0.2));
        assert_eq!(
            series.value_at(2),
            Err(PhenologyError::IndexOutOfBounds { index: 2, size: 2 })
        );
    }

    #[test]
    fn from_values_validates_input() {
        assert_eq!(
            DailySeries::from_values(date(2023, 1, 1), vec![]),
            Err(PhenologyError::DataInsufficient)
        );
        assert!(matches!(
            DailySeries::from_values(date(2023, 1, 1), vec![1.0, f64::NAN]),
            Err(PhenologyError::InvalidParameter(_))
        ));
    }
}
