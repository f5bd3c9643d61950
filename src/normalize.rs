//! Pure construction of the canonical [`Series`] model.
//!
//! Both adapters funnel raw observations through [`build_series`] so that the
//! invariants (finite values, strictly ascending dates, derived `latest`)
//! hold no matter which upstream shape the data came from.

use crate::models::{Series, TimePoint};
use chrono::NaiveDate;

/// Fixed USD→EUR conversion rate applied to World Bank GDP figures.
///
/// A deliberate approximation: the map colors relative magnitude, so a live
/// FX feed would add a network dependency without changing the picture.
pub const USD_TO_EUR: f64 = 0.92;

/// Rebase a World Bank GDP observation (current US$, absolute) to the
/// canonical unit: million EUR.
pub fn gdp_usd_to_meur(value: f64) -> f64 {
    value * USD_TO_EUR / 1e6
}

/// Build a valid `Series` from raw observations: drop non-finite values,
/// sort ascending by date, keep the first observation per date, derive
/// `latest` from the final point. Returns `None` when nothing survives the
/// filter. Idempotent on already-normalized input.
pub fn build_series(raw: Vec<(NaiveDate, f64)>) -> Option<Series> {
    let mut points: Vec<TimePoint> = raw
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(date, value)| TimePoint { date, value })
        .collect();
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    let latest = points.last()?.value;
    Some(Series {
        latest,
        historical: points,
    })
}
