//! Commute departure planning over the hourly forecast.
//!
//! For each candidate departure offset the planner picks the hour the
//! commute would fall into and reports its precipitation figures; the driest
//! slot wins.

use chrono::{Duration, NaiveDateTime};

use crate::types::{Condition, HourSample};

/// One scored departure option.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureSlot {
    /// Minutes from now.
    pub offset_minutes: i64,
    pub departure: NaiveDateTime,
    pub precipitation_mm: f64,
    pub precipitation_probability: Option<u8>,
    pub condition: Condition,
}

impl DepartureSlot {
    /// Ranking key: expected rain first, probability as tie-breaker.
    fn score(&self) -> (f64, u8) {
        (
            self.precipitation_mm,
            self.precipitation_probability.unwrap_or(0),
        )
    }

    pub fn is_dry(&self) -> bool {
        !self.condition.is_wet() && self.precipitation_mm == 0.0
    }
}

/// Score each candidate offset against the hourly series.
///
/// Offsets whose departure time falls outside the series are skipped, so the
/// result can be shorter than `offsets`.
pub fn plan_departures(
    hours: &[HourSample],
    now: NaiveDateTime,
    offsets: &[i64],
) -> Vec<DepartureSlot> {
    offsets
        .iter()
        .filter_map(|&offset_minutes| {
            let departure = now + Duration::minutes(offset_minutes);
            let hour = sample_for(hours, departure)?;
            Some(DepartureSlot {
                offset_minutes,
                departure,
                precipitation_mm: hour.precipitation_mm,
                precipitation_probability: hour.precipitation_probability,
                condition: hour.condition,
            })
        })
        .collect()
}

/// The driest of the scored slots, earliest wins on ties.
pub fn best_slot(slots: &[DepartureSlot]) -> Option<&DepartureSlot> {
    slots.iter().min_by(|a, b| {
        a.score()
            .partial_cmp(&b.score())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// The hour sample covering the given time.
fn sample_for(hours: &[HourSample], at: NaiveDateTime) -> Option<&HourSample> {
    hours
        .iter()
        .take_while(|h| h.time <= at)
        .last()
        .filter(|h| at - h.time < Duration::hours(1))
}
