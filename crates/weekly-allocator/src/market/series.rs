//! Series Arithmetic
//!
//! Week window, as-of lookups and percent changes over dated observations.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AllocatorError, Result};

/// One dated value of a price or macro series
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// The trading week a run looks back on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub today: NaiveDate,
    pub last_monday: NaiveDate,
    pub last_friday: NaiveDate,
}

impl WeekWindow {
    /// Runs are scheduled on Mondays, so "last Monday" is a week back and
    /// "last Friday" three days back.
    pub fn ending(today: NaiveDate) -> Self {
        Self {
            today,
            last_monday: days_before(today, 7),
            last_friday: days_before(today, 3),
        }
    }
}

pub fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// `(latest - previous) / previous * 100`
pub fn percent_change(previous: f64, latest: f64) -> Result<f64> {
    if !previous.is_finite() || !latest.is_finite() {
        return Err(AllocatorError::InvalidInput(format!(
            "percent change over non-finite values ({previous} -> {latest})"
        )));
    }
    if previous == 0.0 {
        return Err(AllocatorError::InvalidInput(
            "percent change from a previous value of zero".into(),
        ));
    }
    Ok((latest - previous) / previous * 100.0)
}

/// Value of the latest observation on or before `date`
///
/// `observations` must be sorted by date.
pub fn value_asof(observations: &[Observation], date: NaiveDate) -> Result<f64> {
    let idx = observations.partition_point(|o| o.date <= date);
    if idx == 0 {
        return Err(AllocatorError::InvalidInput(format!(
            "no observation on or before {date}"
        )));
    }
    Ok(observations[idx - 1].value)
}

/// Percent change between the as-of values at `from` and `to`
pub fn change_between(observations: &[Observation], from: NaiveDate, to: NaiveDate) -> Result<f64> {
    percent_change(value_asof(observations, from)?, value_asof(observations, to)?)
}

/// Percent change between the last two observations
pub fn latest_change(observations: &[Observation]) -> Result<f64> {
    match observations {
        [.., previous, latest] => percent_change(previous.value, latest.value),
        _ => Err(AllocatorError::InvalidInput(format!(
            "need two observations, have {}",
            observations.len()
        ))),
    }
}

/// Percent change from the first to the last observation, rounded to cents
pub fn period_change(observations: &[Observation]) -> Result<f64> {
    let (Some(first), Some(last)) = (observations.first(), observations.last()) else {
        return Err(AllocatorError::InvalidInput("empty price series".into()));
    };
    let change = percent_change(first.value, last.value)?;
    Ok((change * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> Vec<Observation> {
        points.iter().map(|(date, v)| Observation::new(d(date), *v)).collect()
    }

    #[test]
    fn test_week_window() {
        let window = WeekWindow::ending(d("2024-06-17"));
        assert_eq!(window.last_monday, d("2024-06-10"));
        assert_eq!(window.last_friday, d("2024-06-14"));
    }

    #[test]
    fn test_percent_change() {
        assert_relative_eq!(percent_change(100.0, 105.0).unwrap(), 5.0);
        assert_relative_eq!(percent_change(4.0, 3.0).unwrap(), -25.0);
    }

    #[test]
    fn test_percent_change_rejects_zero_base() {
        assert!(matches!(
            percent_change(0.0, 1.0),
            Err(AllocatorError::InvalidInput(_))
        ));
        assert!(percent_change(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_value_asof_uses_prior_observation() {
        let obs = series(&[("2024-06-07", 104.0), ("2024-06-11", 105.0), ("2024-06-14", 106.0)]);
        // Monday the 10th had no print; Friday's value carries
        assert_eq!(value_asof(&obs, d("2024-06-10")).unwrap(), 104.0);
        assert_eq!(value_asof(&obs, d("2024-06-14")).unwrap(), 106.0);
        assert!(value_asof(&obs, d("2024-06-01")).is_err());
    }

    #[test]
    fn test_change_between() {
        let obs = series(&[("2024-06-10", 4.0), ("2024-06-12", 4.1), ("2024-06-14", 4.2)]);
        let change = change_between(&obs, d("2024-06-10"), d("2024-06-14")).unwrap();
        assert_relative_eq!(change, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_latest_change() {
        let obs = series(&[("2024-03-01", 20_000.0), ("2024-04-01", 20_100.0), ("2024-05-01", 20_301.0)]);
        assert_relative_eq!(latest_change(&obs).unwrap(), 1.0, epsilon = 1e-9);
        assert!(latest_change(&obs[..1]).is_err());
    }

    #[test]
    fn test_period_change_rounds() {
        let obs = series(&[("2024-06-10", 30.0), ("2024-06-13", 31.0)]);
        assert_eq!(period_change(&obs).unwrap(), 3.33);
        assert!(period_change(&[]).is_err());
    }
}
