use chrono::{DateTime, Utc};

use printfleet_core::months_between;

use crate::error::ForecastError;

/// Lookback window measured in calendar months back from "now".
///
/// An event is inside the window when its calendar-month distance to now is
/// at most `months`. Day of month is ignored, so with a 3-month window on
/// 2024-06-30 everything from 2024-03-01 on counts. Events dated in a later
/// month than now have a negative distance and are inside too.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LookbackWindow {
    months: u64,
}

impl LookbackWindow {
    /// Only `months <= 0` is rejected; any positive length is a valid window.
    pub fn new(months: i64) -> Result<Self, ForecastError> {
        match u64::try_from(months) {
            Ok(months) if months > 0 => Ok(Self { months }),
            _ => Err(ForecastError::InvalidArgument(format!(
                "lookback_months must be positive (got {months})"
            ))),
        }
    }

    pub fn months(&self) -> u64 {
        self.months
    }

    pub fn contains(&self, now: &DateTime<Utc>, at: &DateTime<Utc>) -> bool {
        let months = i64::try_from(self.months).unwrap_or(i64::MAX);
        months_between(at, now) <= months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn non_positive_months_are_invalid() {
        assert!(matches!(LookbackWindow::new(0), Err(ForecastError::InvalidArgument(_))));
        assert!(matches!(LookbackWindow::new(-3), Err(ForecastError::InvalidArgument(_))));
    }

    #[test]
    fn very_long_windows_are_accepted() {
        let window = LookbackWindow::new(5_000_000_000).unwrap();
        assert_eq!(window.months(), 5_000_000_000);
        assert!(window.contains(&at(2024, 6, 1), &at(1990, 1, 1)));
    }

    #[test]
    fn boundary_month_counts_regardless_of_day() {
        let window = LookbackWindow::new(3).unwrap();
        let now = at(2024, 6, 30);

        assert!(window.contains(&now, &at(2024, 3, 1)));
        assert!(!window.contains(&now, &at(2024, 2, 29)));
    }

    #[test]
    fn future_months_are_inside() {
        let window = LookbackWindow::new(1).unwrap();
        assert!(window.contains(&at(2024, 6, 1), &at(2024, 9, 1)));
    }
}
