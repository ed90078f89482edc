//! Page-meter readings and their statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative page counters read off a device on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterReading {
    pub date: NaiveDate,
    pub printed_pages: u64,
    pub copied_pages: u64,
}

/// Which counter a statistic is computed over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    Printed,
    Copied,
}

impl MeterReading {
    pub fn value(&self, kind: MeterKind) -> u64 {
        match kind {
            MeterKind::Printed => self.printed_pages,
            MeterKind::Copied => self.copied_pages,
        }
    }
}

/// Total and rounded average of a run of period differences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub total: i64,
    pub average: i64,
}

/// Differences between successive readings (ordered by date).
///
/// The first reading has no predecessor and contributes 0, so the output has
/// the same length as the input.
pub fn period_differences(readings: &[MeterReading], kind: MeterKind) -> Vec<i64> {
    readings
        .iter()
        .enumerate()
        .map(|(i, r)| match i {
            0 => 0,
            _ => r.value(kind) as i64 - readings[i - 1].value(kind) as i64,
        })
        .collect()
}

/// Stats over the last `periods` differences.
///
/// The average rounds half toward positive infinity, so `-2.5` becomes `-2`
/// and `2.5` becomes `3`.
pub fn period_stats(readings: &[MeterReading], periods: usize, kind: MeterKind) -> PeriodStats {
    let diffs = period_differences(readings, kind);
    let recent = &diffs[diffs.len().saturating_sub(periods)..];

    let total: i64 = recent.iter().sum();
    let average = if recent.is_empty() {
        0
    } else {
        (total as f64 / recent.len() as f64 + 0.5).floor() as i64
    };

    PeriodStats { total, average }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(month: u32, printed: u64, copied: u64) -> MeterReading {
        MeterReading {
            date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            printed_pages: printed,
            copied_pages: copied,
        }
    }

    fn readings() -> Vec<MeterReading> {
        vec![
            reading(1, 1000, 200),
            reading(2, 1500, 260),
            reading(3, 2300, 300),
            reading(4, 2600, 420),
        ]
    }

    #[test]
    fn first_difference_is_zero() {
        assert_eq!(
            period_differences(&readings(), MeterKind::Printed),
            vec![0, 500, 800, 300]
        );
        assert_eq!(
            period_differences(&readings(), MeterKind::Copied),
            vec![0, 60, 40, 120]
        );
    }

    #[test]
    fn stats_cover_the_last_n_periods() {
        let stats = period_stats(&readings(), 3, MeterKind::Printed);
        assert_eq!(stats, PeriodStats { total: 1600, average: 533 });
    }

    #[test]
    fn window_longer_than_history_includes_leading_zero() {
        let stats = period_stats(&readings(), 12, MeterKind::Copied);
        assert_eq!(stats.total, 220);
        assert_eq!(stats.average, 55);
    }

    #[test]
    fn average_rounds_halves_upward() {
        // A back-dated reading can leave a negative difference.
        let reset = vec![reading(1, 100, 10), reading(2, 95, 15)];
        assert_eq!(
            period_stats(&reset, 2, MeterKind::Printed),
            PeriodStats { total: -5, average: -2 }
        );
        assert_eq!(
            period_stats(&reset, 2, MeterKind::Copied),
            PeriodStats { total: 5, average: 3 }
        );
    }

    #[test]
    fn empty_history_yields_zeroes() {
        assert_eq!(
            period_stats(&[], 6, MeterKind::Printed),
            PeriodStats { total: 0, average: 0 }
        );
    }
}
