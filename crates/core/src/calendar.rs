//! Calendar-month arithmetic.
//!
//! Month distances here are coarse on purpose: only year and month take part,
//! the day of month and the time of day are ignored. Jan 31 → Feb 1 is one
//! month; Feb 1 → Feb 28 is zero.

use chrono::Datelike;

/// Calendar-month distance from `from` to `to`.
///
/// `(to.year - from.year) * 12 + (to.month - from.month)`. Negative when `to`
/// lies in an earlier month than `from`.
pub fn months_between<A, B>(from: &A, to: &B) -> i64
where
    A: Datelike,
    B: Datelike,
{
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months
}
