/*!
Small helpers for choosing and bounding points in time.

A [`DateRule`] decides which date a point in time belongs to. The only rule
provided here is [`TodayDateRule`], but callers may implement their own, for
example to roll over to the next date at 17:00 in New York.

The [`min`], [`max`] and [`between`] functions work with every point type,
and compare nanosecond counts only.
*/

use crate::{arith::Point, civil::NanoDate, civil::NanoDateTime};

/// A rule deciding which date a datetime belongs to.
pub trait DateRule {
    fn apply(&self, datetime: &NanoDateTime) -> NanoDate;
}

/// The rule that a datetime belongs to its own date, in UTC.
///
/// # Example
///
/// ```
/// use nanotemporals::{rule::{DateRule, TodayDateRule}, NanoDateTime};
///
/// let dt = NanoDateTime::parse("2019.05.21T23:59:59.999")?;
/// assert_eq!(TodayDateRule.apply(&dt).to_string(), "2019.05.21");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TodayDateRule;

impl DateRule for TodayDateRule {
    fn apply(&self, datetime: &NanoDateTime) -> NanoDate {
        datetime.date()
    }
}

/// Returns the earlier of two points, or `right` when they are equal.
pub fn min<P: Point>(left: &P, right: &P) -> P {
    if left.nanoseconds() < right.nanoseconds() {
        left.clone()
    } else {
        right.clone()
    }
}

/// Returns the later of two points, or `left` when they are equal.
pub fn max<P: Point>(left: &P, right: &P) -> P {
    if right.nanoseconds() > left.nanoseconds() {
        right.clone()
    } else {
        left.clone()
    }
}

/// Returns true when `point` lies in the half open range `lower..upper`.
///
/// # Example
///
/// ```
/// use nanotemporals::{rule, NanoTime};
///
/// let lower = NanoTime::parse("09:00:00.000")?;
/// let upper = NanoTime::parse("17:00:00.000")?;
/// assert!(rule::between(&lower, &lower, &upper));
/// assert!(!rule::between(&upper, &lower, &upper));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn between<P: Point>(point: &P, lower: &P, upper: &P) -> bool {
    lower.nanoseconds() <= point.nanoseconds()
        && point.nanoseconds() < upper.nanoseconds()
}
