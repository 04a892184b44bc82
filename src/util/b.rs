/*!
A module for constants and bounds checks on primitive integers.
*/

use crate::Error;

pub(crate) const NANOS_PER_MICRO: i64 = 1_000;
pub(crate) const NANOS_PER_MILLI: i64 = 1_000_000;
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
pub(crate) const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
pub(crate) const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

macro_rules! define_bounds {
    ($((
        $name:ident,
        $ty:ty,
        $what:expr,
        $min:expr,
        $max:expr $(,)?
    )),* $(,)?) => {
        $(
            pub(crate) struct $name(());

            impl $name {
                pub(crate) const WHAT: &'static str = $what;
                pub(crate) const MIN: $ty = $min;
                pub(crate) const MAX: $ty = $max;

                /// Converts the integer provided into this bound's primitive
                /// representation, or returns a range error naming the
                /// offending value.
                #[inline(always)]
                pub(crate) fn check(n: impl Into<i64>) -> Result<$ty, Error> {
                    let n = n.into();
                    if !(i64::from(Self::MIN) <= n
                        && n <= i64::from(Self::MAX))
                    {
                        return Err(Self::error(n));
                    }
                    // OK because we just checked that `n` fits.
                    Ok(n as $ty)
                }

                #[cold]
                #[inline(never)]
                fn error(given: i64) -> Error {
                    Error::range(Self::WHAT, given, Self::MIN, Self::MAX)
                }
            }
        )*
    }
}

define_bounds! {
    (Day, i8, "day", 1, 31),
    (Hour, i8, "hour", 0, 23),
    (Hour12, i8, "hour (12 hour clock)", 1, 12),
    (Hour24, i8, "hour (1-24 clock)", 1, 24),
    (Hour11, i8, "hour (0-11 clock)", 0, 11),
    (Millisecond, i16, "millisecond", 0, 999),
    (Minute, i8, "minute", 0, 59),
    (Month, i8, "month", 1, 12),
    (Second, i8, "second", 0, 59),
    (Year, i16, "year", 1900, 2262),
    // The range of nanoseconds a `NanoDateTime` supports. The lower bound is
    // 1900-01-01T00:00:00Z and the upper bound is the largest 64-bit count,
    // which lands on 2262-04-11T23:47:16.854775807Z.
    (EpochNanoseconds, i64, "epoch nanoseconds", -2_208_988_800_000_000_000, i64::MAX),
    (NanosecondsSinceMidnight, i64, "nanoseconds since midnight", 0, NANOS_PER_DAY),
}

/// Splits `nanos` into a whole number of milliseconds and a sub-millisecond
/// remainder in the range `0..1_000_000`.
///
/// The split is Euclidean, so that `millis * 1_000_000 + remainder == nanos`
/// even when `nanos` is negative.
#[inline(always)]
pub(crate) fn split_millis(nanos: i64) -> (i64, i64) {
    (nanos.div_euclid(NANOS_PER_MILLI), nanos.rem_euclid(NANOS_PER_MILLI))
}

/// The inverse of `split_millis`.
///
/// This returns `None` on overflow.
#[inline(always)]
pub(crate) fn join_millis(millis: i64, remainder: i64) -> Option<i64> {
    let nanos = i128::from(millis) * i128::from(NANOS_PER_MILLI)
        + i128::from(remainder);
    i64::try_from(nanos).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_check() {
        assert_eq!(Month::check(12).unwrap(), 12);
        assert!(Month::check(0).unwrap_err().is_range());
        assert_eq!(
            Month::check(13).unwrap_err().to_string(),
            "parameter 'month' with value 13 \
             is not in the required range of 1..=12",
        );
        assert!(EpochNanoseconds::check(i64::MIN).is_err());
        assert_eq!(EpochNanoseconds::check(i64::MAX).unwrap(), i64::MAX);
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_millis(1_357_000_357), (1_357, 357));
        assert_eq!(split_millis(-1), (-1, 999_999));
        assert_eq!(join_millis(-1, 999_999), Some(-1));
        assert_eq!(join_millis(i64::MAX, 0), None);
    }

    quickcheck::quickcheck! {
        fn prop_split_join_roundtrip(nanos: i64) -> bool {
            let (millis, rem) = split_millis(nanos);
            (0..NANOS_PER_MILLI).contains(&rem)
                && join_millis(millis, rem) == Some(nanos)
        }
    }
}
