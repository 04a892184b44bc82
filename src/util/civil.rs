/*!
Conversions between nanosecond counts and UTC calendar fields.

These routines never consult a calendar engine. They only apply to the UTC
reading of a nanosecond count, which is how dates (zoned or not) and unzoned
datetimes carry their fields. They assume their inputs are within the range
of a `NanoDateTime`.
*/

use jiff::civil::Weekday;

use crate::util::b;

/// A Gregorian calendar date.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub(crate) struct Ymd {
    pub(crate) year: i16,
    pub(crate) month: i8,
    pub(crate) day: i8,
}

impl Ymd {
    /// Converts days since the Unix epoch to a Gregorian date.
    ///
    /// This is Neri-Schneider. There's no branching or divisions.
    ///
    /// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L40C3-L40C34>
    #[inline(always)]
    #[allow(non_upper_case_globals, non_snake_case)] // to mimic source
    pub(crate) const fn from_epoch_day(epoch_day: i32) -> Ymd {
        const s: u32 = 82;
        const K: u32 = 719468 + 146097 * s;
        const L: u32 = 400 * s;

        let N_U = epoch_day as u32;
        let N = N_U.wrapping_add(K);

        let N_1 = 4 * N + 3;
        let C = N_1 / 146097;
        let N_C = (N_1 % 146097) / 4;

        let N_2 = 4 * N_C + 3;
        let P_2 = 2939745 * (N_2 as u64);
        let Z = (P_2 / 4294967296) as u32;
        let N_Y = (P_2 % 4294967296) as u32 / 2939745 / 4;
        let Y = 100 * C + Z;

        let N_3 = 2141 * N_Y + 197913;
        let M = N_3 / 65536;
        let D = (N_3 % 65536) / 2141;

        let J = N_Y >= 306;
        let year = Y.wrapping_sub(L).wrapping_add(J as u32) as i16;
        let month = (if J { M - 12 } else { M }) as i8;
        let day = (D + 1) as i8;
        Ymd { year, month, day }
    }

    /// Converts a Gregorian date to days since the Unix epoch.
    ///
    /// This is Neri-Schneider. There's no branching or divisions.
    ///
    /// Ref: <https://github.com/cassioneri/eaf/blob/684d3cc32d14eee371d0abe4f683d6d6a49ed5c1/algorithms/neri_schneider.hpp#L83>
    #[inline(always)]
    #[allow(non_upper_case_globals, non_snake_case)] // to mimic source
    pub(crate) const fn to_epoch_day(&self) -> i32 {
        const s: u32 = 82;
        const K: u32 = 719468 + 146097 * s;
        const L: u32 = 400 * s;

        let year = self.year as u32;
        let month = self.month as u32;
        let day = self.day as u32;

        let J = month <= 2;
        let Y = year.wrapping_add(L).wrapping_sub(J as u32);
        let M = if J { month + 12 } else { month };
        let D = day - 1;
        let C = Y / 100;

        let y_star = 1461 * Y / 4 - C + C / 4;
        let m_star = (979 * M - 2919) / 32;
        let N = y_star + m_star + D;

        N.wrapping_sub(K) as i32
    }

    /// Returns the date of the given nanoseconds since the Unix epoch, in
    /// UTC.
    pub(crate) fn from_nanoseconds(nanos: i64) -> Ymd {
        Ymd::from_epoch_day(epoch_day(nanos))
    }

    /// Returns the day of the year, starting at `1`.
    pub(crate) fn day_of_year(&self) -> i16 {
        let start = Ymd { year: self.year, month: 1, day: 1 };
        // OK because a year has at most 366 days.
        (self.to_epoch_day() - start.to_epoch_day() + 1) as i16
    }
}

/// Returns the days since the Unix epoch of the given nanoseconds since
/// the Unix epoch, rounding toward negative infinity.
pub(crate) fn epoch_day(nanos: i64) -> i32 {
    // OK because i64::MAX nanoseconds is only about 106,751 days.
    nanos.div_euclid(b::NANOS_PER_DAY) as i32
}

/// Returns the day of the week of the given days since the Unix epoch.
pub(crate) fn weekday(epoch_day: i32) -> Weekday {
    // 1970-01-01 was a Thursday.
    Weekday::Thursday.wrapping_add(epoch_day)
}

/// Returns true if and only if the given year is a leap year.
///
/// A leap year is a year with 366 days. Typical years have 365 days.
#[inline]
pub(crate) const fn is_leap_year(year: i16) -> bool {
    // From: https://github.com/BurntSushi/jiff/pull/23
    let d = if year % 25 != 0 { 4 } else { 16 };
    (year % d) == 0
}

/// The wall clock fields of a time of day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Hms {
    /// In the range `0..=24`, where `24` only appears at the very end of a
    /// day.
    pub(crate) hour: i8,
    pub(crate) minute: i8,
    pub(crate) second: i8,
    pub(crate) subsec_nanosecond: i32,
}

impl Hms {
    /// Splits nanoseconds since midnight into clock fields.
    pub(crate) fn from_nanoseconds(nanos: i64) -> Hms {
        // Each cast is OK because the input is at most one day.
        Hms {
            hour: (nanos / b::NANOS_PER_HOUR) as i8,
            minute: (nanos % b::NANOS_PER_HOUR / b::NANOS_PER_MINUTE) as i8,
            second: (nanos % b::NANOS_PER_MINUTE / b::NANOS_PER_SECOND) as i8,
            subsec_nanosecond: (nanos % b::NANOS_PER_SECOND) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_in_month(year: i16, month: i8) -> i8 {
        if month == 2 {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        } else {
            30 | (month ^ month >> 3)
        }
    }

    #[test]
    fn roundtrip_epochday_date() {
        for year in 1900..=2262 {
            for month in 1..=12 {
                for day in 1..=days_in_month(year, month) {
                    let date = Ymd { year, month, day };
                    let epoch_day = date.to_epoch_day();
                    assert_eq!(date, Ymd::from_epoch_day(epoch_day));
                }
            }
        }
    }

    #[test]
    fn nanoseconds() {
        let ymd = Ymd { year: 1900, month: 1, day: 1 };
        assert_eq!(
            i64::from(ymd.to_epoch_day()) * b::NANOS_PER_DAY,
            -2_208_988_800_000_000_000,
        );
        assert_eq!(
            Ymd::from_nanoseconds(i64::MAX),
            Ymd { year: 2262, month: 4, day: 11 },
        );
        assert_eq!(
            Ymd::from_nanoseconds(-1),
            Ymd { year: 1969, month: 12, day: 31 },
        );
        assert_eq!(Ymd { year: 2019, month: 5, day: 21 }.day_of_year(), 141);
        assert_eq!(Ymd { year: 2020, month: 12, day: 31 }.day_of_year(), 366);
    }

    #[test]
    fn weekdays() {
        assert_eq!(weekday(0), Weekday::Thursday);
        assert_eq!(weekday(-1), Weekday::Wednesday);
        let day = Ymd { year: 2019, month: 5, day: 21 }.to_epoch_day();
        assert_eq!(weekday(day), Weekday::Tuesday);
    }

    #[test]
    fn clock_fields() {
        let hms = Hms::from_nanoseconds(67_507_345_920_678);
        assert_eq!(
            hms,
            Hms {
                hour: 18,
                minute: 45,
                second: 7,
                subsec_nanosecond: 345_920_678,
            },
        );
        assert_eq!(Hms::from_nanoseconds(b::NANOS_PER_DAY).hour, 24);
    }

    #[test]
    fn leap_year() {
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2001));
        assert!(is_leap_year(2004));
    }
}
