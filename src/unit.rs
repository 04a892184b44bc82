use crate::{
    delta::NanoTimeDelta,
    engine::CalendarField,
    error::unit::Error as E,
    util::b,
    Error,
};

/// A fixed-duration unit of time, from nanoseconds up to days.
///
/// Every unit has an exact length in nanoseconds. A day is always treated
/// as exactly 24 hours here. For the calendar notion of a day (which may be
/// 23 or 25 hours long across a DST transition), see
/// [`arith::plus_days`](crate::arith::plus_days).
///
/// Units are ordered from smallest to largest:
///
/// ```
/// use nanotemporals::TemporalUnit;
///
/// assert!(TemporalUnit::Day > TemporalUnit::Hour);
/// assert!(TemporalUnit::Nanosecond < TemporalUnit::Microsecond);
/// ```
///
/// # Parsing
///
/// A unit can be parsed from any of its aliases, without regard to case:
///
/// | Unit | Aliases |
/// |------|---------|
/// | nanosecond | `ns`, `nanos`, `nanosecond`, `nanoseconds` |
/// | microsecond | `us`, `micros`, `microsecond`, `microseconds` |
/// | millisecond | `ms`, `millis`, `millisecond`, `milliseconds` |
/// | second | `s`, `sec`, `second`, `seconds` |
/// | minute | `m`, `min`, `minute`, `minutes` |
/// | hour | `h`, `hour`, `hours` |
/// | day | `d`, `day`, `days` |
///
/// ```
/// use nanotemporals::TemporalUnit;
///
/// assert_eq!("ms".parse::<TemporalUnit>()?, TemporalUnit::Millisecond);
/// assert_eq!("Minutes".parse::<TemporalUnit>()?, TemporalUnit::Minute);
/// assert!("fortnight".parse::<TemporalUnit>().is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TemporalUnit {
    Nanosecond = 0,
    Microsecond = 1,
    Millisecond = 2,
    Second = 3,
    Minute = 4,
    Hour = 5,
    Day = 6,
}

impl TemporalUnit {
    /// All units, from smallest to largest.
    pub const ALL: [TemporalUnit; 7] = [
        TemporalUnit::Nanosecond,
        TemporalUnit::Microsecond,
        TemporalUnit::Millisecond,
        TemporalUnit::Second,
        TemporalUnit::Minute,
        TemporalUnit::Hour,
        TemporalUnit::Day,
    ];

    /// Returns the exact number of nanoseconds in one of this unit.
    pub const fn nanoseconds(self) -> i64 {
        match self {
            TemporalUnit::Nanosecond => 1,
            TemporalUnit::Microsecond => b::NANOS_PER_MICRO,
            TemporalUnit::Millisecond => b::NANOS_PER_MILLI,
            TemporalUnit::Second => b::NANOS_PER_SECOND,
            TemporalUnit::Minute => b::NANOS_PER_MINUTE,
            TemporalUnit::Hour => b::NANOS_PER_HOUR,
            TemporalUnit::Day => b::NANOS_PER_DAY,
        }
    }

    /// Returns how many whole `unit`s fit in one of this unit, truncating
    /// toward zero.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::TemporalUnit;
    ///
    /// assert_eq!(TemporalUnit::Day.whole(TemporalUnit::Hour), 24);
    /// assert_eq!(TemporalUnit::Hour.whole(TemporalUnit::Day), 0);
    /// ```
    pub const fn whole(self, unit: TemporalUnit) -> i64 {
        self.nanoseconds() / unit.nanoseconds()
    }

    /// Returns how many `unit`s fit in one of this unit, as a floating
    /// point number.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::TemporalUnit;
    ///
    /// assert_eq!(TemporalUnit::Hour.total(TemporalUnit::Day), 1.0 / 24.0);
    /// assert_eq!(TemporalUnit::Millisecond.total(TemporalUnit::Microsecond), 1000.0);
    /// ```
    pub fn total(self, unit: TemporalUnit) -> f64 {
        self.nanoseconds() as f64 / unit.nanoseconds() as f64
    }

    /// Returns a duration exactly one of this unit long.
    pub fn to_delta(self) -> NanoTimeDelta {
        NanoTimeDelta::from_nanoseconds(self.nanoseconds())
    }

    /// Returns the calendar engine field this unit corresponds to, if any.
    ///
    /// Units of a millisecond and up map onto a calendar field. A day maps
    /// onto the day of the month, which is the calendar notion of a day
    /// and may not be 24 hours long. Microseconds and nanoseconds have no
    /// calendar field.
    pub fn calendar_field(self) -> Option<CalendarField> {
        match self {
            TemporalUnit::Nanosecond | TemporalUnit::Microsecond => None,
            TemporalUnit::Millisecond => Some(CalendarField::Millisecond),
            TemporalUnit::Second => Some(CalendarField::Second),
            TemporalUnit::Minute => Some(CalendarField::Minute),
            TemporalUnit::Hour => Some(CalendarField::Hour),
            TemporalUnit::Day => Some(CalendarField::DayOfMonth),
        }
    }

    /// Returns the aliases this unit can be parsed from.
    ///
    /// The first alias is the canonical short form.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TemporalUnit::Nanosecond => {
                &["ns", "nanos", "nanosecond", "nanoseconds"]
            }
            TemporalUnit::Microsecond => {
                &["us", "micros", "microsecond", "microseconds"]
            }
            TemporalUnit::Millisecond => {
                &["ms", "millis", "millisecond", "milliseconds"]
            }
            TemporalUnit::Second => &["s", "sec", "second", "seconds"],
            TemporalUnit::Minute => &["m", "min", "minute", "minutes"],
            TemporalUnit::Hour => &["h", "hour", "hours"],
            TemporalUnit::Day => &["d", "day", "days"],
        }
    }

    /// Resolves an alias to its unit, without regard to ASCII case.
    ///
    /// Units are tried from largest to smallest. Since an alias must match
    /// the entire input, a short alias like `m` can never shadow a longer
    /// one like `ms`.
    pub fn from_alias(alias: &str) -> Result<TemporalUnit, Error> {
        TemporalUnit::ALL
            .iter()
            .rev()
            .copied()
            .find(|unit| {
                unit.aliases().iter().any(|a| a.eq_ignore_ascii_case(alias))
            })
            .ok_or_else(|| E::UnknownAlias { alias: alias.into() }.into())
    }

    /// A human readable singular description of this unit of time.
    pub(crate) fn singular(&self) -> &'static str {
        match *self {
            TemporalUnit::Nanosecond => "nanosecond",
            TemporalUnit::Microsecond => "microsecond",
            TemporalUnit::Millisecond => "millisecond",
            TemporalUnit::Second => "second",
            TemporalUnit::Minute => "minute",
            TemporalUnit::Hour => "hour",
            TemporalUnit::Day => "day",
        }
    }

    /// A human readable plural description of this unit of time.
    pub(crate) fn plural(&self) -> &'static str {
        match *self {
            TemporalUnit::Nanosecond => "nanoseconds",
            TemporalUnit::Microsecond => "microseconds",
            TemporalUnit::Millisecond => "milliseconds",
            TemporalUnit::Second => "seconds",
            TemporalUnit::Minute => "minutes",
            TemporalUnit::Hour => "hours",
            TemporalUnit::Day => "days",
        }
    }
}

impl core::fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.singular())
    }
}

impl core::str::FromStr for TemporalUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<TemporalUnit, Error> {
        TemporalUnit::from_alias(s.trim())
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for TemporalUnit {
    fn arbitrary(g: &mut quickcheck::Gen) -> TemporalUnit {
        *g.choose(&TemporalUnit::ALL).unwrap()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            quickcheck::Arbitrary::shrink(&(*self as usize))
                .map(|n| TemporalUnit::ALL[n % TemporalUnit::ALL.len()]),
        )
    }
}
