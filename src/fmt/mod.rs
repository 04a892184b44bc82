/*!
Formatting and parsing with date and time patterns.

A [`NanoDateTimeFormat`] compiles a pattern in the widely used
`SimpleDateFormat` dialect (`yyyy.MM.dd'T'HH:mm:ss.SSS` and the like) and
binds it to a time zone. Patterns may also contain two tokens that carry
precision below a millisecond:

* `NNNNNNNNN` is the nanosecond of the second, as 9 digits.
* `CCCCCC` is the microsecond of the second, as 6 digits.

Either token can be quoted to write it literally.

# Example

```
use nanotemporals::{fmt::NanoDateTimeFormat, NanoDateTime};

let dt = NanoDateTime::parse("2019.05.21T18:45:07.345")?;
let dt = nanotemporals::arith::plus_nanoseconds(&dt, 920_678)?;

let format = NanoDateTimeFormat::new("UTC", "HH:mm:ss.NNNNNNNNN.'NNNNNNNNN'", false)?;
assert_eq!(format.format(&dt)?, "18:45:07.345920678.NNNNNNNNN");

let format = NanoDateTimeFormat::new("Europe/London", "yyyy-MM-dd HH:mm z", false)?;
assert_eq!(format.format(&dt)?, "2019-05-21 19:45 BST");

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Which time zone is used

Formatting reads calendar fields in a time zone that depends on the kind
of value:

* A [`NanoTime`] is formatted as that time on 1970-01-01 in UTC.
* A [`NanoDate`] or [`ZonedNanoDate`] is formatted in UTC, which shows
  its own year, month and day.
* A [`NanoDateTime`] is formatted in the format's time zone.
* A [`ZonedNanoDateTime`] is formatted in its own time zone.

Parsing resolves the fields it finds in the format's time zone, unless the
pattern includes an offset field (`Z` or `X`), in which case the offset
fixes the instant. Fields missing from the pattern default to
1970-01-01T00:00:00.000. Parsing works at millisecond precision, and the
extension tokens are read as literal text.
*/

use std::sync::Arc;

use crate::{
    arith,
    civil::{NanoDate, NanoDateTime, NanoTime},
    engine::{CalendarEngine, UTC},
    error::{fmt::Error as FE, ErrorContext},
    util::b,
    zoned::{ZonedNanoDate, ZonedNanoDateTime},
    Error,
};

use self::{
    nanos::Occurrence,
    pattern::{Formatter, Moment, Parser, Pattern},
};

mod nanos;
mod pattern;
#[cfg(feature = "serde")]
mod serde;
mod util;

/// The pattern used by [`NanoDate::parse`] and friends.
pub const DEFAULT_DATE_PATTERN: &str = "yyyy.MM.dd";
/// The pattern used by [`NanoTime::parse`].
pub const DEFAULT_TIME_PATTERN: &str = "HH:mm:ss.SSS";
/// The pattern used by [`NanoDateTime::parse`] and
/// [`ZonedNanoDateTime::parse`].
pub const DEFAULT_DATETIME_PATTERN: &str = "yyyy.MM.dd'T'HH:mm:ss.SSS";

/// A compiled pattern bound to a time zone.
///
/// See the [module documentation](self) for the pattern dialect and how
/// time zones are chosen.
#[derive(Clone, Debug)]
pub struct NanoDateTimeFormat {
    time_zone: Arc<str>,
    pattern: Box<str>,
    compiled: Pattern,
    occurrences: Vec<Occurrence>,
    zoned: bool,
}

impl NanoDateTimeFormat {
    /// Compiles `pattern` for use in `time_zone`.
    ///
    /// When `zoned` is true, [`parse`](Self::parse) returns
    /// [`Parsed::Zoned`] values. Otherwise it returns
    /// [`Parsed::DateTime`] values.
    ///
    /// # Errors
    ///
    /// An unknown time zone is a configuration error. A malformed pattern
    /// is a parse error.
    pub fn new(
        time_zone: &str,
        pattern: &str,
        zoned: bool,
    ) -> Result<NanoDateTimeFormat, Error> {
        let time_zone = arith::resolve(time_zone)?;
        let preprocessed = nanos::preprocess(pattern);
        let compiled = Pattern::compile(&preprocessed.pattern)
            .with_context(|| FE::FailedPattern { pattern: pattern.into() })?;
        trace!(
            "compiled pattern {pattern:?} as {rewritten:?} in {time_zone}",
            rewritten = preprocessed.pattern,
        );
        Ok(NanoDateTimeFormat {
            time_zone,
            pattern: pattern.into(),
            compiled,
            occurrences: preprocessed.occurrences,
            zoned,
        })
    }

    /// Returns the time zone this format was built for.
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// Returns the pattern as it was given.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_zoned(&self) -> bool {
        self.zoned
    }

    /// Formats any of this crate's date and time values.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{fmt::NanoDateTimeFormat, NanoDate, NanoTime};
    ///
    /// let format = NanoDateTimeFormat::new("UTC", "EEE d MMMM yyyy", false)?;
    /// let date = NanoDate::parse("2019.05.21")?;
    /// assert_eq!(format.format(&date)?, "Tue 21 May 2019");
    ///
    /// let format = NanoDateTimeFormat::new("UTC", "h:mm a", false)?;
    /// assert_eq!(format.format(&NanoTime::parse("18:45:07.345")?)?, "6:45 PM");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn format<'a>(
        &self,
        value: impl Into<Temporal<'a>>,
    ) -> Result<String, Error> {
        let value = value.into();
        let (nanoseconds, time_zone) = match value {
            Temporal::Time(time) => (time.nanoseconds(), UTC),
            Temporal::Date(date) => (date.nanoseconds(), UTC),
            Temporal::ZonedDate(date) => (date.nanoseconds(), UTC),
            Temporal::DateTime(dt) => (dt.nanoseconds(), &*self.time_zone),
            Temporal::ZonedDateTime(zdt) => {
                (zdt.nanoseconds(), zdt.time_zone())
            }
        };
        let (millis, _) = b::split_millis(nanoseconds);
        let moment = arith::with_default(|arith| {
            let engine = arith.engine_mut();
            let fields = engine.fields(time_zone, millis)?;
            let abbreviation = if self.compiled.needs_abbreviation() {
                Some(engine.abbreviation(time_zone, millis)?)
            } else {
                None
            };
            Ok(Moment { fields, time_zone, abbreviation })
        })
        .with_context(|| FE::FailedFormat { kind: value.kind() })?;

        let mut out = String::with_capacity(self.pattern.len() + 8);
        Formatter::new(&self.compiled, &moment, &mut out).format()?;
        nanos::substitute(
            &mut out,
            &self.occurrences,
            nanoseconds.rem_euclid(b::NANOS_PER_SECOND),
        );
        Ok(out)
    }

    /// Parses `text`, which must match the whole pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::fmt::{NanoDateTimeFormat, Parsed};
    ///
    /// let format = NanoDateTimeFormat::new("Europe/London", "yyyyMMdd HH:mm", true)?;
    /// let Parsed::Zoned(zdt) = format.parse("20190521 19:45")? else {
    ///     unreachable!()
    /// };
    /// assert_eq!(zdt.to_datetime().to_string(), "2019.05.21T18:45:00.000000000");
    ///
    /// // An offset fixes the instant, whatever the format's time zone.
    /// let format = NanoDateTimeFormat::new("Asia/Tokyo", "yyyy-MM-dd HH:mmXXX", false)?;
    /// let parsed = format.parse("2019-05-21 19:45+01:00")?;
    /// assert_eq!(parsed.to_datetime().to_string(), "2019.05.21T18:45:00.000000000");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(&self, text: &str) -> Result<Parsed, Error> {
        self.parse_impl(text)
            .with_context(|| FE::FailedParse { input: text.into() })
    }

    fn parse_impl(&self, text: &str) -> Result<Parsed, Error> {
        let fields = Parser::new(&self.compiled, text).parse()?;
        let civil = fields.to_civil()?;
        let millis = arith::with_default(|arith| {
            let engine = arith.engine_mut();
            match fields.offset_seconds() {
                None => engine.to_millis(&self.time_zone, &civil),
                Some(offset) => {
                    let millis = engine.to_millis(UTC, &civil)?;
                    Ok(millis - i64::from(offset) * 1_000)
                }
            }
        })?;
        let nanoseconds = millis
            .checked_mul(b::NANOS_PER_MILLI)
            .ok_or_else(|| Error::slim_range("epoch nanoseconds"))?;
        if self.zoned {
            let time_zone = Arc::clone(&self.time_zone);
            ZonedNanoDateTime::from_resolved(time_zone, nanoseconds)
                .map(Parsed::Zoned)
        } else {
            NanoDateTime::from_nanoseconds(nanoseconds).map(Parsed::DateTime)
        }
    }
}

/// Any one of this crate's date and time values, borrowed for formatting.
///
/// Every value type converts into this, so it rarely needs to be named.
#[derive(Clone, Copy, Debug)]
pub enum Temporal<'a> {
    Time(&'a NanoTime),
    Date(&'a NanoDate),
    DateTime(&'a NanoDateTime),
    ZonedDate(&'a ZonedNanoDate),
    ZonedDateTime(&'a ZonedNanoDateTime),
}

impl<'a> Temporal<'a> {
    fn kind(&self) -> &'static str {
        match *self {
            Temporal::Time(_) => "time",
            Temporal::Date(_) => "date",
            Temporal::DateTime(_) => "datetime",
            Temporal::ZonedDate(_) => "zoned date",
            Temporal::ZonedDateTime(_) => "zoned datetime",
        }
    }
}

macro_rules! temporal_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Temporal<'a> {
                fn from(value: &'a $ty) -> Temporal<'a> {
                    Temporal::$variant(value)
                }
            }
        )*
    }
}

temporal_from! {
    Time(NanoTime),
    Date(NanoDate),
    DateTime(NanoDateTime),
    ZonedDate(ZonedNanoDate),
    ZonedDateTime(ZonedNanoDateTime),
}

/// The result of [`NanoDateTimeFormat::parse`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parsed {
    /// Returned by formats built with `zoned` set. The value is in the
    /// format's time zone.
    Zoned(ZonedNanoDateTime),
    DateTime(NanoDateTime),
}

impl Parsed {
    /// Returns the nanoseconds since the Unix epoch.
    pub fn nanoseconds(&self) -> i64 {
        match *self {
            Parsed::Zoned(ref zdt) => zdt.nanoseconds(),
            Parsed::DateTime(ref dt) => dt.nanoseconds(),
        }
    }

    /// Returns the parsed instant without a time zone.
    pub fn to_datetime(&self) -> NanoDateTime {
        match *self {
            Parsed::Zoned(ref zdt) => zdt.to_datetime(),
            Parsed::DateTime(ref dt) => dt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime() -> NanoDateTime {
        NanoDateTime::from_nanoseconds(1_558_464_307_345_920_678).unwrap()
    }

    fn format<'a>(pattern: &str, value: impl Into<Temporal<'a>>) -> String {
        NanoDateTimeFormat::new(UTC, pattern, false)
            .unwrap()
            .format(value)
            .unwrap()
    }

    #[test]
    fn sub_millisecond_tokens() {
        let dt = datetime();
        assert_eq!(
            format("yyyyMMdd'T'HH:mm:ss.SSS", &dt),
            "20190521T18:45:07.345",
        );
        assert_eq!(
            format("HH:mm:ss.NNNNNNNNN.'NNNNNNNNN'.NNNNNNNNN", &dt),
            "18:45:07.345920678.NNNNNNNNN.345920678",
        );
        assert_eq!(format("HH:mm:ss.CCCCCC", &dt), "18:45:07.345920");
        assert_eq!(
            format("HH:mm:ss.CCCCCC.'CCCCCC'.NNNNNNNNN.'NNNNNNNNN'", &dt),
            "18:45:07.345920.CCCCCC.345920678.NNNNNNNNN",
        );
    }

    #[test]
    fn time_zone_per_kind() {
        let dt = datetime();
        let london =
            NanoDateTimeFormat::new("Europe/London", "yyyy.MM.dd HH:mm z", false)
                .unwrap();
        assert_eq!(london.format(&dt).unwrap(), "2019.05.21 19:45 BST");

        let zdt = dt.to_zoned("America/New_York").unwrap();
        assert_eq!(london.format(&zdt).unwrap(), "2019.05.21 14:45 EDT");

        let time = NanoTime::parse("23:30:00.000").unwrap();
        assert_eq!(london.format(&time).unwrap(), "1970.01.01 23:30 UTC");

        let date = ZonedNanoDate::parse("Pacific/Auckland", "2019.05.21").unwrap();
        assert_eq!(london.format(&date).unwrap(), "2019.05.21 00:00 UTC");
    }

    #[test]
    fn end_of_day_time() {
        let time = NanoTime::midnight_next_day();
        assert_eq!(format("yyyy.MM.dd HH:mm", &time), "1970.01.02 00:00");
    }

    #[test]
    fn parse_modes() {
        let utc = NanoDateTimeFormat::new(UTC, DEFAULT_TIME_PATTERN, false).unwrap();
        let parsed = utc.parse("18:45:07.345").unwrap();
        assert_eq!(parsed.to_datetime().to_string(), "1970.01.01T18:45:07.345000000");
        assert!(matches!(parsed, Parsed::DateTime(_)));

        let zoned =
            NanoDateTimeFormat::new("Europe/London", DEFAULT_DATETIME_PATTERN, true)
                .unwrap();
        let Parsed::Zoned(zdt) = zoned.parse("2019.05.21T19:45:07.345").unwrap()
        else {
            panic!("expected a zoned result")
        };
        assert_eq!(zdt.time_zone(), "Europe/London");
        assert_eq!(zdt.to_datetime().to_string(), "2019.05.21T18:45:07.345000000");
        assert_eq!(zoned.format(&zdt).unwrap(), "2019.05.21T19:45:07.345");
    }

    #[test]
    fn parse_round_trips_milliseconds() {
        let dt = arith::plus_nanoseconds(&datetime(), -920_678).unwrap();
        let utc = NanoDateTimeFormat::new(UTC, DEFAULT_DATETIME_PATTERN, false)
            .unwrap();
        let text = utc.format(&dt).unwrap();
        assert_eq!(utc.parse(&text).unwrap(), Parsed::DateTime(dt));
    }

    #[test]
    fn errors() {
        let err = NanoDateTimeFormat::new("Nowhere/Special", "HH", false)
            .unwrap_err();
        assert!(err.is_configuration());

        let err = NanoDateTimeFormat::new(UTC, "HH:mm bb", false).unwrap_err();
        assert!(err.is_parse());
        insta::assert_snapshot!(
            err,
            @r#"invalid pattern "HH:mm bb": illegal pattern character "b" at position 6 (quote it to use it as a literal)"#,
        );

        let utc = NanoDateTimeFormat::new(UTC, DEFAULT_DATE_PATTERN, false)
            .unwrap();
        let err = utc.parse("2019.05.21T00").unwrap_err();
        assert!(err.is_parse());
        insta::assert_snapshot!(
            err,
            @r#"failed to parse "2019.05.21T00": parsed all pattern fields, but found unconsumed input "T00" at position 10"#,
        );

        let err = utc.parse("2019.02.30").unwrap_err();
        assert!(err.is_range());
    }
}
