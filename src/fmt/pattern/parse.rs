use crate::{
    engine::CivilFields,
    error::fmt::ParseError as PE,
    fmt::{
        pattern::{Field, Item, Pattern, Spec},
        util,
    },
    util::{b, civil as cal, escape, parse},
    Error,
};

/// The most digits a field that isn't width limited reads.
const MAX_DIGITS: usize = 10;

/// The fields found in some input, before they are validated.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedFields {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    day_of_year: Option<i64>,
    hour: Option<i64>,
    /// An hour on a 12 hour clock, normalized to `0..=11`.
    hour12: Option<i64>,
    pm: Option<bool>,
    minute: Option<i64>,
    second: Option<i64>,
    millisecond: Option<i64>,
    offset_seconds: Option<i32>,
}

impl ParsedFields {
    /// Returns the offset from UTC, when the input had one.
    pub(crate) fn offset_seconds(&self) -> Option<i32> {
        self.offset_seconds
    }

    /// Validates the fields and fills in the missing ones from
    /// 1970-01-01 00:00:00.000.
    ///
    /// A day of year is only used when neither a month nor a day of month
    /// was given.
    pub(crate) fn to_civil(&self) -> Result<CivilFields, Error> {
        let year = b::Year::check(self.year.unwrap_or(1970))?;
        let (month, day) = match self.day_of_year {
            Some(day_of_year) if self.month.is_none() && self.day.is_none() => {
                let max = if cal::is_leap_year(year) { 366 } else { 365 };
                if !(1..=max).contains(&day_of_year) {
                    return Err(Error::range("day of year", day_of_year, 1, max));
                }
                let start = cal::Ymd { year, month: 1, day: 1 }.to_epoch_day();
                // OK because `day_of_year` is at most 366.
                let ymd = cal::Ymd::from_epoch_day(start + day_of_year as i32 - 1);
                (ymd.month, ymd.day)
            }
            _ => (
                b::Month::check(self.month.unwrap_or(1))?,
                b::Day::check(self.day.unwrap_or(1))?,
            ),
        };
        let hour = match (self.hour, self.hour12, self.pm) {
            (Some(hour), _, _) => b::Hour::check(hour)?,
            (None, hour12, pm) => {
                let hour12 = b::Hour11::check(hour12.unwrap_or(0))?;
                if pm == Some(true) {
                    hour12 + 12
                } else {
                    hour12
                }
            }
        };
        Ok(CivilFields {
            year,
            month,
            day,
            hour,
            minute: b::Minute::check(self.minute.unwrap_or(0))?,
            second: b::Second::check(self.second.unwrap_or(0))?,
            millisecond: b::Millisecond::check(self.millisecond.unwrap_or(0))?,
        })
    }
}

pub(crate) struct Parser<'p, 'i> {
    pattern: &'p Pattern,
    input: &'i str,
    pos: usize,
    fields: ParsedFields,
}

impl<'p, 'i> Parser<'p, 'i> {
    pub(crate) fn new(pattern: &'p Pattern, input: &'i str) -> Parser<'p, 'i> {
        Parser { pattern, input, pos: 0, fields: ParsedFields::default() }
    }

    /// Parses all of the input, or fails.
    pub(crate) fn parse(mut self) -> Result<ParsedFields, Error> {
        let items = self.pattern.items();
        for (i, item) in items.iter().enumerate() {
            match *item {
                Item::Literal(ref text) => self.parse_literal(text)?,
                Item::Field(spec) => {
                    let fixed = matches!(
                        items.get(i + 1),
                        Some(Item::Field(next)) if next.is_numeric()
                    );
                    self.parse_field(spec, fixed)?;
                }
            }
        }
        if self.pos < self.input.len() {
            return Err(Error::from(PE::UnconsumedInput {
                position: self.pos,
                rest: self.rest(),
            }));
        }
        Ok(self.fields)
    }

    fn parse_literal(&mut self, text: &str) -> Result<(), Error> {
        if !self.remaining().starts_with(text.as_bytes()) {
            return Err(Error::from(PE::ExpectedLiteral {
                expected: text.into(),
                position: self.pos,
                rest: self.rest(),
            }));
        }
        self.pos += text.len();
        Ok(())
    }

    /// Parses one field. When `fixed` is true, a numeric field reads
    /// exactly its width, since another numeric field follows it directly.
    fn parse_field(&mut self, spec: Spec, fixed: bool) -> Result<(), Error> {
        match spec.field {
            Field::Era => {
                self.parse_name(spec, &[util::ERAS])?;
            }
            Field::Year => {
                let start = self.pos;
                let year = self.parse_number(spec, fixed)?;
                self.fields.year = Some(if spec.width <= 2 && self.pos - start == 2 {
                    two_digit_year(year)
                } else {
                    year
                });
            }
            Field::Month if spec.width >= 3 => {
                let tables = &[util::MONTH_NAMES, util::MONTH_ABBREVIATIONS];
                let index = self.parse_name(spec, tables)?;
                // OK because there are only twelve names.
                self.fields.month = Some(index as i64 + 1);
            }
            Field::Month => {
                self.fields.month = Some(self.parse_number(spec, fixed)?);
            }
            Field::DayOfMonth => {
                self.fields.day = Some(self.parse_number(spec, fixed)?);
            }
            Field::DayOfYear => {
                self.fields.day_of_year = Some(self.parse_number(spec, fixed)?);
            }
            Field::WeekdayName => {
                let tables =
                    &[util::WEEKDAY_NAMES, util::WEEKDAY_ABBREVIATIONS];
                self.parse_name(spec, tables)?;
            }
            Field::WeekdayNumber => {
                let weekday = self.parse_number(spec, fixed)?;
                if !(1..=7).contains(&weekday) {
                    return Err(Error::range("weekday number", weekday, 1, 7));
                }
            }
            Field::AmPm => {
                let index = self.parse_name(spec, &[util::AM_PM])?;
                self.fields.pm = Some(index == 1);
            }
            Field::Hour23 => {
                let hour = self.parse_number(spec, fixed)?;
                self.fields.hour = Some(i64::from(b::Hour::check(hour)?));
            }
            Field::Hour24 => {
                let hour = self.parse_number(spec, fixed)?;
                self.fields.hour = Some(i64::from(b::Hour24::check(hour)?) % 24);
            }
            Field::Hour11 => {
                let hour = self.parse_number(spec, fixed)?;
                self.fields.hour12 = Some(i64::from(b::Hour11::check(hour)?));
            }
            Field::Hour12 => {
                let hour = self.parse_number(spec, fixed)?;
                self.fields.hour12 = Some(i64::from(b::Hour12::check(hour)?) % 12);
            }
            Field::Minute => {
                self.fields.minute = Some(self.parse_number(spec, fixed)?);
            }
            Field::Second => {
                self.fields.second = Some(self.parse_number(spec, fixed)?);
            }
            Field::Millisecond => {
                self.fields.millisecond = Some(self.parse_number(spec, fixed)?);
            }
            Field::ZoneName => {
                return Err(Error::from(PE::ZoneNameUnsupported {
                    position: self.pos,
                }));
            }
            Field::Rfc822Offset => {
                self.fields.offset_seconds = Some(self.parse_offset(false)?);
            }
            Field::IsoOffset => {
                self.fields.offset_seconds = Some(self.parse_offset(true)?);
            }
        }
        Ok(())
    }

    fn parse_number(&mut self, spec: Spec, fixed: bool) -> Result<i64, Error> {
        let available = self
            .remaining()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let len = if fixed { spec.width } else { available.min(MAX_DIGITS) };
        if available == 0 || available < len {
            return Err(Error::from(PE::ExpectedNumber {
                field: spec.field.name(),
                position: self.pos,
                rest: self.rest(),
            }));
        }
        let digits = &self.remaining()[..len];
        let n = parse::i64(digits)?;
        self.pos += len;
        Ok(n)
    }

    fn parse_name(
        &mut self,
        spec: Spec,
        tables: &[&[&'static str]],
    ) -> Result<usize, Error> {
        let Some((index, len)) = util::parse_choice(self.remaining(), tables)
        else {
            return Err(Error::from(PE::ExpectedName {
                field: spec.field.name(),
                position: self.pos,
                rest: self.rest(),
            }));
        };
        self.pos += len;
        Ok(index)
    }

    /// Parses `+HHMM`, `+HH:MM` and, for ISO offsets, `Z` and `+HH`.
    fn parse_offset(&mut self, iso: bool) -> Result<i32, Error> {
        let start = self.pos;
        let fail = |parser: &Parser<'_, '_>| {
            Error::from(PE::ExpectedOffset {
                position: start,
                rest: escape::rest(parser.input, start),
            })
        };
        let input = self.remaining();
        if iso && input.first() == Some(&b'Z') {
            self.pos += 1;
            return Ok(0);
        }
        let sign = match input.first() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Err(fail(self)),
        };
        let two = |at: usize| -> Option<i32> {
            let digits = input.get(at..at + 2)?;
            let n = parse::i64(digits).ok()?;
            i32::try_from(n).ok()
        };
        let Some(hours) = two(1) else { return Err(fail(self)) };
        let mut len = 3;
        let minutes = if input.get(3) == Some(&b':') {
            len += 3;
            two(4)
        } else {
            len += 2;
            two(3)
        };
        let minutes = match minutes {
            Some(minutes) => minutes,
            None if iso => {
                len = 3;
                0
            }
            None => return Err(fail(self)),
        };
        if hours > 23 || minutes > 59 {
            return Err(fail(self));
        }
        self.pos += len;
        Ok(sign * (hours * 3600 + minutes * 60))
    }

    fn remaining(&self) -> &'i [u8] {
        &self.input.as_bytes()[self.pos..]
    }

    fn rest(&self) -> Box<str> {
        escape::rest(self.input, self.pos)
    }
}

/// Maps `yy` onto the years 1969 through 2068.
fn two_digit_year(year: i64) -> i64 {
    if year >= 69 {
        1900 + year
    } else {
        2000 + year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str, input: &str) -> Result<ParsedFields, Error> {
        let pattern = Pattern::compile(pattern).unwrap();
        Parser::new(&pattern, input).parse()
    }

    fn civil(pattern: &str, input: &str) -> CivilFields {
        parse(pattern, input).unwrap().to_civil().unwrap()
    }

    #[test]
    fn defaults() {
        let fields = civil("HH:mm", "18:45");
        assert_eq!(fields.to_string(), "1970-01-01T18:45:00.000");
        let fields = civil("yyyy.MM.dd", "2019.05.21");
        assert_eq!(fields.to_string(), "2019-05-21T00:00:00.000");
    }

    #[test]
    fn adjacent_numbers_take_their_width() {
        let fields = civil("yyyyMMdd'T'HH:mm:ss.SSS", "20190521T18:45:07.345");
        assert_eq!(fields.to_string(), "2019-05-21T18:45:07.345");
        let fields = civil("HHmm", "0930");
        assert_eq!(fields.to_string(), "1970-01-01T09:30:00.000");
        // The last field of a run takes every digit.
        let fields = civil("yyMMd", "190521");
        assert_eq!(fields.to_string(), "2019-05-21T00:00:00.000");
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(civil("yy", "69").year, 1969);
        assert_eq!(civil("yy", "99").year, 1999);
        assert_eq!(civil("yy", "00").year, 2000);
        assert_eq!(civil("yy", "68").year, 2068);
        // Anything but exactly two digits is taken as written.
        assert_eq!(civil("yy", "2019").year, 2019);
    }

    #[test]
    fn names_and_hours() {
        let fields = civil("EEE, d MMM yyyy h:mm a", "Tue, 21 may 2019 6:45 PM");
        assert_eq!(fields.to_string(), "2019-05-21T18:45:00.000");
        let fields = civil("MMMM d G", "September 3 AD");
        assert_eq!(fields.to_string(), "1970-09-03T00:00:00.000");
        assert_eq!(civil("h a", "12 AM").hour, 0);
        assert_eq!(civil("h a", "12 PM").hour, 12);
        assert_eq!(civil("k", "24").hour, 0);
        assert_eq!(civil("K a", "11 pm").hour, 23);
    }

    #[test]
    fn day_of_year() {
        let fields = civil("yyyy D", "2020 60");
        assert_eq!(fields.to_string(), "2020-02-29T00:00:00.000");
        let err = parse("yyyy D", "2019 366").unwrap().to_civil().unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn offsets() {
        let offset = |pattern, input| {
            parse(pattern, input).unwrap().offset_seconds().unwrap()
        };
        assert_eq!(offset("Z", "+0100"), 3600);
        assert_eq!(offset("Z", "-05:30"), -(5 * 3600 + 30 * 60));
        assert_eq!(offset("X", "Z"), 0);
        assert_eq!(offset("X", "+09"), 9 * 3600);
        assert_eq!(offset("XXX", "+01:00"), 3600);
        assert!(parse("Z", "Z").unwrap_err().is_parse());
        assert!(parse("Z", "+2500").unwrap_err().is_parse());
    }

    #[test]
    fn errors() {
        insta::assert_snapshot!(
            parse("yyyy.MM.dd", "2019.05.21 junk").unwrap_err(),
            @r#"parsed all pattern fields, but found unconsumed input " junk" at position 10"#,
        );
        insta::assert_snapshot!(
            parse("yyyy.MM.dd", "2019-05-21").unwrap_err(),
            @r#"expected "." at position 4, but found "-05-21""#,
        );
        insta::assert_snapshot!(
            parse("yyyyMMdd", "20195").unwrap_err(),
            @r#"expected month digits at position 4, but found "5""#,
        );
        insta::assert_snapshot!(
            parse("HH:mm z", "18:45 BST").unwrap_err(),
            @"time zone names cannot be parsed (at position 6), use an offset field instead",
        );
        insta::assert_snapshot!(
            parse("MMM", "Foo").unwrap_err(),
            @r#"expected month name at position 0, but found "Foo""#,
        );
        let err = parse("MM", "13").unwrap().to_civil().unwrap_err();
        assert!(err.is_range());
    }
}
