use crate::{
    engine::CalendarFields,
    error::{fmt::Error as FE, ErrorContext},
    fmt::{
        pattern::{Field, Item, Pattern, Spec},
        util::{self, DecimalFormatter},
    },
    Error,
};

/// Everything a pattern may ask for about one point in time.
#[derive(Clone, Debug)]
pub(crate) struct Moment<'a> {
    pub(crate) fields: CalendarFields,
    pub(crate) time_zone: &'a str,
    /// Only present when the pattern needs it.
    pub(crate) abbreviation: Option<String>,
}

pub(crate) struct Formatter<'p, 'm, 'w> {
    pattern: &'p Pattern,
    moment: &'m Moment<'m>,
    wtr: &'w mut String,
}

impl<'p, 'm, 'w> Formatter<'p, 'm, 'w> {
    pub(crate) fn new(
        pattern: &'p Pattern,
        moment: &'m Moment<'m>,
        wtr: &'w mut String,
    ) -> Formatter<'p, 'm, 'w> {
        Formatter { pattern, moment, wtr }
    }

    pub(crate) fn format(&mut self) -> Result<(), Error> {
        for item in self.pattern.items() {
            match *item {
                Item::Literal(ref text) => self.wtr.push_str(text),
                Item::Field(spec) => self
                    .format_field(spec)
                    .context(FE::FailedFormat { kind: spec.field.name() })?,
            }
        }
        Ok(())
    }

    fn format_field(&mut self, spec: Spec) -> Result<(), Error> {
        let fields = self.moment.fields;
        match spec.field {
            Field::Era => self.wtr.push_str(util::ERAS[0]),
            Field::Year if spec.width == 2 => {
                self.number(i64::from(fields.year % 100), 2)
            }
            Field::Year => self.number(i64::from(fields.year), spec.width),
            Field::Month if spec.width >= 3 => self
                .wtr
                .push_str(util::month_name(fields.month, spec.width == 3)),
            Field::Month => self.number(i64::from(fields.month), spec.width),
            Field::DayOfMonth => {
                self.number(i64::from(fields.day), spec.width)
            }
            Field::DayOfYear => {
                self.number(i64::from(fields.day_of_year), spec.width)
            }
            Field::WeekdayName => self
                .wtr
                .push_str(util::weekday_name(fields.weekday, spec.width < 4)),
            Field::WeekdayNumber => self.number(
                i64::from(fields.weekday.to_monday_one_offset()),
                spec.width,
            ),
            Field::AmPm => {
                self.wtr.push_str(util::AM_PM[usize::from(fields.hour >= 12)])
            }
            Field::Hour23 => self.number(i64::from(fields.hour), spec.width),
            Field::Hour24 => {
                let hour = if fields.hour == 0 { 24 } else { fields.hour };
                self.number(i64::from(hour), spec.width)
            }
            Field::Hour11 => {
                self.number(i64::from(fields.hour % 12), spec.width)
            }
            Field::Hour12 => {
                let hour = match fields.hour % 12 {
                    0 => 12,
                    hour => hour,
                };
                self.number(i64::from(hour), spec.width)
            }
            Field::Minute => {
                self.number(i64::from(fields.minute), spec.width)
            }
            Field::Second => {
                self.number(i64::from(fields.second), spec.width)
            }
            Field::Millisecond => {
                self.number(i64::from(fields.millisecond), spec.width)
            }
            Field::ZoneName if spec.width >= 4 => {
                self.wtr.push_str(self.moment.time_zone)
            }
            Field::ZoneName => {
                let Some(ref abbreviation) = self.moment.abbreviation else {
                    return Err(Error::from_args(format_args!(
                        "no abbreviation was found for time zone {:?}",
                        self.moment.time_zone,
                    )));
                };
                self.wtr.push_str(abbreviation);
            }
            Field::Rfc822Offset => self.offset(false, true, false),
            Field::IsoOffset => {
                self.offset(true, spec.width >= 2, spec.width == 3)
            }
        }
        Ok(())
    }

    fn number(&mut self, value: i64, width: usize) {
        let decimal = DecimalFormatter::new().padding(width).format(value);
        self.wtr.push_str(decimal.as_str());
    }

    /// Writes the UTC offset, truncated to minutes.
    fn offset(&mut self, utc_is_z: bool, minutes: bool, colon: bool) {
        let offset = self.moment.fields.offset_seconds;
        if utc_is_z && offset == 0 {
            self.wtr.push('Z');
            return;
        }
        self.wtr.push(if offset < 0 { '-' } else { '+' });
        let offset = offset.unsigned_abs();
        self.number(i64::from(offset / 3600), 2);
        if minutes {
            if colon {
                self.wtr.push(':');
            }
            self.number(i64::from(offset / 60 % 60), 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Weekday;

    use super::*;

    fn moment(hour: i8, offset_seconds: i32) -> Moment<'static> {
        Moment {
            fields: CalendarFields {
                year: 2019,
                month: 5,
                day: 21,
                weekday: Weekday::Tuesday,
                day_of_year: 141,
                hour,
                minute: 45,
                second: 7,
                millisecond: 45,
                offset_seconds,
            },
            time_zone: "Europe/London",
            abbreviation: Some("BST".to_string()),
        }
    }

    fn format(pattern: &str, moment: &Moment<'_>) -> String {
        let pattern = Pattern::compile(pattern).unwrap();
        let mut out = String::new();
        Formatter::new(&pattern, moment, &mut out).format().unwrap();
        out
    }

    #[test]
    fn numbers_and_names() {
        let m = moment(19, 3600);
        assert_eq!(format("yyyy.MM.dd'T'HH:mm:ss.SSS", &m), "2019.05.21T19:45:07.045");
        assert_eq!(format("yy y yyyyy", &m), "19 2019 02019");
        assert_eq!(format("M MMM MMMM", &m), "5 May May");
        assert_eq!(format("E EEEE u D G", &m), "Tue Tuesday 2 141 AD");
        assert_eq!(format("S", &m), "45");
    }

    #[test]
    fn hours() {
        assert_eq!(format("H k K h a", &moment(0, 0)), "0 24 0 12 AM");
        assert_eq!(format("H k K h a", &moment(12, 0)), "12 12 0 12 PM");
        assert_eq!(format("HH kk KK hh a", &moment(19, 0)), "19 19 07 07 PM");
    }

    #[test]
    fn zones_and_offsets() {
        let m = moment(19, 3600);
        assert_eq!(format("z zzzz", &m), "BST Europe/London");
        assert_eq!(format("Z X XX XXX", &m), "+0100 +01 +0100 +01:00");

        let m = moment(19, 0);
        assert_eq!(format("Z X XX XXX", &m), "+0000 Z Z Z");

        let m = moment(19, -(5 * 3600 + 30 * 60));
        assert_eq!(format("Z XXX", &m), "-0530 -05:30");
    }

    #[test]
    fn missing_abbreviation() {
        let mut m = moment(19, 3600);
        m.abbreviation = None;
        let pattern = Pattern::compile("HH z").unwrap();
        let mut out = String::new();
        let err = Formatter::new(&pattern, &m, &mut out).format().unwrap_err();
        insta::assert_snapshot!(
            err,
            @r#"failed to format time zone: no abbreviation was found for time zone "Europe/London""#,
        );
    }
}
