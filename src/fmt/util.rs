use crate::engine::Weekday;

/// A simple formatter for converting `i64` values to ASCII byte strings.
///
/// This avoids going through the formatting machinery for every numeric
/// field of a pattern.
///
/// The sign is only included when the value is negative.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DecimalFormatter {
    minimum_digits: u8,
}

impl DecimalFormatter {
    /// Creates a new decimal formatter using the default configuration.
    pub(crate) const fn new() -> DecimalFormatter {
        DecimalFormatter { minimum_digits: 0 }
    }

    /// Format the given value using this configuration as a decimal ASCII
    /// number.
    pub(crate) const fn format(&self, value: i64) -> Decimal {
        Decimal::new(self, value)
    }

    /// The minimum number of digits this number should be formatted with.
    /// Shorter numbers are padded with leading zeros.
    ///
    /// The minimum number of digits is capped at the maximum number of
    /// digits for an i64 value (which is 19).
    pub(crate) const fn padding(self, digits: usize) -> DecimalFormatter {
        let digits = if digits > Decimal::MAX_I64_DIGITS as usize {
            Decimal::MAX_I64_DIGITS
        } else {
            digits as u8
        };
        DecimalFormatter { minimum_digits: digits, ..self }
    }
}

impl Default for DecimalFormatter {
    fn default() -> DecimalFormatter {
        DecimalFormatter::new()
    }
}

/// A formatted decimal number that can be converted to a string.
#[derive(Debug)]
pub(crate) struct Decimal {
    buf: [u8; Self::MAX_I64_LEN as usize],
    start: u8,
    end: u8,
}

impl Decimal {
    /// Discovered via `i64::MIN.to_string().len()`.
    const MAX_I64_LEN: u8 = 20;
    /// Discovered via `i64::MAX.to_string().len()`.
    const MAX_I64_DIGITS: u8 = 19;

    const fn new(formatter: &DecimalFormatter, value: i64) -> Decimal {
        let sign = value.signum();
        let Some(mut value) = value.checked_abs() else {
            let buf = [
                b'-', b'9', b'2', b'2', b'3', b'3', b'7', b'2', b'0', b'3',
                b'6', b'8', b'5', b'4', b'7', b'7', b'5', b'8', b'0', b'8',
            ];
            return Decimal { buf, start: 0, end: Self::MAX_I64_LEN };
        };
        let mut decimal = Decimal {
            buf: [0; Self::MAX_I64_LEN as usize],
            start: Self::MAX_I64_LEN,
            end: Self::MAX_I64_LEN,
        };
        loop {
            decimal.start -= 1;

            let digit = (value % 10) as u8;
            value /= 10;
            decimal.buf[decimal.start as usize] = b'0' + digit;
            if value == 0 {
                break;
            }
        }
        while decimal.len() < formatter.minimum_digits {
            decimal.start -= 1;
            decimal.buf[decimal.start as usize] = b'0';
        }
        if sign < 0 {
            decimal.start -= 1;
            decimal.buf[decimal.start as usize] = b'-';
        }
        decimal
    }

    const fn len(&self) -> u8 {
        self.end - self.start
    }

    /// Returns the ASCII representation of this decimal as a string slice.
    pub(crate) fn as_str(&self) -> &str {
        let bytes = &self.buf[usize::from(self.start)..usize::from(self.end)];
        // SAFETY: Every byte written to `self.buf` is an ASCII digit or
        // sign, so any subsequence is valid UTF-8.
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }
}

pub(crate) static MONTH_NAMES: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) static MONTH_ABBREVIATIONS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct",
    "Nov", "Dec",
];

/// Weekday names, starting on Monday.
pub(crate) static WEEKDAY_NAMES: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub(crate) static WEEKDAY_ABBREVIATIONS: &[&str] =
    &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub(crate) static AM_PM: &[&str] = &["AM", "PM"];

pub(crate) static ERAS: &[&str] = &["AD"];

/// Returns the name of a month, where January is `1`.
pub(crate) fn month_name(month: i8, abbreviated: bool) -> &'static str {
    let table = if abbreviated { MONTH_ABBREVIATIONS } else { MONTH_NAMES };
    let index = usize::try_from(month - 1).unwrap_or(0).min(11);
    table[index]
}

pub(crate) fn weekday_name(weekday: Weekday, abbreviated: bool) -> &'static str {
    let table =
        if abbreviated { WEEKDAY_ABBREVIATIONS } else { WEEKDAY_NAMES };
    table[usize::from(weekday.to_monday_zero_offset().unsigned_abs())]
}

/// Finds the first of `choices` that starts `input`, ignoring ASCII case.
///
/// Returns the index of the choice and the number of bytes it covers.
/// Longer choices should come before any choice that is a prefix of them.
pub(crate) fn parse_choice(
    input: &[u8],
    choices: &[&[&'static str]],
) -> Option<(usize, usize)> {
    for table in choices {
        for (i, choice) in table.iter().enumerate() {
            let choice = choice.as_bytes();
            let Some(candidate) = input.get(..choice.len()) else { continue };
            if candidate.eq_ignore_ascii_case(choice) {
                return Some((i, choice.len()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        let x = DecimalFormatter::new().format(i64::MIN);
        assert_eq!(x.as_str(), "-9223372036854775808");

        let x = DecimalFormatter::new().format(i64::MAX);
        assert_eq!(x.as_str(), "9223372036854775807");

        let x = DecimalFormatter::new().format(0);
        assert_eq!(x.as_str(), "0");

        let x = DecimalFormatter::new().padding(4).format(789);
        assert_eq!(x.as_str(), "0789");

        let x = DecimalFormatter::new().padding(4).format(-789);
        assert_eq!(x.as_str(), "-0789");

        let x = DecimalFormatter::new().padding(2).format(5);
        assert_eq!(x.as_str(), "05");

        let x = DecimalFormatter::new().padding(9).format(345_920_678);
        assert_eq!(x.as_str(), "345920678");

        let x = DecimalFormatter::new().padding(9).format(678);
        assert_eq!(x.as_str(), "000000678");
    }

    #[test]
    fn names() {
        assert_eq!(month_name(1, false), "January");
        assert_eq!(month_name(12, true), "Dec");
        assert_eq!(weekday_name(Weekday::Monday, true), "Mon");
        assert_eq!(weekday_name(Weekday::Sunday, false), "Sunday");
    }

    #[test]
    fn choices() {
        let tables: &[&[&str]] = &[MONTH_NAMES, MONTH_ABBREVIATIONS];
        assert_eq!(parse_choice(b"may 2019", tables), Some((4, 3)));
        assert_eq!(parse_choice(b"SEPTEMBER", tables), Some((8, 9)));
        assert_eq!(parse_choice(b"Sept", tables), Some((8, 3)));
        assert_eq!(parse_choice(b"Ju", tables), None);
    }
}
