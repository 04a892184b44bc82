/*!
Compiles patterns written in the `SimpleDateFormat` dialect.

A pattern is a sequence of fields and literals. A field is a run of one
repeated ASCII letter, like `yyyy` or `MMM`, and its width is the length of
the run. Text between single quotes is literal, and `''` is a literal quote
both inside and outside quoted text. Every other character is literal.

Any ASCII letter without a meaning below is an error, so that letters
meant as literals must be quoted.

| Letter | Field | Notes |
| ------ | ----- | ----- |
| `G` | era | always `AD` |
| `y` | year | width 2 is the last two digits |
| `M` | month | width 3 is `Jan`, width 4 or more is `January` |
| `d` | day of month | |
| `D` | day of year | |
| `E` | weekday name | width 4 or more is `Tuesday`, otherwise `Tue` |
| `u` | weekday number | `1` is Monday |
| `a` | AM or PM | |
| `H` | hour, `0-23` | |
| `k` | hour, `1-24` | |
| `K` | hour, `0-11` | |
| `h` | hour, `1-12` | |
| `m` | minute | |
| `s` | second | |
| `S` | millisecond | |
| `z` | time zone | width 4 or more is the IANA identifier, otherwise an abbreviation like `BST` |
| `Z` | offset | `+0100` |
| `X` | offset | `Z` for UTC, otherwise `+01`, `+0100` or `+01:00` for widths 1 to 3 |

Numeric fields are zero padded to their width.
*/

use crate::{error::fmt::PatternError as E, Error};

pub(crate) use self::{
    format::{Formatter, Moment},
    parse::Parser,
};

mod format;
mod parse;

/// A compiled pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Pattern {
    items: Vec<Item>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Item {
    Literal(Box<str>),
    Field(Spec),
}

/// A field, its width and where it appears in the pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Spec {
    pub(crate) field: Field,
    pub(crate) width: usize,
    pub(crate) position: usize,
}

impl Spec {
    /// Returns true when this field is read and written as digits.
    pub(crate) fn is_numeric(&self) -> bool {
        use self::Field::*;

        match self.field {
            Month => self.width < 3,
            Year | DayOfMonth | DayOfYear | WeekdayNumber | Hour23
            | Hour24 | Hour11 | Hour12 | Minute | Second | Millisecond => true,
            Era | WeekdayName | AmPm | ZoneName | Rfc822Offset
            | IsoOffset => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Field {
    Era,
    Year,
    Month,
    DayOfMonth,
    DayOfYear,
    WeekdayName,
    WeekdayNumber,
    AmPm,
    Hour23,
    Hour24,
    Hour11,
    Hour12,
    Minute,
    Second,
    Millisecond,
    ZoneName,
    Rfc822Offset,
    IsoOffset,
}

impl Field {
    fn from_letter(letter: u8) -> Option<Field> {
        let field = match letter {
            b'G' => Field::Era,
            b'y' => Field::Year,
            b'M' => Field::Month,
            b'd' => Field::DayOfMonth,
            b'D' => Field::DayOfYear,
            b'E' => Field::WeekdayName,
            b'u' => Field::WeekdayNumber,
            b'a' => Field::AmPm,
            b'H' => Field::Hour23,
            b'k' => Field::Hour24,
            b'K' => Field::Hour11,
            b'h' => Field::Hour12,
            b'm' => Field::Minute,
            b's' => Field::Second,
            b'S' => Field::Millisecond,
            b'z' => Field::ZoneName,
            b'Z' => Field::Rfc822Offset,
            b'X' => Field::IsoOffset,
            _ => return None,
        };
        Some(field)
    }

    /// A human readable name, used in error messages.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Field::Era => "era",
            Field::Year => "year",
            Field::Month => "month",
            Field::DayOfMonth => "day of month",
            Field::DayOfYear => "day of year",
            Field::WeekdayName | Field::WeekdayNumber => "weekday",
            Field::AmPm => "AM/PM",
            Field::Hour23 | Field::Hour24 | Field::Hour11 | Field::Hour12 => {
                "hour"
            }
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Millisecond => "millisecond",
            Field::ZoneName => "time zone",
            Field::Rfc822Offset | Field::IsoOffset => "offset",
        }
    }
}

impl Pattern {
    /// Compiles a pattern.
    pub(crate) fn compile(pattern: &str) -> Result<Pattern, Error> {
        let bytes = pattern.as_bytes();
        let mut items = vec![];
        let mut literal = String::new();
        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i];
            if byte == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    literal.push('\'');
                    i += 2;
                    continue;
                }
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => {
                            return Err(Error::from(E::UnclosedQuote {
                                position: start,
                            }))
                        }
                        Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => {
                            literal.push('\'');
                            i += 2;
                        }
                        Some(b'\'') => {
                            i += 1;
                            break;
                        }
                        Some(_) => {
                            let end = i + char_len(pattern, i);
                            literal.push_str(&pattern[i..end]);
                            i = end;
                        }
                    }
                }
            } else if byte.is_ascii_alphabetic() {
                let field = Field::from_letter(byte).ok_or_else(|| {
                    Error::from(E::UnknownField { letter: byte, position: i })
                })?;
                let width = bytes[i..].iter().take_while(|&&b| b == byte).count();
                if field == Field::IsoOffset && width > 3 {
                    return Err(Error::from(E::UnsupportedWidth {
                        letter: byte,
                        width,
                        position: i,
                    }));
                }
                if !literal.is_empty() {
                    let text = core::mem::take(&mut literal);
                    items.push(Item::Literal(text.into_boxed_str()));
                }
                items.push(Item::Field(Spec { field, width, position: i }));
                i += width;
            } else {
                let end = i + char_len(pattern, i);
                literal.push_str(&pattern[i..end]);
                i = end;
            }
        }
        if !literal.is_empty() {
            items.push(Item::Literal(literal.into_boxed_str()));
        }
        Ok(Pattern { items })
    }

    pub(crate) fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns true when formatting needs a time zone abbreviation.
    pub(crate) fn needs_abbreviation(&self) -> bool {
        self.items.iter().any(|item| {
            matches!(
                *item,
                Item::Field(Spec { field: Field::ZoneName, width, .. })
                    if width < 4
            )
        })
    }
}

/// Returns the length in bytes of the character starting at `at`.
fn char_len(pattern: &str, at: usize) -> usize {
    pattern.get(at..).and_then(|s| s.chars().next()).map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(field: Field, width: usize, position: usize) -> Item {
        Item::Field(Spec { field, width, position })
    }

    fn literal(text: &str) -> Item {
        Item::Literal(text.into())
    }

    #[test]
    fn compile_default_datetime() {
        let pattern = Pattern::compile("yyyy.MM.dd'T'HH:mm:ss.SSS").unwrap();
        assert_eq!(
            pattern.items(),
            &[
                field(Field::Year, 4, 0),
                literal("."),
                field(Field::Month, 2, 5),
                literal("."),
                field(Field::DayOfMonth, 2, 8),
                literal("T"),
                field(Field::Hour23, 2, 13),
                literal(":"),
                field(Field::Minute, 2, 16),
                literal(":"),
                field(Field::Second, 2, 19),
                literal("."),
                field(Field::Millisecond, 3, 22),
            ],
        );
    }

    #[test]
    fn compile_quotes() {
        let pattern = Pattern::compile("''HH'o''clock' é").unwrap();
        assert_eq!(
            pattern.items(),
            &[literal("'"), field(Field::Hour23, 2, 2), literal("o'clock é")],
        );

        let pattern = Pattern::compile("'NNNNNNNNN'").unwrap();
        assert_eq!(pattern.items(), &[literal("NNNNNNNNN")]);
        assert!(!pattern.needs_abbreviation());
    }

    #[test]
    fn numeric_fields() {
        let spec = |field, width| Spec { field, width, position: 0 };
        assert!(spec(Field::Month, 2).is_numeric());
        assert!(!spec(Field::Month, 3).is_numeric());
        assert!(spec(Field::Millisecond, 1).is_numeric());
        assert!(!spec(Field::AmPm, 1).is_numeric());
    }

    #[test]
    fn compile_errors() {
        insta::assert_snapshot!(
            Pattern::compile("HH:mm 'oops").unwrap_err(),
            @"quoted literal starting at position 6 is never closed",
        );
        insta::assert_snapshot!(
            Pattern::compile("yyyy-MM-dd ww").unwrap_err(),
            @r#"illegal pattern character "w" at position 11 (quote it to use it as a literal)"#,
        );
        insta::assert_snapshot!(
            Pattern::compile("HH:mmXXXX").unwrap_err(),
            @r#"pattern field "X" at position 5 cannot be 4 letters wide"#,
        );
    }

    #[test]
    fn abbreviation_is_only_needed_for_short_zone_names() {
        assert!(Pattern::compile("HH z").unwrap().needs_abbreviation());
        assert!(!Pattern::compile("HH zzzz").unwrap().needs_abbreviation());
    }
}
