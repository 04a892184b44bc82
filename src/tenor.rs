use crate::{
    error::{tenor::Error as E, ErrorContext},
    util::parse,
    Error,
};

/// A unit of calendar-relative time used in a [`Tenor`].
///
/// Unlike [`TemporalUnit`](crate::TemporalUnit), none of these units has a
/// fixed length. A month may be 28 to 31 days, and whether a day counts
/// as a business day depends on a [`BusinessCalendar`].
///
/// [`BusinessCalendar`]: crate::business::BusinessCalendar
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TenorUnit {
    BusinessDay = 0,
    Day = 1,
    Week = 2,
    Month = 3,
    Year = 4,
}

impl TenorUnit {
    /// All units, from smallest to largest.
    pub const ALL: [TenorUnit; 5] = [
        TenorUnit::BusinessDay,
        TenorUnit::Day,
        TenorUnit::Week,
        TenorUnit::Month,
        TenorUnit::Year,
    ];

    /// Returns the single letter used for this unit in tenor text.
    pub const fn as_char(self) -> char {
        match self {
            TenorUnit::BusinessDay => 'b',
            TenorUnit::Day => 'd',
            TenorUnit::Week => 'w',
            TenorUnit::Month => 'm',
            TenorUnit::Year => 'y',
        }
    }

    /// Returns the unit for the given letter, without regard to ASCII case.
    pub fn from_char(ch: char) -> Option<TenorUnit> {
        match ch.to_ascii_lowercase() {
            'b' => Some(TenorUnit::BusinessDay),
            'd' => Some(TenorUnit::Day),
            'w' => Some(TenorUnit::Week),
            'm' => Some(TenorUnit::Month),
            'y' => Some(TenorUnit::Year),
            _ => None,
        }
    }
}

impl core::fmt::Display for TenorUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match *self {
            TenorUnit::BusinessDay => "business day",
            TenorUnit::Day => "day",
            TenorUnit::Week => "week",
            TenorUnit::Month => "month",
            TenorUnit::Year => "year",
        };
        f.write_str(name)
    }
}

/// A compound, calendar-relative period, like `1y6m` or `3b`.
///
/// A tenor is a count per [`TenorUnit`]. Units are never normalized into
/// one another: a tenor of 7 days is not equal to a tenor of 1 week, and
/// 12 months is not 1 year. Units with a count of zero are never stored, so
/// two tenors are equal exactly when they have the same non-zero counts.
///
/// A tenor means nothing on its own. It is applied to a date with
/// [`BusinessCalendar::plus_tenor`](crate::business::BusinessCalendar::plus_tenor).
///
/// # Parsing
///
/// Tenor text is one or more `<quantity><unit>` pairs with no separators,
/// where each unit is one of `b`, `d`, `w`, `m` or `y` (in any case). Each
/// unit may appear at most once.
///
/// ```
/// use nanotemporals::{Tenor, TenorUnit};
///
/// let tenor: Tenor = "1y2m3W-4b".parse()?;
/// assert_eq!(tenor.unit_length(TenorUnit::Year), 1);
/// assert_eq!(tenor.unit_length(TenorUnit::BusinessDay), -4);
/// assert_eq!(tenor.unit_length(TenorUnit::Day), 0);
/// assert_eq!(tenor.to_string(), "1y2m3w-4b");
///
/// assert_ne!("7d".parse::<Tenor>()?, "1w".parse::<Tenor>()?);
/// assert!("1y1y".parse::<Tenor>().unwrap_err().is_illegal_unit());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Tenor {
    /// Indexed by `TenorUnit as usize`.
    lengths: [i32; 5],
}

impl Tenor {
    /// The empty tenor.
    pub const ZERO: Tenor = Tenor { lengths: [0; 5] };

    pub const ONE_BUSINESS_DAY: Tenor = Tenor::of(TenorUnit::BusinessDay, 1);
    pub const TWO_BUSINESS_DAYS: Tenor = Tenor::of(TenorUnit::BusinessDay, 2);
    pub const THREE_BUSINESS_DAYS: Tenor =
        Tenor::of(TenorUnit::BusinessDay, 3);
    pub const ONE_DAY: Tenor = Tenor::of(TenorUnit::Day, 1);
    pub const TWO_DAYS: Tenor = Tenor::of(TenorUnit::Day, 2);
    pub const THREE_DAYS: Tenor = Tenor::of(TenorUnit::Day, 3);
    pub const ONE_WEEK: Tenor = Tenor::of(TenorUnit::Week, 1);
    pub const TWO_WEEKS: Tenor = Tenor::of(TenorUnit::Week, 2);
    pub const THREE_WEEKS: Tenor = Tenor::of(TenorUnit::Week, 3);
    pub const ONE_MONTH: Tenor = Tenor::of(TenorUnit::Month, 1);
    pub const TWO_MONTHS: Tenor = Tenor::of(TenorUnit::Month, 2);
    pub const THREE_MONTHS: Tenor = Tenor::of(TenorUnit::Month, 3);
    pub const SIX_MONTHS: Tenor = Tenor::of(TenorUnit::Month, 6);
    pub const NINE_MONTHS: Tenor = Tenor::of(TenorUnit::Month, 9);
    pub const ONE_YEAR: Tenor = Tenor::of(TenorUnit::Year, 1);
    pub const TWO_YEARS: Tenor = Tenor::of(TenorUnit::Year, 2);
    pub const THREE_YEARS: Tenor = Tenor::of(TenorUnit::Year, 3);
    pub const FIVE_YEARS: Tenor = Tenor::of(TenorUnit::Year, 5);
    pub const SEVEN_YEARS: Tenor = Tenor::of(TenorUnit::Year, 7);
    pub const TEN_YEARS: Tenor = Tenor::of(TenorUnit::Year, 10);
    pub const THIRTY_YEARS: Tenor = Tenor::of(TenorUnit::Year, 30);

    /// Creates a tenor made of a single unit.
    ///
    /// A `length` of zero yields [`Tenor::ZERO`].
    pub const fn of(unit: TenorUnit, length: i32) -> Tenor {
        let mut lengths = [0; 5];
        lengths[unit as usize] = length;
        Tenor { lengths }
    }

    /// Returns a builder for a tenor made of several units.
    pub fn builder() -> TenorBuilder {
        TenorBuilder::default()
    }

    /// Parses a tenor from text such as `1y6m`.
    ///
    /// This is the same as using this type's `FromStr` impl.
    pub fn parse(text: &str) -> Result<Tenor, Error> {
        let mut builder = Tenor::builder();
        let mut seen = [false; 5];
        for pair in parse::pairs("tenor", text)? {
            let mut chars = pair.unit.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                // Multiple letters in a row are reported at the second one,
                // which is where a unit was expected to end.
                let position = pair.unit_position + 1;
                let found = pair.unit.as_bytes()[1];
                return Err(E::UnknownUnit { found, position }.into());
            };
            let Some(unit) = TenorUnit::from_char(ch) else {
                let found = pair.unit.as_bytes()[0];
                let position = pair.unit_position;
                return Err(E::UnknownUnit { found, position }.into());
            };
            if core::mem::replace(&mut seen[unit as usize], true) {
                let position = pair.unit_position;
                return Err(E::DuplicateUnit { unit, position }.into());
            }
            let length = i32::try_from(pair.quantity)
                .map_err(|_| {
                    Error::range(
                        "tenor length",
                        pair.quantity,
                        i32::MIN,
                        i32::MAX,
                    )
                })
                .with_context(|| {
                    Error::from_args(format_args!(
                        "failed to parse tenor {text:?}"
                    ))
                })?;
            builder = builder.set(unit, length);
        }
        Ok(builder.build())
    }

    /// Returns the count for the given unit, or `0` if this tenor doesn't
    /// use it.
    pub fn unit_length(&self, unit: TenorUnit) -> i32 {
        self.lengths[unit as usize]
    }

    /// Returns the units with a non-zero count, from largest to smallest,
    /// along with their counts.
    pub fn units(&self) -> impl Iterator<Item = (TenorUnit, i32)> + '_ {
        TenorUnit::ALL
            .iter()
            .rev()
            .map(|&unit| (unit, self.unit_length(unit)))
            .filter(|&(_, length)| length != 0)
    }

    /// Returns true if every unit in this tenor has a count of zero.
    pub fn is_zero(&self) -> bool {
        *self == Tenor::ZERO
    }
}

impl core::fmt::Debug for Tenor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Tenor({self})")
    }
}

/// Renders a tenor in its text form, e.g., `1y6m`.
///
/// Units are written from largest to smallest. An empty tenor is written
/// as `0d`.
impl core::fmt::Display for Tenor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.is_zero() {
            return f.write_str("0d");
        }
        for (unit, length) in self.units() {
            write!(f, "{length}{}", unit.as_char())?;
        }
        Ok(())
    }
}

impl core::str::FromStr for Tenor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Tenor, Error> {
        Tenor::parse(s)
    }
}

/// A builder for a [`Tenor`].
///
/// # Example
///
/// ```
/// use nanotemporals::{Tenor, TenorUnit};
///
/// let tenor = Tenor::builder()
///     .set(TenorUnit::Year, 1)
///     .set(TenorUnit::Month, 6)
///     .set(TenorUnit::Day, 2)
///     .set(TenorUnit::Day, 0)
///     .build();
/// assert_eq!(tenor.to_string(), "1y6m");
/// ```
#[derive(Clone, Debug, Default)]
pub struct TenorBuilder {
    tenor: Tenor,
}

impl TenorBuilder {
    /// Sets the count for `unit`, replacing any previous count. A count of
    /// zero removes the unit.
    pub fn set(mut self, unit: TenorUnit, length: i32) -> TenorBuilder {
        self.tenor.lengths[unit as usize] = length;
        self
    }

    /// Builds the tenor.
    pub fn build(&self) -> Tenor {
        self.tenor
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Tenor {
    fn arbitrary(g: &mut quickcheck::Gen) -> Tenor {
        let mut builder = Tenor::builder();
        for unit in TenorUnit::ALL {
            if <bool as quickcheck::Arbitrary>::arbitrary(g) {
                let length = <i16 as quickcheck::Arbitrary>::arbitrary(g);
                builder = builder.set(unit, i32::from(length));
            }
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_units() {
        assert_eq!(Tenor::parse("3Y").unwrap(), Tenor::THREE_YEARS);
        assert_eq!(
            Tenor::parse("-3m").unwrap(),
            Tenor::of(TenorUnit::Month, -3)
        );
        assert_eq!(Tenor::parse("5w").unwrap(), Tenor::of(TenorUnit::Week, 5));
        assert_eq!(Tenor::parse("1b").unwrap(), Tenor::ONE_BUSINESS_DAY);
        assert_eq!(Tenor::parse("0d").unwrap(), Tenor::ZERO);
    }

    #[test]
    fn parse_compound() {
        let expected = Tenor::builder()
            .set(TenorUnit::Year, 1)
            .set(TenorUnit::Month, 2)
            .set(TenorUnit::Week, 3)
            .set(TenorUnit::BusinessDay, -4)
            .build();
        let parsed = Tenor::parse("1y2m3W-4b").unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.unit_length(TenorUnit::Day), 0);
        assert_eq!(
            parsed.units().collect::<Vec<_>>(),
            vec![
                (TenorUnit::Year, 1),
                (TenorUnit::Month, 2),
                (TenorUnit::Week, 3),
                (TenorUnit::BusinessDay, -4),
            ],
        );
    }

    #[test]
    fn no_normalization() {
        assert_ne!(Tenor::parse("7d").unwrap(), Tenor::parse("1w").unwrap());
        assert_ne!(Tenor::parse("12m").unwrap(), Tenor::ONE_YEAR);
        // Zero counts are dropped, so these are all equal.
        assert_eq!(Tenor::parse("0y1m").unwrap(), Tenor::ONE_MONTH);
        assert_eq!(
            Tenor::builder().set(TenorUnit::Day, 5).set(TenorUnit::Day, 0).build(),
            Tenor::ZERO,
        );
    }

    #[test]
    fn parse_errors() {
        let err = Tenor::parse("1y1y").unwrap_err();
        assert!(err.is_parse());
        assert!(err.is_illegal_unit());
        insta::assert_snapshot!(
            err,
            @"failed to parse tenor: unit 'y' at position 3 was already given earlier in the tenor (each unit may appear at most once)"
        );
        // Duplicates are rejected even when their counts would cancel out.
        assert!(Tenor::parse("1d-1d").unwrap_err().is_illegal_unit());

        insta::assert_snapshot!(
            Tenor::parse("3x").unwrap_err(),
            @r#"failed to parse tenor: found unrecognized unit "x" at position 1 (expected one of b, d, w, m or y)"#
        );
        insta::assert_snapshot!(
            Tenor::parse("3dy").unwrap_err(),
            @r#"failed to parse tenor: found unrecognized unit "y" at position 2 (expected one of b, d, w, m or y)"#
        );
        assert!(Tenor::parse("").unwrap_err().is_parse());
        assert!(Tenor::parse("1y 2m").unwrap_err().is_parse());
        assert!(Tenor::parse("3000000000d").unwrap_err().is_range());
    }

    #[test]
    fn display() {
        assert_eq!(Tenor::ZERO.to_string(), "0d");
        assert_eq!(Tenor::ONE_WEEK.to_string(), "1w");
        assert_eq!(Tenor::parse("-4B2D1Y").unwrap().to_string(), "1y2d-4b");
        assert_eq!(format!("{:?}", Tenor::SIX_MONTHS), "Tenor(6m)");
    }

    quickcheck::quickcheck! {
        fn prop_display_parse_roundtrip(tenor: Tenor) -> bool {
            Tenor::parse(&tenor.to_string()).ok() == Some(tenor)
        }
    }
}
