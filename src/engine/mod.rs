/*!
The calendar engine seam.

Everything in this crate that needs to know about human calendars (what
year a timestamp falls in, how long a month is, when daylight saving time
starts in a particular place) goes through a [`CalendarEngine`]. An engine
works at millisecond precision and is keyed by time zone identifier. The
nanosecond precision of this crate's value types is preserved by
[`arith`](crate::arith), which splits off the sub-millisecond remainder
before talking to an engine and reattaches it afterwards.

The default engine is [`JiffEngine`], which is backed by the `jiff` crate
and its copy of the IANA time zone database.
*/

use std::sync::Arc;

pub use jiff::civil::Weekday;

pub use self::iana::JiffEngine;

use crate::Error;

mod iana;

/// The identifier of the UTC time zone.
///
/// This zone is always available, even without access to a time zone
/// database.
pub const UTC: &str = "UTC";

/// A calendar field that an engine knows how to add to a timestamp.
///
/// Adding to a field is calendar aware. For example, adding one
/// [`CalendarField::Month`] to January 31 yields the last day of February,
/// and adding one [`CalendarField::DayOfMonth`] across a daylight saving time
/// transition keeps the wall clock time, even though the elapsed time is 23
/// or 25 hours.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CalendarField {
    Year,
    Month,
    Week,
    DayOfMonth,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl core::fmt::Display for CalendarField {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match *self {
            CalendarField::Year => "year",
            CalendarField::Month => "month",
            CalendarField::Week => "week",
            CalendarField::DayOfMonth => "day of month",
            CalendarField::Hour => "hour",
            CalendarField::Minute => "minute",
            CalendarField::Second => "second",
            CalendarField::Millisecond => "millisecond",
        };
        f.write_str(name)
    }
}

/// The calendar fields of a timestamp, as seen from one time zone.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CalendarFields {
    pub year: i16,
    /// In the range `1..=12`.
    pub month: i8,
    /// In the range `1..=31`.
    pub day: i8,
    pub weekday: Weekday,
    /// In the range `1..=366`.
    pub day_of_year: i16,
    pub hour: i8,
    pub minute: i8,
    pub second: i8,
    pub millisecond: i16,
    /// The offset from UTC in effect at this timestamp, in seconds.
    pub offset_seconds: i32,
}

impl CalendarFields {
    /// Returns just the wall clock fields.
    pub fn civil(&self) -> CivilFields {
        CivilFields {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            millisecond: self.millisecond,
        }
    }
}

/// Wall clock fields without a time zone, used to ask an engine for the
/// timestamp they correspond to.
///
/// An `hour` of `24` is permitted when every smaller field is zero. It
/// means midnight at the end of the given day.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CivilFields {
    pub year: i16,
    pub month: i8,
    pub day: i8,
    pub hour: i8,
    pub minute: i8,
    pub second: i8,
    pub millisecond: i16,
}

impl CivilFields {
    /// Returns the fields for midnight at the start of the given day.
    pub fn date(year: i16, month: i8, day: i8) -> CivilFields {
        CivilFields { year, month, day, ..CivilFields::default() }
    }

    pub(crate) fn at_noon(mut self) -> CivilFields {
        self.hour = 12;
        self.minute = 0;
        self.second = 0;
        self.millisecond = 0;
        self
    }
}

impl core::fmt::Display for CivilFields {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
        )
    }
}

/// A calendar and time zone engine working at millisecond precision.
///
/// Every method takes a time zone identifier. Implementations should
/// report an identifier they don't recognize with
/// [`Error::unknown_time_zone`], so that callers see a configuration error.
///
/// Methods take `&mut self` so that implementations can cache resolved
/// time zones without synchronization. Each thread owns its own engine; see
/// [`arith`](crate::arith) for how the default engine is managed.
pub trait CalendarEngine {
    /// Validates the given time zone identifier and returns a shared copy
    /// of it.
    fn resolve(&mut self, time_zone: &str) -> Result<Arc<str>, Error>;

    /// Returns the calendar fields of the given millisecond timestamp in
    /// the given time zone.
    fn fields(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<CalendarFields, Error>;

    /// Adds `amount` of `field` to the given millisecond timestamp, as
    /// seen from the given time zone, and returns the resulting timestamp.
    fn add(
        &mut self,
        time_zone: &str,
        millis: i64,
        field: CalendarField,
        amount: i64,
    ) -> Result<i64, Error>;

    /// Returns the millisecond timestamp of the given wall clock fields in
    /// the given time zone.
    ///
    /// Wall clock times that are skipped or repeated by a transition are
    /// resolved the way most calendar libraries do: a gap moves forward by
    /// the length of the gap and a fold picks the earlier of the two
    /// instants.
    fn to_millis(
        &mut self,
        time_zone: &str,
        fields: &CivilFields,
    ) -> Result<i64, Error>;

    /// Returns the time zone abbreviation (like `BST` or `EST`) in effect
    /// at the given millisecond timestamp.
    fn abbreviation(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<String, Error>;
}

impl<E: CalendarEngine + ?Sized> CalendarEngine for &mut E {
    fn resolve(&mut self, time_zone: &str) -> Result<Arc<str>, Error> {
        (**self).resolve(time_zone)
    }

    fn fields(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<CalendarFields, Error> {
        (**self).fields(time_zone, millis)
    }

    fn add(
        &mut self,
        time_zone: &str,
        millis: i64,
        field: CalendarField,
        amount: i64,
    ) -> Result<i64, Error> {
        (**self).add(time_zone, millis, field, amount)
    }

    fn to_millis(
        &mut self,
        time_zone: &str,
        fields: &CivilFields,
    ) -> Result<i64, Error> {
        (**self).to_millis(time_zone, fields)
    }

    fn abbreviation(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<String, Error> {
        (**self).abbreviation(time_zone, millis)
    }
}

impl<E: CalendarEngine + ?Sized> CalendarEngine for Box<E> {
    fn resolve(&mut self, time_zone: &str) -> Result<Arc<str>, Error> {
        (**self).resolve(time_zone)
    }

    fn fields(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<CalendarFields, Error> {
        (**self).fields(time_zone, millis)
    }

    fn add(
        &mut self,
        time_zone: &str,
        millis: i64,
        field: CalendarField,
        amount: i64,
    ) -> Result<i64, Error> {
        (**self).add(time_zone, millis, field, amount)
    }

    fn to_millis(
        &mut self,
        time_zone: &str,
        fields: &CivilFields,
    ) -> Result<i64, Error> {
        (**self).to_millis(time_zone, fields)
    }

    fn abbreviation(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<String, Error> {
        (**self).abbreviation(time_zone, millis)
    }
}
