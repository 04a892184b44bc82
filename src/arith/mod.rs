/*!
Calendar aware arithmetic that preserves nanosecond precision.

There are two kinds of arithmetic in this module.

Arithmetic on fixed-duration units (hours and smaller, or a day treated as
exactly 24 hours) is plain checked integer arithmetic on nanosecond counts.
It never consults a calendar. See [`plus_unit`], [`plus_hours`],
[`plus_duration`] and friends.

Arithmetic on calendar fields (days, weeks, months and years) depends on
the time zone, since a day may be 23 or 25 hours long and months vary in
length. It is delegated to a [`CalendarEngine`], which only works at
millisecond precision. So a point in time is split into whole milliseconds
and a sub-millisecond remainder, the engine shifts the milliseconds and the
remainder is reattached unchanged:

```
use nanotemporals::{arith, NanoDateTime};

let dt = NanoDateTime::from_nanoseconds(1_517_417_643_357_000_357)?;
assert_eq!(dt.to_string(), "2018.01.31T16:54:03.357000357");

let next = arith::plus_months(&dt, 1)?;
assert_eq!(next.to_string(), "2018.02.28T16:54:03.357000357");

# Ok::<(), Box<dyn std::error::Error>>(())
```

Dates are shifted at noon in their time zone, so that a daylight saving
time transition can never push a date onto the wrong day.

# Engines

The free functions in this module use a per-thread [`JiffEngine`]. To use
a different engine, build an [`Arithmetics`] around it. If the per-thread
engine is already in use further up the call stack (or the thread is being
torn down), a temporary engine is used instead.
*/

use std::{cell::RefCell, sync::Arc};

use crate::{
    civil::{NanoDate, NanoDateTime, NanoTime},
    delta::NanoTimeDelta,
    engine::{
        CalendarEngine, CalendarField, CalendarFields, CivilFields,
        JiffEngine, Weekday, UTC,
    },
    error::{arith::Error as E, ErrorContext},
    unit::TemporalUnit,
    util::b,
    zoned::{ZonedNanoDate, ZonedNanoDateTime},
    Error,
};

pub mod convert;

thread_local! {
    static DEFAULT: RefCell<Arithmetics<JiffEngine>> =
        RefCell::new(Arithmetics::new(JiffEngine::new()));
}

/// Runs `f` with this thread's default arithmetic engine.
pub(crate) fn with_default<T>(
    f: impl FnOnce(&mut Arithmetics<JiffEngine>) -> Result<T, Error>,
) -> Result<T, Error> {
    let mut slot = Some(f);
    let result = DEFAULT.try_with(|cell| {
        let mut arith = cell.try_borrow_mut().ok()?;
        slot.take().map(|f| f(&mut arith))
    });
    if let Ok(Some(result)) = result {
        return result;
    }
    trace!("per-thread calendar engine is unavailable, using a temporary one");
    let mut temporary = Arithmetics::new(JiffEngine::new());
    match slot {
        Some(f) => f(&mut temporary),
        None => Err(Error::from_args(format_args!(
            "per-thread calendar engine failed without a result",
        ))),
    }
}

/// Types that participate in the arithmetic in this module.
///
/// Only this crate's value types implement these traits.
pub(crate) mod sealed {
    use crate::{engine::CalendarEngine, unit::TemporalUnit, Error};

    /// Marks values that are times of day.
    #[derive(Debug)]
    pub struct Times(());

    /// Marks values that are dates.
    #[derive(Debug)]
    pub struct Dates(());

    /// Marks values that are instants.
    #[derive(Debug)]
    pub struct DateTimes(());

    pub trait Sealed: Clone {
        /// Adds an exact number of nanoseconds.
        fn shift(&self, nanoseconds: i128) -> Result<Self, Error>;

        /// Returns the largest (when `positive`) or smallest value of this
        /// type, keeping any time zone.
        fn saturate(&self, positive: bool) -> Self;

        fn plus_calendar_unit_with(
            &self,
            engine: &mut dyn CalendarEngine,
            unit: TemporalUnit,
            amount: i64,
        ) -> Result<Self, Error>;
    }

    pub trait CalendarSealed: Sealed {
        /// True for dates, which are shifted at noon in their time zone
        /// and whose fields are read in UTC.
        const IS_DATE: bool;

        /// Returns a value of the same type and time zone with the given
        /// nanosecond count.
        fn rebuild(&self, nanoseconds: i64) -> Result<Self, Error>;
    }
}

/// A value that is a point in time, or a time of day.
///
/// This is implemented by [`NanoTime`], [`NanoDate`], [`NanoDateTime`],
/// [`ZonedNanoDate`] and [`ZonedNanoDateTime`]. Points of the same family
/// (dates, datetimes or times) may be subtracted from one another with
/// [`difference`], whether zoned or not.
pub trait Point: sealed::Sealed {
    /// The family of this point. This is an implementation detail.
    type Family;

    /// Returns the nanoseconds since the Unix epoch, or since midnight for
    /// a time of day.
    fn nanoseconds(&self) -> i64;
}

/// A point in time that has calendar fields.
///
/// This is every [`Point`] except [`NanoTime`].
pub trait CalendarPoint: Point + sealed::CalendarSealed {
    /// Returns the time zone this point's calendar is read in. Unzoned
    /// points use `UTC`.
    fn time_zone(&self) -> &str;
}

/// Calendar arithmetic backed by a particular [`CalendarEngine`].
///
/// The free functions in this module are shortcuts for using an
/// `Arithmetics<JiffEngine>` that is owned by the current thread.
///
/// # Example
///
/// ```
/// use nanotemporals::{arith::Arithmetics, engine::JiffEngine, NanoDate};
///
/// let mut arith = Arithmetics::new(JiffEngine::new());
/// let date = arith.date_from_fields(2024, 2, 29)?;
/// assert_eq!(arith.plus_years(&date, 1)?.to_string(), "2025.02.28");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Arithmetics<E> {
    engine: E,
}

impl<E: CalendarEngine> Arithmetics<E> {
    /// Creates arithmetic backed by the given engine.
    pub fn new(engine: E) -> Arithmetics<E> {
        Arithmetics { engine }
    }

    /// Returns the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consumes this value and returns its engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    fn dyn_engine(&mut self) -> &mut dyn CalendarEngine {
        &mut self.engine
    }

    /// Validates a time zone identifier.
    pub fn resolve(&mut self, time_zone: &str) -> Result<Arc<str>, Error> {
        self.engine.resolve(time_zone)
    }

    /// Adds `amount` of a calendar field to a point in time.
    pub fn plus_field<P: CalendarPoint>(
        &mut self,
        point: &P,
        field: CalendarField,
        amount: i64,
    ) -> Result<P, Error> {
        plus_field_with(self.dyn_engine(), point, field, amount)
    }

    /// Subtracts `amount` of a calendar field from a point in time.
    pub fn minus_field<P: CalendarPoint>(
        &mut self,
        point: &P,
        field: CalendarField,
        amount: i64,
    ) -> Result<P, Error> {
        self.plus_field(point, field, negate(amount)?)
    }

    pub fn plus_days<P: CalendarPoint>(
        &mut self,
        point: &P,
        days: i64,
    ) -> Result<P, Error> {
        self.plus_field(point, CalendarField::DayOfMonth, days)
    }

    pub fn minus_days<P: CalendarPoint>(
        &mut self,
        point: &P,
        days: i64,
    ) -> Result<P, Error> {
        self.minus_field(point, CalendarField::DayOfMonth, days)
    }

    pub fn plus_weeks<P: CalendarPoint>(
        &mut self,
        point: &P,
        weeks: i64,
    ) -> Result<P, Error> {
        self.plus_field(point, CalendarField::Week, weeks)
    }

    pub fn minus_weeks<P: CalendarPoint>(
        &mut self,
        point: &P,
        weeks: i64,
    ) -> Result<P, Error> {
        self.minus_field(point, CalendarField::Week, weeks)
    }

    pub fn plus_months<P: CalendarPoint>(
        &mut self,
        point: &P,
        months: i64,
    ) -> Result<P, Error> {
        self.plus_field(point, CalendarField::Month, months)
    }

    pub fn minus_months<P: CalendarPoint>(
        &mut self,
        point: &P,
        months: i64,
    ) -> Result<P, Error> {
        self.minus_field(point, CalendarField::Month, months)
    }

    pub fn plus_years<P: CalendarPoint>(
        &mut self,
        point: &P,
        years: i64,
    ) -> Result<P, Error> {
        self.plus_field(point, CalendarField::Year, years)
    }

    pub fn minus_years<P: CalendarPoint>(
        &mut self,
        point: &P,
        years: i64,
    ) -> Result<P, Error> {
        self.minus_field(point, CalendarField::Year, years)
    }

    /// Adds `amount` of a unit as a calendar field.
    ///
    /// Units of a millisecond and up go through the engine (a day is a
    /// calendar day). Microsecond and nanosecond amounts are split into
    /// whole milliseconds, which go through the engine, and a remainder
    /// that is added exactly.
    ///
    /// A [`NanoTime`] only supports hours, minutes, seconds and
    /// milliseconds. Any other unit returns an error.
    pub fn plus_calendar_unit<P: Point>(
        &mut self,
        point: &P,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<P, Error> {
        point.plus_calendar_unit_with(self.dyn_engine(), unit, amount)
    }

    pub fn minus_calendar_unit<P: Point>(
        &mut self,
        point: &P,
        unit: TemporalUnit,
        amount: i64,
    ) -> Result<P, Error> {
        self.plus_calendar_unit(point, unit, negate(amount)?)
    }

    /// Returns the calendar fields of a point in its own time zone.
    ///
    /// Dates always report their own year, month and day, whatever their
    /// time zone.
    pub fn fields<P: CalendarPoint>(
        &mut self,
        point: &P,
    ) -> Result<CalendarFields, Error> {
        fields_with(self.dyn_engine(), point)
    }

    /// Returns the calendar fields of an unzoned datetime as seen from the
    /// given time zone.
    pub fn fields_in(
        &mut self,
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<CalendarFields, Error> {
        let (millis, _) = b::split_millis(datetime.nanoseconds());
        self.engine.fields(time_zone, millis)
    }

    pub fn year<P: CalendarPoint>(&mut self, point: &P) -> Result<i16, Error> {
        self.fields(point).map(|f| f.year)
    }

    /// Returns the month, where January is `1`.
    pub fn month<P: CalendarPoint>(&mut self, point: &P) -> Result<i8, Error> {
        self.fields(point).map(|f| f.month)
    }

    pub fn day_of_month<P: CalendarPoint>(
        &mut self,
        point: &P,
    ) -> Result<i8, Error> {
        self.fields(point).map(|f| f.day)
    }

    pub fn day_of_week<P: CalendarPoint>(
        &mut self,
        point: &P,
    ) -> Result<Weekday, Error> {
        self.fields(point).map(|f| f.weekday)
    }

    pub fn year_in(
        &mut self,
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<i16, Error> {
        self.fields_in(time_zone, datetime).map(|f| f.year)
    }

    pub fn month_in(
        &mut self,
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<i8, Error> {
        self.fields_in(time_zone, datetime).map(|f| f.month)
    }

    pub fn day_of_month_in(
        &mut self,
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<i8, Error> {
        self.fields_in(time_zone, datetime).map(|f| f.day)
    }

    pub fn day_of_week_in(
        &mut self,
        time_zone: &str,
        datetime: &NanoDateTime,
    ) -> Result<Weekday, Error> {
        self.fields_in(time_zone, datetime).map(|f| f.weekday)
    }

    /// Returns the time zone abbreviation in effect at a point, in that
    /// point's time zone.
    pub fn abbreviation<P: CalendarPoint>(
        &mut self,
        point: &P,
    ) -> Result<String, Error> {
        let (millis, _) = b::split_millis(point.nanoseconds());
        self.engine.abbreviation(point.time_zone(), millis)
    }

    /// Builds a date from its year, month and day.
    pub fn date_from_fields(
        &mut self,
        year: i16,
        month: i8,
        day: i8,
    ) -> Result<NanoDate, Error> {
        let nanos = date_nanos(self.dyn_engine(), year, month, day)?;
        NanoDate::from_nanoseconds(nanos)
    }

    /// Builds a zoned date from its time zone, year, month and day.
    pub fn zoned_date_from_fields(
        &mut self,
        time_zone: &str,
        year: i16,
        month: i8,
        day: i8,
    ) -> Result<ZonedNanoDate, Error> {
        let time_zone = self.engine.resolve(time_zone)?;
        let nanos = date_nanos(self.dyn_engine(), year, month, day)?;
        ZonedNanoDate::from_resolved(time_zone, nanos)
    }

    /// Builds the instant at which the given date's wall clock shows the
    /// given time, in the date's time zone.
    ///
    /// [`NanoTime::midnight_next_day`] resolves to midnight at the start of
    /// the following day.
    pub fn zoned_from_date_and_time(
        &mut self,
        date: &ZonedNanoDate,
        time: &NanoTime,
    ) -> Result<ZonedNanoDateTime, Error> {
        let day = date_civil(self.dyn_engine(), date.nanoseconds())?;
        let (_, remainder) = b::split_millis(time.nanoseconds());
        let wall = CivilFields {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            millisecond: time.millisecond(),
            ..day
        };
        let millis = self
            .engine
            .to_millis(date.time_zone(), &wall)
            .with_context(|| {
                Error::from_args(format_args!(
                    "failed to combine {date} and {time} in time zone {tz:?}",
                    tz = date.time_zone(),
                ))
            })?;
        let nanos = b::join_millis(millis, remainder)
            .ok_or_else(|| overflow("combining a date and a time"))?;
        ZonedNanoDateTime::from_resolved(Arc::clone(date.time_zone_arc()), nanos)
    }

    /// Returns the date on the wall clock of a zoned datetime.
    pub fn local_date(
        &mut self,
        datetime: &ZonedNanoDateTime,
    ) -> Result<ZonedNanoDate, Error> {
        let fields = self.fields(datetime)?;
        let nanos = date_nanos(
            self.dyn_engine(),
            fields.year,
            fields.month,
            fields.day,
        )?;
        ZonedNanoDate::from_resolved(Arc::clone(datetime.time_zone_arc()), nanos)
    }

    /// Returns the time on the wall clock of a zoned datetime.
    pub fn local_time(
        &mut self,
        datetime: &ZonedNanoDateTime,
    ) -> Result<NanoTime, Error> {
        let fields = self.fields(datetime)?;
        let (_, remainder) = b::split_millis(datetime.nanoseconds());
        let nanos = i64::from(fields.hour) * b::NANOS_PER_HOUR
            + i64::from(fields.minute) * b::NANOS_PER_MINUTE
            + i64::from(fields.second) * b::NANOS_PER_SECOND
            + i64::from(fields.millisecond) * b::NANOS_PER_MILLI
            + remainder;
        NanoTime::from_nanoseconds(nanos)
    }
}

impl Default for Arithmetics<JiffEngine> {
    fn default() -> Arithmetics<JiffEngine> {
        Arithmetics::new(JiffEngine::new())
    }
}

pub(crate) fn plus_field_with<P: CalendarPoint>(
    engine: &mut dyn CalendarEngine,
    point: &P,
    field: CalendarField,
    amount: i64,
) -> Result<P, Error> {
    let tz = point.time_zone();
    let context = || {
        Error::from_args(format_args!(
            "failed to add {amount} to {field} in time zone {tz:?}",
        ))
    };
    let nanos = if P::IS_DATE {
        let noon = date_civil(engine, point.nanoseconds())?.at_noon();
        let millis = engine.to_millis(tz, &noon)?;
        let shifted =
            engine.add(tz, millis, field, amount).with_context(context)?;
        let local = engine.fields(tz, shifted)?;
        date_nanos(engine, local.year, local.month, local.day)?
    } else {
        let (millis, remainder) = b::split_millis(point.nanoseconds());
        let shifted =
            engine.add(tz, millis, field, amount).with_context(context)?;
        b::join_millis(shifted, remainder)
            .ok_or_else(|| overflow("calendar field arithmetic"))?
    };
    point.rebuild(nanos)
}

pub(crate) fn plus_calendar_unit_with<P: CalendarPoint>(
    engine: &mut dyn CalendarEngine,
    point: &P,
    unit: TemporalUnit,
    amount: i64,
) -> Result<P, Error> {
    if let Some(field) = unit.calendar_field() {
        return plus_field_with(engine, point, field, amount);
    }
    let per_milli = TemporalUnit::Millisecond.whole(unit);
    let (millis, remainder) = (amount / per_milli, amount % per_milli);
    let point =
        plus_field_with(engine, point, CalendarField::Millisecond, millis)?;
    plus_unit(&point, unit, remainder)
}

/// Calendar arithmetic on a time of day is fixed-duration arithmetic on the
/// units a clock has.
pub(crate) fn plus_time_calendar_unit(
    time: &NanoTime,
    unit: TemporalUnit,
    amount: i64,
) -> Result<NanoTime, Error> {
    match unit {
        TemporalUnit::Hour
        | TemporalUnit::Minute
        | TemporalUnit::Second
        | TemporalUnit::Millisecond => plus_unit(time, unit, amount),
        _ => Err(E::UnsupportedTimeUnit { unit }.into()),
    }
}

fn fields_with<P: CalendarPoint>(
    engine: &mut dyn CalendarEngine,
    point: &P,
) -> Result<CalendarFields, Error> {
    let (millis, _) = b::split_millis(point.nanoseconds());
    let tz = if P::IS_DATE { UTC } else { point.time_zone() };
    engine.fields(tz, millis)
}

/// Returns midnight on the civil day of a date's nanosecond count.
fn date_civil(
    engine: &mut dyn CalendarEngine,
    nanos: i64,
) -> Result<CivilFields, Error> {
    let (millis, _) = b::split_millis(nanos);
    let fields = engine.fields(UTC, millis)?;
    Ok(CivilFields::date(fields.year, fields.month, fields.day))
}

/// Returns the nanosecond count of a date from its fields.
fn date_nanos(
    engine: &mut dyn CalendarEngine,
    year: i16,
    month: i8,
    day: i8,
) -> Result<i64, Error> {
    let year = b::Year::check(year)?;
    let month = b::Month::check(month)?;
    let day = b::Day::check(day)?;
    let millis = engine.to_millis(UTC, &CivilFields::date(year, month, day))?;
    b::join_millis(millis, 0).ok_or_else(|| overflow("building a date"))
}

/// Adds `amount` of a fixed-duration unit. A day is exactly 24 hours.
///
/// A [`NanoTime`] wraps around midnight.
///
/// # Example
///
/// ```
/// use nanotemporals::{arith, NanoTime, TemporalUnit};
///
/// let t = NanoTime::parse("23:30:00.000")?;
/// let t = arith::plus_unit(&t, TemporalUnit::Hour, 1)?;
/// assert_eq!(t.to_string(), "00:30:00.000000000");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn plus_unit<P: Point>(
    point: &P,
    unit: TemporalUnit,
    amount: i64,
) -> Result<P, Error> {
    let nanos = i128::from(amount) * i128::from(unit.nanoseconds());
    point.shift(nanos)
}

pub fn minus_unit<P: Point>(
    point: &P,
    unit: TemporalUnit,
    amount: i64,
) -> Result<P, Error> {
    plus_unit(point, unit, negate(amount)?)
}

macro_rules! fixed_unit_arithmetic {
    ($(($plus:ident, $minus:ident, $unit:ident, $what:literal)),* $(,)?) => {
        $(
            #[doc = concat!("Adds a number of ", $what, ".")]
            pub fn $plus<P: Point>(point: &P, amount: i64) -> Result<P, Error> {
                plus_unit(point, TemporalUnit::$unit, amount)
            }

            #[doc = concat!("Subtracts a number of ", $what, ".")]
            pub fn $minus<P: Point>(point: &P, amount: i64) -> Result<P, Error> {
                minus_unit(point, TemporalUnit::$unit, amount)
            }
        )*
    }
}

fixed_unit_arithmetic! {
    (plus_hours, minus_hours, Hour, "hours"),
    (plus_minutes, minus_minutes, Minute, "minutes"),
    (plus_seconds, minus_seconds, Second, "seconds"),
    (plus_milliseconds, minus_milliseconds, Millisecond, "milliseconds"),
    (plus_microseconds, minus_microseconds, Microsecond, "microseconds"),
    (plus_nanoseconds, minus_nanoseconds, Nanosecond, "nanoseconds"),
}

/// Adds a duration to a point.
///
/// [`NanoTimeDelta::MAX`] yields the largest value of the point's type and
/// [`NanoTimeDelta::MIN`] yields the smallest. A zoned point keeps its
/// time zone.
///
/// # Example
///
/// ```
/// use nanotemporals::{arith, NanoDateTime, NanoTimeDelta};
///
/// let dt = NanoDateTime::parse("2019.05.21T18:45:07.345")?;
/// assert_eq!(arith::plus_duration(&dt, NanoTimeDelta::MAX)?, NanoDateTime::max());
///
/// let delta: NanoTimeDelta = "1h15m".parse()?;
/// let later = arith::plus_duration(&dt, delta)?;
/// assert_eq!(later.to_string(), "2019.05.21T20:00:07.345000000");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn plus_duration<P: Point>(
    point: &P,
    duration: NanoTimeDelta,
) -> Result<P, Error> {
    if duration == NanoTimeDelta::MAX {
        Ok(point.saturate(true))
    } else if duration == NanoTimeDelta::MIN {
        Ok(point.saturate(false))
    } else {
        point.shift(i128::from(duration.to_whole_nanoseconds()))
    }
}

/// Subtracts a duration from a point.
///
/// [`NanoTimeDelta::MAX`] yields the smallest value of the point's type
/// and [`NanoTimeDelta::MIN`] yields the largest.
pub fn minus_duration<P: Point>(
    point: &P,
    duration: NanoTimeDelta,
) -> Result<P, Error> {
    if duration == NanoTimeDelta::MAX {
        Ok(point.saturate(false))
    } else if duration == NanoTimeDelta::MIN {
        Ok(point.saturate(true))
    } else {
        point.shift(-i128::from(duration.to_whole_nanoseconds()))
    }
}

/// Returns `end - start`.
///
/// Both points must be of the same family: two times, two dates or two
/// datetimes. Zoned and unzoned points mix freely. This never consults a
/// calendar.
///
/// A difference of exactly `i64::MAX` or `i64::MIN` nanoseconds is equal to
/// one of the unbounded sentinels, [`NanoTimeDelta::MAX`] or
/// [`NanoTimeDelta::MIN`].
///
/// # Example
///
/// ```
/// use nanotemporals::{arith, NanoDateTime, ZonedNanoDateTime};
///
/// let start = NanoDateTime::from_nanoseconds(1_000)?;
/// let end = ZonedNanoDateTime::from_nanoseconds("Europe/London", 4_000)?;
/// assert_eq!(arith::difference(&start, &end)?.to_whole_nanoseconds(), 3_000);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn difference<A, B>(start: &A, end: &B) -> Result<NanoTimeDelta, Error>
where
    A: Point,
    B: Point<Family = A::Family>,
{
    end.nanoseconds()
        .checked_sub(start.nanoseconds())
        .map(NanoTimeDelta::from_nanoseconds)
        .ok_or_else(|| overflow("difference"))
}

/// Validates a time zone identifier with this thread's engine.
pub fn resolve(time_zone: &str) -> Result<Arc<str>, Error> {
    with_default(|arith| arith.resolve(time_zone))
}

/// Adds `amount` of a calendar field to a point in time.
pub fn plus_field<P: CalendarPoint>(
    point: &P,
    field: CalendarField,
    amount: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.plus_field(point, field, amount))
}

/// Subtracts `amount` of a calendar field from a point in time.
pub fn minus_field<P: CalendarPoint>(
    point: &P,
    field: CalendarField,
    amount: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.minus_field(point, field, amount))
}

/// Adds calendar days. Across a daylight saving time transition, the wall
/// clock time is kept.
pub fn plus_days<P: CalendarPoint>(point: &P, days: i64) -> Result<P, Error> {
    with_default(|arith| arith.plus_days(point, days))
}

pub fn minus_days<P: CalendarPoint>(point: &P, days: i64) -> Result<P, Error> {
    with_default(|arith| arith.minus_days(point, days))
}

pub fn plus_weeks<P: CalendarPoint>(point: &P, weeks: i64) -> Result<P, Error> {
    with_default(|arith| arith.plus_weeks(point, weeks))
}

pub fn minus_weeks<P: CalendarPoint>(
    point: &P,
    weeks: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.minus_weeks(point, weeks))
}

/// Adds calendar months. The day of the month is clamped to the length of
/// the resulting month.
pub fn plus_months<P: CalendarPoint>(
    point: &P,
    months: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.plus_months(point, months))
}

pub fn minus_months<P: CalendarPoint>(
    point: &P,
    months: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.minus_months(point, months))
}

pub fn plus_years<P: CalendarPoint>(point: &P, years: i64) -> Result<P, Error> {
    with_default(|arith| arith.plus_years(point, years))
}

pub fn minus_years<P: CalendarPoint>(
    point: &P,
    years: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.minus_years(point, years))
}

/// Adds `amount` of a unit as a calendar field. See
/// [`Arithmetics::plus_calendar_unit`].
pub fn plus_calendar_unit<P: Point>(
    point: &P,
    unit: TemporalUnit,
    amount: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.plus_calendar_unit(point, unit, amount))
}

pub fn minus_calendar_unit<P: Point>(
    point: &P,
    unit: TemporalUnit,
    amount: i64,
) -> Result<P, Error> {
    with_default(|arith| arith.minus_calendar_unit(point, unit, amount))
}

/// Returns the calendar fields of a point. See [`Arithmetics::fields`].
pub fn fields<P: CalendarPoint>(point: &P) -> Result<CalendarFields, Error> {
    with_default(|arith| arith.fields(point))
}

pub fn fields_in(
    time_zone: &str,
    datetime: &NanoDateTime,
) -> Result<CalendarFields, Error> {
    with_default(|arith| arith.fields_in(time_zone, datetime))
}

pub fn year<P: CalendarPoint>(point: &P) -> Result<i16, Error> {
    with_default(|arith| arith.year(point))
}

pub fn month<P: CalendarPoint>(point: &P) -> Result<i8, Error> {
    with_default(|arith| arith.month(point))
}

pub fn day_of_month<P: CalendarPoint>(point: &P) -> Result<i8, Error> {
    with_default(|arith| arith.day_of_month(point))
}

pub fn day_of_week<P: CalendarPoint>(point: &P) -> Result<Weekday, Error> {
    with_default(|arith| arith.day_of_week(point))
}

pub fn year_in(time_zone: &str, datetime: &NanoDateTime) -> Result<i16, Error> {
    with_default(|arith| arith.year_in(time_zone, datetime))
}

pub fn month_in(time_zone: &str, datetime: &NanoDateTime) -> Result<i8, Error> {
    with_default(|arith| arith.month_in(time_zone, datetime))
}

pub fn day_of_month_in(
    time_zone: &str,
    datetime: &NanoDateTime,
) -> Result<i8, Error> {
    with_default(|arith| arith.day_of_month_in(time_zone, datetime))
}

pub fn day_of_week_in(
    time_zone: &str,
    datetime: &NanoDateTime,
) -> Result<Weekday, Error> {
    with_default(|arith| arith.day_of_week_in(time_zone, datetime))
}

pub fn date_from_fields(
    year: i16,
    month: i8,
    day: i8,
) -> Result<NanoDate, Error> {
    with_default(|arith| arith.date_from_fields(year, month, day))
}

pub fn zoned_date_from_fields(
    time_zone: &str,
    year: i16,
    month: i8,
    day: i8,
) -> Result<ZonedNanoDate, Error> {
    with_default(|arith| {
        arith.zoned_date_from_fields(time_zone, year, month, day)
    })
}

/// Returns the error for a nanosecond count that no longer fits in 64 bits.
#[cold]
#[inline(never)]
pub(crate) fn overflow(operation: &'static str) -> Error {
    Error::from(E::Overflow { operation })
}

fn negate(amount: i64) -> Result<i64, Error> {
    amount.checked_neg().ok_or_else(|| overflow("negation"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> NanoDateTime {
        NanoDateTime::parse(s).unwrap()
    }

    // 2018-01-31T16:54:03.357Z
    const EXAMPLE: i64 = 1_517_417_643_357_000_000;

    #[test]
    fn datetime_fixed_units() {
        let dt = NanoDateTime::from_nanoseconds(EXAMPLE).unwrap();
        assert_eq!(dt.to_string(), "2018.01.31T16:54:03.357000000");

        let got = |r: Result<NanoDateTime, Error>| r.unwrap().to_string();
        assert_eq!(
            got(minus_seconds(&dt, 357)),
            "2018.01.31T16:48:06.357000000",
        );
        assert_eq!(
            got(minus_milliseconds(&dt, 357)),
            "2018.01.31T16:54:03.000000000",
        );
        assert_eq!(
            got(minus_microseconds(&dt, 357)),
            "2018.01.31T16:54:03.356643000",
        );
        assert_eq!(
            got(minus_nanoseconds(&dt, 357)),
            "2018.01.31T16:54:03.356999643",
        );
        assert_eq!(
            got(plus_seconds(&dt, 357)),
            "2018.01.31T17:00:00.357000000",
        );
        assert_eq!(
            got(plus_milliseconds(&dt, 357)),
            "2018.01.31T16:54:03.714000000",
        );
        assert_eq!(
            got(plus_microseconds(&dt, 357)),
            "2018.01.31T16:54:03.357357000",
        );
        assert_eq!(
            got(plus_nanoseconds(&dt, 357)),
            "2018.01.31T16:54:03.357000357",
        );
    }

    #[test]
    fn time_fixed_units() {
        let t = NanoTime::parse("21:32:49.195").unwrap();
        let got = |r: Result<NanoTime, Error>| r.unwrap().to_string();
        assert_eq!(got(minus_seconds(&t, 357)), "21:26:52.195000000");
        assert_eq!(got(plus_seconds(&t, 357)), "21:38:46.195000000");
        assert_eq!(got(minus_milliseconds(&t, 357)), "21:32:48.838000000");
        assert_eq!(got(plus_milliseconds(&t, 357)), "21:32:49.552000000");
        assert_eq!(
            got(minus_microseconds(&t, 357_753)),
            "21:32:48.837247000",
        );
        assert_eq!(got(plus_microseconds(&t, 357_753)), "21:32:49.552753000");
        assert_eq!(
            got(minus_nanoseconds(&t, 357_753_357)),
            "21:32:48.837246643",
        );
        assert_eq!(
            got(plus_nanoseconds(&t, 357_753_357)),
            "21:32:49.552753357",
        );
    }

    #[test]
    fn time_wraps_around_midnight() {
        let t = NanoTime::parse("23:00:00.000").unwrap();
        assert_eq!(
            plus_hours(&t, 2).unwrap().to_string(),
            "01:00:00.000000000"
        );
        assert_eq!(
            minus_hours(&t, 24).unwrap().to_string(),
            "23:00:00.000000000"
        );
        // Landing exactly on the end of the day is representable.
        assert_eq!(plus_hours(&t, 1).unwrap(), NanoTime::midnight_next_day());
        assert_eq!(
            plus_hours(&NanoTime::midnight_next_day(), 1).unwrap().to_string(),
            "01:00:00.000000000",
        );
    }

    #[test]
    fn calendar_fields_keep_sub_millisecond_precision() {
        let dt = NanoDateTime::from_nanoseconds(EXAMPLE + 357).unwrap();
        let next = plus_months(&dt, 1).unwrap();
        assert_eq!(next.to_string(), "2018.02.28T16:54:03.357000357");
        let prev = minus_years(&next, 1).unwrap();
        assert_eq!(prev.to_string(), "2017.02.28T16:54:03.357000357");
        let weeks = plus_weeks(&dt, 2).unwrap();
        assert_eq!(weeks.to_string(), "2018.02.14T16:54:03.357000357");
        // Negative nanosecond counts split on the floor.
        let old = datetime("1969.12.31T23:59:59.999");
        let old = minus_nanoseconds(&old, 1).unwrap();
        assert_eq!(
            plus_days(&old, 1).unwrap().to_string(),
            "1970.01.01T23:59:59.998999999",
        );
    }

    #[test]
    fn calendar_units() {
        let dt = NanoDateTime::from_nanoseconds(EXAMPLE).unwrap();
        let got = |unit, n| {
            plus_calendar_unit(&dt, unit, n).unwrap().to_string()
        };
        assert_eq!(got(TemporalUnit::Day, 1), "2018.02.01T16:54:03.357000000");
        assert_eq!(
            got(TemporalUnit::Microsecond, 1_500),
            "2018.01.31T16:54:03.358500000",
        );
        assert_eq!(
            got(TemporalUnit::Nanosecond, -2_000_001),
            "2018.01.31T16:54:03.354999999",
        );

        let t = NanoTime::midday();
        assert_eq!(
            plus_calendar_unit(&t, TemporalUnit::Minute, 90)
                .unwrap()
                .to_string(),
            "13:30:00.000000000",
        );
        let err =
            plus_calendar_unit(&t, TemporalUnit::Nanosecond, 1).unwrap_err();
        assert!(err.is_illegal_unit());
        insta::assert_snapshot!(
            err,
            @"calendar arithmetic on a time of day only supports hours, minutes, seconds and milliseconds, but got nanoseconds"
        );
    }

    #[test]
    fn dates_shift_at_noon() {
        let _ = env_logger::try_init();

        let date = ZonedNanoDate::builder()
            .time_zone("Europe/London")
            .year(2019)
            .month(3)
            .day(30)
            .build()
            .unwrap();
        let next = plus_days(&date, 1).unwrap();
        assert_eq!(next.to_string(), "2019.03.31");
        assert_eq!(next.time_zone(), "Europe/London");
        assert_eq!(
            difference(&date, &next).unwrap().to_whole_days(),
            1,
            "dates stay on day boundaries",
        );
        let back = minus_days(&next, 1).unwrap();
        assert_eq!(back, date);

        let date = date_from_fields(2020, 1, 31).unwrap();
        assert_eq!(plus_months(&date, 1).unwrap().to_string(), "2020.02.29");
        assert_eq!(plus_years(&date, -1).unwrap().to_string(), "2019.01.31");
        assert_eq!(day_of_week(&date).unwrap(), Weekday::Friday);
    }

    #[test]
    fn durations() {
        let dt = NanoDateTime::from_nanoseconds(EXAMPLE).unwrap();
        assert_eq!(
            plus_duration(&dt, NanoTimeDelta::MAX).unwrap(),
            NanoDateTime::max()
        );
        assert_eq!(
            plus_duration(&dt, NanoTimeDelta::MIN).unwrap(),
            NanoDateTime::min()
        );
        assert_eq!(
            minus_duration(&dt, NanoTimeDelta::MAX).unwrap(),
            NanoDateTime::min()
        );
        assert_eq!(
            minus_duration(&dt, NanoTimeDelta::MIN).unwrap(),
            NanoDateTime::max()
        );
        let delta = NanoTimeDelta::from_milliseconds(1_500).unwrap();
        assert_eq!(
            minus_duration(&dt, delta).unwrap().to_string(),
            "2018.01.31T16:54:01.857000000",
        );

        let zoned = ZonedNanoDateTime::from_nanoseconds(
            "America/New_York",
            EXAMPLE,
        )
        .unwrap();
        let later = plus_duration(&zoned, delta).unwrap();
        assert_eq!(later.time_zone(), "America/New_York");
        let max = plus_duration(&zoned, NanoTimeDelta::MAX).unwrap();
        assert_eq!(max.time_zone(), "America/New_York");
        assert_eq!(max.nanoseconds(), i64::MAX);
    }

    #[test]
    fn overflow_is_a_range_error() {
        let max = NanoDateTime::max();
        let err = plus_nanoseconds(&max, 1).unwrap_err();
        assert!(err.is_range());
        let min = NanoDateTime::min();
        assert!(minus_nanoseconds(&min, 1).unwrap_err().is_range());
        assert!(difference(&min, &max).unwrap_err().is_range());
        assert!(minus_days(&min, 1).unwrap_err().is_range());
    }

    quickcheck::quickcheck! {
        fn prop_difference_is_end_minus_start(a: NanoDateTime, b: NanoDateTime) -> bool {
            match difference(&a, &b) {
                Ok(delta) => {
                    Some(delta.to_whole_nanoseconds())
                        == b.nanoseconds().checked_sub(a.nanoseconds())
                }
                Err(_) => b.nanoseconds().checked_sub(a.nanoseconds()).is_none(),
            }
        }

        fn prop_plus_then_minus_is_identity(dt: NanoDateTime, n: i32) -> bool {
            let n = i64::from(n);
            match plus_nanoseconds(&dt, n) {
                Ok(shifted) => minus_nanoseconds(&shifted, n).ok() == Some(dt),
                Err(_) => true,
            }
        }

        fn prop_calendar_fields_keep_sub_millisecond_digits(
            dt: NanoDateTime,
            zone: u8,
            field: u8,
            amount: i16
        ) -> bool {
            const ZONES: &[&str] = &[
                "UTC",
                "Europe/London",
                "America/New_York",
                "Asia/Kolkata",
                "Australia/Lord_Howe",
                "Pacific/Chatham",
            ];
            let tz = ZONES[usize::from(zone) % ZONES.len()];
            let zdt = ZonedNanoDateTime::from_nanoseconds(tz, dt.nanoseconds())
                .unwrap();
            let amount = i64::from(amount);
            let got = match field % 3 {
                0 => plus_days(&zdt, amount),
                1 => plus_months(&zdt, amount),
                _ => plus_years(&zdt, amount),
            };
            match got {
                Ok(moved) => {
                    moved.nanoseconds().rem_euclid(1_000_000)
                        == zdt.nanoseconds().rem_euclid(1_000_000)
                }
                Err(err) => err.is_range(),
            }
        }
    }
}
