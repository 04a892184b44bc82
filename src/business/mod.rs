/*!
Business day calendars.

A business calendar knows the holidays observed in one time zone, and from
them, which days are business days. A business day is a day that is
neither a holiday nor a Saturday or Sunday.

Holidays are loaded from a [`HolidaySource`]. The default source,
[`DirHolidaySource`], reads one `<time-zone>.csv` file per time zone from a
directory, where the `/` in the time zone identifier is replaced with `-`.
Each line in the file looks like this:

```text
2019.05.27 | BANK_HOLIDAY | Spring bank holiday
```

A holiday table only covers a limited span of dates: from its first record
to its last. Every query must fall inside of that span, and asking about
any other date returns an error. This also means every search for a
holiday or business day ends at the edge of the table.

# Example

```
use nanotemporals::{
    business::{BusinessCalendar, SimpleBusinessCalendar},
    ZonedNanoDate,
};

let cal = SimpleBusinessCalendar::get("Europe/London")?;
let friday = ZonedNanoDate::parse("Europe/London", "2019.05.31")?;
assert!(cal.is_business_day(&friday)?);
assert_eq!(cal.next_business_day(&friday)?.to_string(), "2019.06.03");
assert_eq!(cal.prev_holiday(&friday)?.to_string(), "2019.05.27");
assert_eq!(cal.plus_business_days(&friday, -4)?.to_string(), "2019.05.24");

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock},
};

use crate::{
    arith,
    engine::Weekday,
    error::{business::Error as E, ErrorContext},
    tenor::{Tenor, TenorUnit},
    zoned::ZonedNanoDate,
    Error,
};

pub use self::source::{
    parse_holidays, DirHolidaySource, HolidaySource, CALENDAR_DIR_ENV,
};

mod source;

/// The most days any search will walk before giving up.
const MAX_SCAN_DAYS: i64 = 3_660;

/// The kind of a holiday.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HolidayType {
    /// A holiday observed locally, but not by banks.
    LocalHoliday,
    /// A holiday on which banks are closed.
    BankHoliday,
}

impl HolidayType {
    /// Returns the name of this type as written in holiday records.
    pub fn as_str(self) -> &'static str {
        match self {
            HolidayType::LocalHoliday => "LOCAL_HOLIDAY",
            HolidayType::BankHoliday => "BANK_HOLIDAY",
        }
    }

    /// Returns the type written as `name` in a holiday record.
    ///
    /// Matching is exact.
    pub fn from_name(name: &str) -> Option<HolidayType> {
        match name {
            "LOCAL_HOLIDAY" => Some(HolidayType::LocalHoliday),
            "BANK_HOLIDAY" => Some(HolidayType::BankHoliday),
            _ => None,
        }
    }
}

impl core::fmt::Display for HolidayType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a holiday table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Holiday {
    date: ZonedNanoDate,
    kind: HolidayType,
    name: Box<str>,
}

impl Holiday {
    pub fn new(date: ZonedNanoDate, kind: HolidayType, name: &str) -> Holiday {
        Holiday { date, kind, name: name.into() }
    }

    pub fn date(&self) -> &ZonedNanoDate {
        &self.date
    }

    pub fn kind(&self) -> HolidayType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Queries against a table of holidays.
///
/// Implementors only need to provide the table itself: its time zone, its
/// bounds and a lookup by date. Everything else is provided in terms of
/// those.
///
/// Every method that accepts a date returns an error when that date is
/// before [`first_day`](BusinessCalendar::first_day) or after
/// [`last_day`](BusinessCalendar::last_day). Searches return an error when
/// they would step outside of those bounds.
///
/// Only the year, month and day of a date are consulted. Its time zone is
/// not compared with the calendar's, and returned dates keep the time zone
/// of the date they were computed from.
pub trait BusinessCalendar {
    /// The IANA identifier of the time zone whose holidays this calendar
    /// holds.
    fn time_zone(&self) -> &str;

    /// The earliest date covered by this calendar.
    fn first_day(&self) -> &ZonedNanoDate;

    /// The latest date covered by this calendar.
    fn last_day(&self) -> &ZonedNanoDate;

    /// Returns the holiday falling on `date`, if there is one.
    fn holiday(&self, date: &ZonedNanoDate) -> Result<Option<&Holiday>, Error>;

    fn is_holiday(&self, date: &ZonedNanoDate) -> Result<bool, Error> {
        Ok(self.holiday(date)?.is_some())
    }

    /// Returns the closest holiday strictly before `date`.
    fn prev_holiday(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, -1, "a previous holiday", |d| self.is_holiday(d))
    }

    /// Returns the closest holiday strictly after `date`.
    fn next_holiday(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, 1, "a next holiday", |d| self.is_holiday(d))
    }

    /// Returns true when `date` is a Saturday or a Sunday.
    fn is_weekend_day(&self, date: &ZonedNanoDate) -> Result<bool, Error> {
        check_bounds(self, date)?;
        let weekday = arith::day_of_week(date)?;
        Ok(matches!(weekday, Weekday::Saturday | Weekday::Sunday))
    }

    fn prev_weekend_day(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, -1, "a previous weekend day", |d| {
            self.is_weekend_day(d)
        })
    }

    fn next_weekend_day(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, 1, "a next weekend day", |d| self.is_weekend_day(d))
    }

    /// Returns true when `date` is neither a holiday nor a weekend day.
    fn is_business_day(&self, date: &ZonedNanoDate) -> Result<bool, Error> {
        Ok(!(self.is_holiday(date)? || self.is_weekend_day(date)?))
    }

    fn prev_business_day(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, -1, "a previous business day", |d| {
            self.is_business_day(d)
        })
    }

    fn next_business_day(
        &self,
        date: &ZonedNanoDate,
    ) -> Result<ZonedNanoDate, Error> {
        scan(self, date, 1, "a next business day", |d| self.is_business_day(d))
    }

    /// Moves `date` by the given number of business days.
    ///
    /// The date steps one day at a time in the direction of `days`, and
    /// every business day it lands on counts toward `days`. So the result
    /// is always a business day, except when `days` is zero, in which case
    /// `date` is returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{
    ///     business::{BusinessCalendar, SimpleBusinessCalendar},
    ///     ZonedNanoDate,
    /// };
    ///
    /// let cal = SimpleBusinessCalendar::get("Europe/London")?;
    /// // Saturday, two days before a bank holiday.
    /// let date = ZonedNanoDate::parse("Europe/London", "2019.05.25")?;
    /// assert_eq!(cal.plus_business_days(&date, 1)?.to_string(), "2019.05.28");
    /// assert_eq!(cal.plus_business_days(&date, 0)?, date);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn plus_business_days(
        &self,
        date: &ZonedNanoDate,
        days: i64,
    ) -> Result<ZonedNanoDate, Error> {
        check_bounds(self, date)?;
        let step = days.signum();
        let mut remaining = days.unsigned_abs();
        let mut date = date.clone();
        let mut idle = 0;
        while remaining > 0 {
            date = arith::plus_days(&date, step)?;
            if self.is_business_day(&date)? {
                remaining -= 1;
                idle = 0;
            } else {
                idle += 1;
                if idle >= MAX_SCAN_DAYS {
                    return Err(E::ScanLimit {
                        operation: "a business day",
                        limit: MAX_SCAN_DAYS,
                    }
                    .into());
                }
            }
        }
        Ok(date)
    }

    fn minus_business_days(
        &self,
        date: &ZonedNanoDate,
        days: i64,
    ) -> Result<ZonedNanoDate, Error> {
        let days = days
            .checked_neg()
            .ok_or_else(|| arith::overflow("minus business days"))?;
        self.plus_business_days(date, days)
    }

    /// Moves `date` by every unit of `tenor`.
    ///
    /// Years, months, weeks and days are applied first, in that order, with
    /// ordinary calendar arithmetic. Business days are applied last, so only
    /// that final step needs the result of the earlier ones to fall inside
    /// of this calendar.
    ///
    /// # Example
    ///
    /// ```
    /// use nanotemporals::{
    ///     business::{BusinessCalendar, SimpleBusinessCalendar},
    ///     Tenor, ZonedNanoDate,
    /// };
    ///
    /// let cal = SimpleBusinessCalendar::get("Europe/London")?;
    /// let date = ZonedNanoDate::parse("Europe/London", "2019.04.26")?;
    /// let tenor: Tenor = "1m1b".parse()?;
    /// // One month lands on a Sunday before a bank holiday.
    /// assert_eq!(cal.plus_tenor(&date, &tenor)?.to_string(), "2019.05.28");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn plus_tenor(
        &self,
        date: &ZonedNanoDate,
        tenor: &Tenor,
    ) -> Result<ZonedNanoDate, Error> {
        let mut date = date.clone();
        for (unit, length) in tenor.units() {
            let length = i64::from(length);
            date = match unit {
                TenorUnit::Year => arith::plus_years(&date, length)?,
                TenorUnit::Month => arith::plus_months(&date, length)?,
                TenorUnit::Week => arith::plus_weeks(&date, length)?,
                TenorUnit::Day => arith::plus_days(&date, length)?,
                TenorUnit::BusinessDay => {
                    self.plus_business_days(&date, length)?
                }
            };
        }
        Ok(date)
    }
}

/// Returns an error when `date` falls outside of `calendar`'s table.
fn check_bounds<C: BusinessCalendar + ?Sized>(
    calendar: &C,
    date: &ZonedNanoDate,
) -> Result<(), Error> {
    let (first, last) = (calendar.first_day(), calendar.last_day());
    let nanos = date.nanoseconds();
    if first.nanoseconds() <= nanos && nanos <= last.nanoseconds() {
        return Ok(());
    }
    Err(E::OutsideTable {
        date: date.to_string().into(),
        first: first.to_string().into(),
        last: last.to_string().into(),
    }
    .into())
}

/// Steps from `date` one day at a time in the direction of `step` until
/// `found` returns true.
fn scan<C: BusinessCalendar + ?Sized>(
    calendar: &C,
    date: &ZonedNanoDate,
    step: i64,
    operation: &'static str,
    mut found: impl FnMut(&ZonedNanoDate) -> Result<bool, Error>,
) -> Result<ZonedNanoDate, Error> {
    check_bounds(calendar, date)?;
    let mut candidate = date.clone();
    for _ in 0..MAX_SCAN_DAYS {
        candidate = arith::plus_days(&candidate, step)?;
        let hit = found(&candidate).with_context(|| {
            Error::from_args(format_args!(
                "failed to find {operation} starting from {date}",
            ))
        })?;
        if hit {
            return Ok(candidate);
        }
    }
    Err(E::ScanLimit { operation, limit: MAX_SCAN_DAYS }.into())
}

/// A business calendar backed by an in-memory holiday table.
///
/// The table keeps its records in the order they were read. The first
/// record decides [`first_day`](BusinessCalendar::first_day) and the last
/// decides [`last_day`](BusinessCalendar::last_day), so records are
/// expected to be written in chronological order. A date listed twice
/// keeps the position of its first record, but takes the type and name of
/// its last.
#[derive(Clone, Debug)]
pub struct SimpleBusinessCalendar {
    time_zone: Arc<str>,
    holidays: Vec<Holiday>,
    by_date: HashMap<i64, usize>,
    first_day: ZonedNanoDate,
    last_day: ZonedNanoDate,
}

impl SimpleBusinessCalendar {
    /// Returns the shared calendar for the given time zone.
    ///
    /// The first request for a time zone reads its holidays with
    /// [`DirHolidaySource::from_env`]. Later requests return the same
    /// calendar. Loads are serialized, so concurrent first requests for a
    /// time zone only read its holidays once. A load that fails isn't
    /// remembered.
    ///
    /// # Errors
    ///
    /// This returns a configuration error when the time zone is unknown,
    /// or when its holidays are missing, unreadable or empty. A malformed
    /// holiday record is a parse error.
    pub fn get(time_zone: &str) -> Result<Arc<SimpleBusinessCalendar>, Error> {
        type Registry = Mutex<HashMap<Arc<str>, Arc<SimpleBusinessCalendar>>>;
        static REGISTRY: OnceLock<Registry> = OnceLock::new();

        let time_zone = arith::resolve(time_zone)?;
        let mut calendars = REGISTRY
            .get_or_init(Registry::default)
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        if let Some(calendar) = calendars.get(&time_zone) {
            return Ok(Arc::clone(calendar));
        }
        let source = DirHolidaySource::from_env()?;
        let calendar = Arc::new(SimpleBusinessCalendar::load(&time_zone, &source)?);
        calendars.insert(time_zone, Arc::clone(&calendar));
        Ok(calendar)
    }

    /// Builds a calendar from the holidays `source` has for `time_zone`.
    ///
    /// # Errors
    ///
    /// This returns a configuration error when the time zone is unknown,
    /// when `source` fails or when it has no holidays.
    pub fn load(
        time_zone: &str,
        source: &dyn HolidaySource,
    ) -> Result<SimpleBusinessCalendar, Error> {
        let time_zone = arith::resolve(time_zone)?;
        let records = source
            .holidays(&time_zone)
            .with_context(|| E::FailedLoad { time_zone: (&*time_zone).into() })?;
        let calendar = SimpleBusinessCalendar::from_holidays(time_zone, records)?;
        debug!(
            "loaded {} holidays for {} covering {} through {}",
            calendar.holidays.len(),
            calendar.time_zone,
            calendar.first_day,
            calendar.last_day,
        );
        Ok(calendar)
    }

    fn from_holidays(
        time_zone: Arc<str>,
        records: Vec<Holiday>,
    ) -> Result<SimpleBusinessCalendar, Error> {
        let mut holidays: Vec<Holiday> = Vec::with_capacity(records.len());
        let mut by_date = HashMap::with_capacity(records.len());
        for holiday in records {
            match by_date.get(&holiday.date.nanoseconds()) {
                Some(&index) => {
                    trace!("replacing holiday on {}", holiday.date);
                    holidays[index] = holiday;
                }
                None => {
                    by_date.insert(holiday.date.nanoseconds(), holidays.len());
                    holidays.push(holiday);
                }
            }
        }
        let (Some(first), Some(last)) = (holidays.first(), holidays.last())
        else {
            return Err(E::EmptyTable { time_zone: (&*time_zone).into() }.into());
        };
        let (first_day, last_day) = (first.date.clone(), last.date.clone());
        Ok(SimpleBusinessCalendar {
            time_zone,
            holidays,
            by_date,
            first_day,
            last_day,
        })
    }

    /// Returns every holiday in this calendar, in table order.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}

impl BusinessCalendar for SimpleBusinessCalendar {
    fn time_zone(&self) -> &str {
        &self.time_zone
    }

    fn first_day(&self) -> &ZonedNanoDate {
        &self.first_day
    }

    fn last_day(&self) -> &ZonedNanoDate {
        &self.last_day
    }

    fn holiday(&self, date: &ZonedNanoDate) -> Result<Option<&Holiday>, Error> {
        check_bounds(self, date)?;
        let holiday = self
            .by_date
            .get(&date.nanoseconds())
            .and_then(|&index| self.holidays.get(index));
        Ok(holiday)
    }
}
