use std::{collections::HashMap, sync::Arc};

use jiff::{civil, tz::TimeZone, Span, Timestamp, Zoned};

use crate::{
    engine::{CalendarEngine, CalendarField, CalendarFields, CivilFields, UTC},
    error::engine::Error as E,
    Error,
};

/// The maximum number of time zones a single engine keeps resolved.
const MAX_ZONES: usize = 250;

/// A [`CalendarEngine`] backed by the `jiff` crate.
///
/// Time zones are looked up in `jiff`'s time zone database and cached by
/// identifier, up to a fixed number of zones. When the cache is full it is
/// cleared before the next zone is added. The `UTC` zone never touches the
/// database.
///
/// # Example
///
/// ```
/// use nanotemporals::engine::{CalendarEngine, CalendarField, CivilFields, JiffEngine};
///
/// let mut engine = JiffEngine::new();
/// let jan31 = engine.to_millis("UTC", &CivilFields::date(2019, 1, 31))?;
/// let feb = engine.add("UTC", jan31, CalendarField::Month, 1)?;
/// let fields = engine.fields("UTC", feb)?;
/// assert_eq!((fields.year, fields.month, fields.day), (2019, 2, 28));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct JiffEngine {
    utc: Arc<str>,
    zones: HashMap<Arc<str>, TimeZone>,
}

impl JiffEngine {
    /// Creates a new engine with an empty time zone cache.
    pub fn new() -> JiffEngine {
        JiffEngine { utc: Arc::from(UTC), zones: HashMap::new() }
    }

    fn lookup(&mut self, name: &str) -> Result<(Arc<str>, TimeZone), Error> {
        if name == UTC {
            return Ok((Arc::clone(&self.utc), TimeZone::UTC));
        }
        if let Some((key, tz)) = self.zones.get_key_value(name) {
            return Ok((Arc::clone(key), tz.clone()));
        }
        let tz = TimeZone::get(name)
            .map_err(|err| Error::unknown_time_zone(name, err))?;
        if self.zones.len() >= MAX_ZONES {
            debug!(
                "calendar engine holds {MAX_ZONES} time zones, \
                 clearing them before adding {name:?}",
            );
            self.zones.clear();
        }
        trace!("calendar engine resolved time zone {name:?}");
        let key: Arc<str> = Arc::from(name);
        self.zones.insert(Arc::clone(&key), tz.clone());
        Ok((key, tz))
    }

    fn zoned(
        &mut self,
        operation: &'static str,
        time_zone: &str,
        millis: i64,
    ) -> Result<Zoned, Error> {
        let (_, tz) = self.lookup(time_zone)?;
        let timestamp = Timestamp::from_millisecond(millis)
            .map_err(|err| calendar(operation, time_zone, err))?;
        Ok(timestamp.to_zoned(tz))
    }
}

impl Default for JiffEngine {
    fn default() -> JiffEngine {
        JiffEngine::new()
    }
}

impl CalendarEngine for JiffEngine {
    fn resolve(&mut self, time_zone: &str) -> Result<Arc<str>, Error> {
        self.lookup(time_zone).map(|(name, _)| name)
    }

    fn fields(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<CalendarFields, Error> {
        let zdt = self.zoned("read calendar fields", time_zone, millis)?;
        Ok(CalendarFields {
            year: zdt.year(),
            month: zdt.month(),
            day: zdt.day(),
            weekday: zdt.weekday(),
            day_of_year: zdt.day_of_year(),
            hour: zdt.hour(),
            minute: zdt.minute(),
            second: zdt.second(),
            millisecond: zdt.millisecond(),
            offset_seconds: zdt.offset().seconds(),
        })
    }

    fn add(
        &mut self,
        time_zone: &str,
        millis: i64,
        field: CalendarField,
        amount: i64,
    ) -> Result<i64, Error> {
        const OPERATION: &str = "add to a calendar field";

        let zdt = self.zoned(OPERATION, time_zone, millis)?;
        let span = match field {
            CalendarField::Year => Span::new().try_years(amount),
            CalendarField::Month => Span::new().try_months(amount),
            CalendarField::Week => Span::new().try_weeks(amount),
            CalendarField::DayOfMonth => Span::new().try_days(amount),
            CalendarField::Hour => Span::new().try_hours(amount),
            CalendarField::Minute => Span::new().try_minutes(amount),
            CalendarField::Second => Span::new().try_seconds(amount),
            CalendarField::Millisecond => {
                Span::new().try_milliseconds(amount)
            }
        }
        .map_err(|err| calendar(OPERATION, time_zone, err))?;
        let sum = zdt
            .checked_add(span)
            .map_err(|err| calendar(OPERATION, time_zone, err))?;
        Ok(sum.timestamp().as_millisecond())
    }

    fn to_millis(
        &mut self,
        time_zone: &str,
        fields: &CivilFields,
    ) -> Result<i64, Error> {
        if fields.hour == 24
            && fields.minute == 0
            && fields.second == 0
            && fields.millisecond == 0
        {
            let midnight = CivilFields { hour: 0, ..*fields };
            let start = self.to_millis(time_zone, &midnight)?;
            return self.add(time_zone, start, CalendarField::DayOfMonth, 1);
        }
        let (_, tz) = self.lookup(time_zone)?;
        let dt = civil::DateTime::new(
            fields.year,
            fields.month,
            fields.day,
            fields.hour,
            fields.minute,
            fields.second,
            i32::from(fields.millisecond) * 1_000_000,
        )
        .map_err(|err| E::InvalidFields {
            fields: *fields,
            reason: err.to_string().into_boxed_str(),
        })?;
        let zdt = dt
            .to_zoned(tz)
            .map_err(|err| calendar("resolve a wall clock time", time_zone, err))?;
        Ok(zdt.timestamp().as_millisecond())
    }

    fn abbreviation(
        &mut self,
        time_zone: &str,
        millis: i64,
    ) -> Result<String, Error> {
        const OPERATION: &str = "find a time zone abbreviation";

        let zdt = self.zoned(OPERATION, time_zone, millis)?;
        jiff::fmt::strtime::format("%Z", &zdt)
            .map_err(|err| calendar(OPERATION, time_zone, err))
    }
}

#[cold]
#[inline(never)]
fn calendar(
    operation: &'static str,
    time_zone: &str,
    err: jiff::Error,
) -> Error {
    Error::from(E::Calendar {
        operation,
        time_zone: time_zone.into(),
        reason: err.to_string().into_boxed_str(),
    })
}

#[cfg(test)]
mod tests {
    use crate::engine::Weekday;

    use super::*;

    const HOUR: i64 = 3_600_000;

    #[test]
    fn utc_fields() {
        let mut engine = JiffEngine::new();
        // 2019-05-21T18:45:07.345Z
        let fields = engine.fields(UTC, 1_558_464_307_345).unwrap();
        assert_eq!(
            fields.civil(),
            CivilFields {
                year: 2019,
                month: 5,
                day: 21,
                hour: 18,
                minute: 45,
                second: 7,
                millisecond: 345,
            },
        );
        assert_eq!(fields.weekday, Weekday::Tuesday);
        assert_eq!(fields.day_of_year, 141);
        assert_eq!(fields.offset_seconds, 0);
        assert_eq!(
            engine.to_millis(UTC, &fields.civil()).unwrap(),
            1_558_464_307_345,
        );
    }

    #[test]
    fn days_follow_the_wall_clock() {
        let _ = env_logger::try_init();

        let mut engine = JiffEngine::new();
        let tz = "Europe/London";
        let noon = CivilFields::date(2019, 3, 30).at_noon();
        let start = engine.to_millis(tz, &noon).unwrap();
        let next = engine.add(tz, start, CalendarField::DayOfMonth, 1).unwrap();
        // The clocks went forward overnight.
        assert_eq!(next - start, 23 * HOUR);
        assert_eq!(engine.fields(tz, next).unwrap().hour, 12);
        assert_eq!(engine.fields(tz, next).unwrap().offset_seconds, 3600);

        let later = engine.add(tz, start, CalendarField::Hour, 24).unwrap();
        assert_eq!(later - start, 24 * HOUR);
        assert_eq!(engine.fields(tz, later).unwrap().hour, 13);

        assert_eq!(engine.abbreviation(tz, start).unwrap(), "GMT");
        assert_eq!(engine.abbreviation(tz, next).unwrap(), "BST");
    }

    #[test]
    fn end_of_day_midnight() {
        let mut engine = JiffEngine::new();
        let end = CivilFields { hour: 24, ..CivilFields::date(2019, 12, 31) };
        let millis = engine.to_millis(UTC, &end).unwrap();
        let fields = engine.fields(UTC, millis).unwrap();
        assert_eq!((fields.year, fields.month, fields.day), (2020, 1, 1));
        assert_eq!(fields.hour, 0);
    }

    #[test]
    fn errors() {
        let mut engine = JiffEngine::new();
        let err = engine.resolve("Mars/Olympus_Mons").unwrap_err();
        assert!(err.is_configuration());

        let err = engine
            .to_millis(UTC, &CivilFields::date(2019, 2, 29))
            .unwrap_err();
        assert!(err.is_range());
        assert!(err.to_string().starts_with(
            "invalid calendar fields 2019-02-29T00:00:00.000: "
        ));

        let err = engine
            .add(UTC, 0, CalendarField::Year, 1_000_000)
            .unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn resolve_shares_identifiers() {
        let mut engine = JiffEngine::new();
        let a = engine.resolve("America/New_York").unwrap();
        let b = engine.resolve("America/New_York").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(&*engine.resolve(UTC).unwrap(), "UTC");
    }
}
