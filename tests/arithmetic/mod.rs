use std::time::{Duration, SystemTime};

use nanotemporals::{
    arith::{self, convert},
    civil::NanoTimeBuilder,
    NanoDate, NanoDateTime, NanoTime, NanoTimeDelta, TemporalUnit,
    ZonedNanoDateTime,
};

use crate::Result;

type Build = fn(NanoTimeBuilder) -> NanoTimeBuilder;

fn datetime((year, month, day): (i16, i8, i8), build: Build) -> NanoDateTime {
    let date =
        NanoDate::builder().year(year).month(month).day(day).build().unwrap();
    let time = build(NanoTime::builder()).build().unwrap();
    NanoDateTime::from_date_and_time(&date, &time).unwrap()
}

fn time(build: Build) -> NanoTime {
    build(NanoTime::builder()).build().unwrap()
}

#[test]
fn composed_datetime_fields() -> Result {
    let dt = datetime((2018, 1, 31), |b| {
        b.hour(16).minute(54).second(3).millisecond(357)
    });

    let date = dt.date();
    assert_eq!(arith::year(&date)?, 2018);
    assert_eq!(arith::month(&date)?, 1);
    assert_eq!(arith::day_of_month(&date)?, 31);

    let time = dt.time();
    assert_eq!(
        (time.hour(), time.minute(), time.second(), time.millisecond()),
        (16, 54, 3, 357),
    );
    assert_eq!(dt.epoch_milliseconds(), 1_517_417_643_357);
    assert_eq!(dt.nanoseconds(), 1_517_417_643_357_000_000);

    let first = datetime((2018, 1, 1), |b| {
        b.hour(16).minute(54).second(3).millisecond(357)
    });
    assert!(!dt.strictly_before(&first));
    assert!(dt.strictly_after(&first));
    assert_eq!(dt, NanoDateTime::parse("2018.01.31T16:54:03.357")?);
    Ok(())
}

#[test]
fn fixed_units_on_datetimes() -> Result {
    let dt = datetime((2018, 1, 31), |b| {
        b.hour(16).minute(54).second(3).millisecond(357)
    });
    let at = |build: Build| datetime((2018, 1, 31), build);

    assert_eq!(
        arith::minus_seconds(&dt, 357)?,
        at(|b| b.hour(16).minute(48).second(6).millisecond(357)),
    );
    assert_eq!(
        arith::minus_milliseconds(&dt, 357)?,
        at(|b| b.hour(16).minute(54).second(3)),
    );
    assert_eq!(
        arith::minus_microseconds(&dt, 357)?,
        at(|b| b.hour(16).minute(54).second(3).microsecond(356_643)),
    );
    assert_eq!(
        arith::minus_nanoseconds(&dt, 357)?,
        at(|b| b.hour(16).minute(54).second(3).nanosecond(356_999_643)),
    );
    assert_eq!(
        arith::plus_seconds(&dt, 357)?,
        at(|b| b.hour(17).millisecond(357)),
    );
    assert_eq!(
        arith::plus_microseconds(&dt, 357)?,
        at(|b| b.hour(16).minute(54).second(3).microsecond(357_357)),
    );
    assert_eq!(
        arith::plus_nanoseconds(&dt, 357)?,
        at(|b| b.hour(16).minute(54).second(3).nanosecond(357_000_357)),
    );
    assert_eq!(
        arith::plus_unit(&dt, TemporalUnit::Day, 1)?,
        datetime((2018, 2, 1), |b| {
            b.hour(16).minute(54).second(3).millisecond(357)
        }),
    );
    Ok(())
}

#[test]
fn fixed_units_on_times() -> Result {
    let t = time;
    let time = t(|b| b.hour(21).minute(32).second(49).millisecond(195));

    assert_eq!(
        arith::minus_seconds(&time, 357)?,
        t(|b| b.hour(21).minute(26).second(52).millisecond(195)),
    );
    assert_eq!(
        arith::plus_milliseconds(&time, 357)?,
        t(|b| b.hour(21).minute(32).second(49).millisecond(552)),
    );
    assert_eq!(
        arith::minus_microseconds(&time, 357_753)?,
        t(|b| b.hour(21).minute(32).second(48).microsecond(837_247)),
    );
    assert_eq!(
        arith::plus_nanoseconds(&time, 357_753_357)?,
        t(|b| b.hour(21).minute(32).second(49).nanosecond(552_753_357)),
    );
    Ok(())
}

/// Calendar arithmetic keeps the wall clock across a DST transition, while
/// fixed arithmetic keeps the elapsed time.
#[test]
fn calendar_days_across_dst() -> Result {
    let _ = env_logger::try_init();

    let zdt = ZonedNanoDateTime::parse("America/New_York", "2024.03.09T12:00:00.000")?;
    let zdt = arith::plus_nanoseconds(&zdt, 1)?;

    let next = arith::plus_days(&zdt, 1)?;
    assert_eq!(next.to_string(), "2024.03.10T12:00:00.000000001");
    assert_eq!(arith::difference(&zdt, &next)?.to_whole_hours(), 23);

    let fixed = arith::plus_unit(&zdt, TemporalUnit::Day, 1)?;
    assert_eq!(fixed.to_string(), "2024.03.10T13:00:00.000000001");

    let delta: NanoTimeDelta = "1d".parse()?;
    assert_eq!(arith::plus_duration(&zdt, delta)?, fixed);
    Ok(())
}

#[test]
fn system_time_round_trip() -> Result {
    let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_558_396_800_000);
    let dt = convert::from_system_time(time)?;
    assert_eq!(dt.to_string(), "2019.05.21T00:00:00.000000000");
    assert_eq!(convert::to_system_time(&dt)?, time);

    let london = ZonedNanoDateTime::parse("Europe/London", "2019.05.21T00:00:00.000")?;
    assert_eq!(london.to_datetime().to_string(), "2019.05.20T23:00:00.000000000");
    Ok(())
}

#[test]
fn overflow_is_a_range_error() {
    let err = arith::plus_nanoseconds(&NanoDateTime::max(), 1).unwrap_err();
    assert!(err.is_range());
    let err = arith::minus_nanoseconds(&NanoDateTime::min(), 1).unwrap_err();
    assert!(err.is_range());
}
