use nanotemporals::{
    fmt::{NanoDateTimeFormat, Parsed, DEFAULT_DATETIME_PATTERN},
    NanoDate, NanoDateTime, NanoTime, ZonedNanoDate, ZonedNanoDateTime,
};

use crate::Result;

fn datetime() -> NanoDateTime {
    let date = NanoDate::builder().year(2019).month(5).day(21).build().unwrap();
    let time = NanoTime::builder()
        .hour(18)
        .minute(45)
        .second(7)
        .nanosecond(345_920_678)
        .build()
        .unwrap();
    NanoDateTime::from_date_and_time(&date, &time).unwrap()
}

#[test]
fn datetimes_dates_and_times() -> Result {
    let dt = datetime();
    let utc = |pattern| NanoDateTimeFormat::new("UTC", pattern, false);

    assert_eq!(utc(DEFAULT_DATETIME_PATTERN)?.format(&dt)?, "2019.05.21T18:45:07.345");
    assert_eq!(utc("yyyyMMdd'T'HH:mm:ss.SSS")?.format(&dt)?, "20190521T18:45:07.345");
    assert_eq!(utc("yyyyMMdd")?.format(&dt.date())?, "20190521");
    assert_eq!(utc("HH:mm:ss.CCCCCC")?.format(&dt.time())?, "18:45:07.345920");
    assert_eq!(
        utc("HH:mm:ss.CCCCCC.'CCCCCC'.NNNNNNNNN.'NNNNNNNNN'")?.format(&dt.time())?,
        "18:45:07.345920.CCCCCC.345920678.NNNNNNNNN",
    );
    Ok(())
}

#[test]
fn parse_back_at_millisecond_precision() -> Result {
    let utc = |pattern| NanoDateTimeFormat::new("UTC", pattern, false);

    let parsed = utc("yyyyMMdd'T'HH:mm:ss.SSS")?.parse("20190521T18:45:07.345")?;
    assert_eq!(parsed.to_datetime().to_string(), "2019.05.21T18:45:07.345000000");

    let parsed = utc("yyyyMMdd")?.parse("20190521")?;
    assert_eq!(parsed.to_datetime().to_string(), "2019.05.21T00:00:00.000000000");

    let parsed = utc("HH:mm:ss.SSS")?.parse("18:45:07.345")?;
    assert_eq!(parsed.to_datetime().to_string(), "1970.01.01T18:45:07.345000000");
    Ok(())
}

#[test]
fn zoned_round_trip() -> Result {
    let format = NanoDateTimeFormat::new(
        "Europe/London",
        "EEEE d MMMM yyyy HH:mm:ss.SSS zzzz (z, XXX)",
        true,
    )?;
    let zdt = datetime().to_zoned("Europe/London")?;
    let text = format.format(&zdt)?;
    assert_eq!(
        text,
        "Tuesday 21 May 2019 19:45:07.345 Europe/London (BST, +01:00)",
    );

    let format = NanoDateTimeFormat::new("Europe/London", "d MMM yyyy HH:mm:ss.SSS", true)?;
    let Parsed::Zoned(got) = format.parse("21 May 2019 19:45:07.345")? else {
        panic!("expected a zoned datetime");
    };
    assert_eq!(got.time_zone(), "Europe/London");
    assert_eq!(got.nanoseconds(), zdt.nanoseconds() - 920_678);
    Ok(())
}

#[test]
fn zoned_dates_show_their_own_day() -> Result {
    let date = ZonedNanoDate::parse("Pacific/Auckland", "2019.05.21")?;
    let format = NanoDateTimeFormat::new("America/Los_Angeles", "yyyy-MM-dd", false)?;
    assert_eq!(format.format(&date)?, "2019-05-21");

    let zdt = ZonedNanoDateTime::from_nanoseconds("Pacific/Auckland", date.nanoseconds())?;
    assert_eq!(format.format(&zdt)?, "2019-05-21");
    assert_eq!(format.format(&zdt.to_datetime())?, "2019-05-20");
    Ok(())
}

#[test]
fn parse_errors() -> Result {
    let format = NanoDateTimeFormat::new("UTC", "yyyy.MM.dd", false)?;
    let err = format.parse("2019.13.01").unwrap_err();
    assert!(err.is_range());
    let err = format.parse("2019.05.01 extra").unwrap_err();
    assert!(err.is_parse());

    let err = NanoDateTimeFormat::new("UTC", "yyyy 'unterminated", false).unwrap_err();
    assert!(err.is_parse());
    Ok(())
}
