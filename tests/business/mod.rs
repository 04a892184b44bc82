use std::path::PathBuf;

use nanotemporals::{
    business::{
        BusinessCalendar, DirHolidaySource, HolidaySource, HolidayType,
        SimpleBusinessCalendar,
    },
    Tenor, ZonedNanoDate,
};

use crate::Result;

const LONDON: &str = "Europe/London";

fn date(text: &str) -> ZonedNanoDate {
    ZonedNanoDate::parse(LONDON, text).unwrap()
}

#[test]
fn bundled_london_calendar() -> Result {
    let _ = env_logger::try_init();

    let cal = SimpleBusinessCalendar::get(LONDON)?;
    let d = date("2019.05.31");
    assert_eq!(cal.prev_business_day(&d)?, date("2019.05.30"));
    assert_eq!(cal.next_business_day(&d)?, date("2019.06.03"));
    assert_eq!(cal.prev_weekend_day(&d)?, date("2019.05.26"));
    assert_eq!(cal.next_weekend_day(&d)?, date("2019.06.01"));
    assert_eq!(cal.prev_holiday(&d)?, date("2019.05.27"));
    assert_eq!(cal.next_holiday(&d)?, date("2019.08.26"));

    let holiday = cal.holiday(&date("2022.09.19"))?.unwrap();
    assert_eq!(holiday.kind(), HolidayType::BankHoliday);
    assert_eq!(holiday.name(), "State Funeral of Queen Elizabeth II");
    Ok(())
}

#[test]
fn easter_and_christmas() -> Result {
    let cal = SimpleBusinessCalendar::get(LONDON)?;

    // Maundy Thursday, before a four day weekend.
    let thursday = date("2024.03.28");
    assert_eq!(cal.plus_business_days(&thursday, 1)?, date("2024.04.02"));
    assert_eq!(cal.minus_business_days(&date("2024.04.02"), 1)?, thursday);

    let eve = date("2019.12.24");
    assert_eq!(cal.plus_business_days(&eve, 1)?, date("2019.12.27"));
    assert_eq!(cal.plus_tenor(&eve, &Tenor::ONE_WEEK)?, date("2019.12.31"));
    assert_eq!(
        cal.plus_tenor(&eve, &"1w1b".parse::<Tenor>()?)?,
        date("2020.01.02"),
    );
    Ok(())
}

#[test]
fn outside_the_table() -> Result {
    let cal = SimpleBusinessCalendar::get(LONDON)?;
    let first = cal.first_day().clone();
    let last = cal.last_day().clone();
    assert_eq!(first, date("2015.01.01"));
    assert_eq!(last, date("2025.12.26"));

    assert!(cal.is_business_day(&date("2014.12.31")).unwrap_err().is_range());
    assert!(cal.next_holiday(&last).unwrap_err().is_range());
    assert!(cal.prev_business_day(&first).unwrap_err().is_range());
    Ok(())
}

#[test]
fn unknown_time_zones_and_missing_tables() {
    let err = SimpleBusinessCalendar::get("Nowhere/Special").unwrap_err();
    assert!(err.is_configuration());

    let err = SimpleBusinessCalendar::get("Asia/Tokyo").unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn custom_directory() -> anyhow::Result<()> {
    let dir = std::env::temp_dir()
        .join(format!("nanotemporals-business-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    std::fs::write(
        dir.join("America-New_York.csv"),
        "# A short table.\n\
         2019.01.01 | BANK_HOLIDAY | New Year's Day\n\
         2019.07.04 | BANK_HOLIDAY | Independence Day\n\
         2019.07.05 | LOCAL_HOLIDAY | Office closed\n\
         2019.09.02 | BANK_HOLIDAY | Labor Day\n",
    )?;

    let source = DirHolidaySource::from_dir(&dir)?;
    assert_eq!(
        source.path("America/New_York"),
        PathBuf::from(&dir).join("America-New_York.csv"),
    );
    assert_eq!(source.holidays("America/New_York")?.len(), 4);

    let cal = SimpleBusinessCalendar::load("America/New_York", &source)?;
    let d = ZonedNanoDate::parse("America/New_York", "2019.07.03")?;
    assert_eq!(cal.next_business_day(&d)?.to_string(), "2019.07.08");
    let holiday = cal.holiday(&cal.next_holiday(&d)?)?;
    assert_eq!(holiday.map(|h| h.name()), Some("Independence Day"));

    let before = ZonedNanoDate::parse("America/New_York", "2018.12.31")?;
    assert!(cal.next_business_day(&before).unwrap_err().is_range());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
