use std::path::{Path, PathBuf};

use crate::{
    business::{Holiday, HolidayType},
    error::{business::Error as E, ErrorContext},
    fmt::DEFAULT_DATE_PATTERN,
    zoned::ZonedNanoDate,
    Error,
};

/// The environment variable naming the directory [`DirHolidaySource`]
/// reads from.
pub const CALENDAR_DIR_ENV: &str = "NANOTEMPORALS_CALENDAR_DIR";

/// The holiday tables shipped with this crate.
const BUNDLED_DIR: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/business-calendar");

/// A provider of holiday tables, keyed by time zone.
pub trait HolidaySource: core::fmt::Debug {
    /// Returns the holidays observed in `time_zone`, in table order.
    ///
    /// An empty table is not an error here. It's rejected when the table
    /// is turned into a calendar.
    fn holidays(&self, time_zone: &str) -> Result<Vec<Holiday>, Error>;
}

/// A holiday source reading one file per time zone from a directory.
///
/// The file for `Europe/London` is `Europe-London.csv`. Its records are
/// read with [`parse_holidays`].
#[derive(Clone, Debug)]
pub struct DirHolidaySource {
    dir: PathBuf,
}

impl DirHolidaySource {
    /// Uses the directory named by `NANOTEMPORALS_CALENDAR_DIR`, if it's set
    /// and usable, or else the holiday tables bundled with this crate.
    pub fn from_env() -> Result<DirHolidaySource, Error> {
        if let Some(dir) = std::env::var_os(CALENDAR_DIR_ENV) {
            let dir = PathBuf::from(dir);
            debug!(
                "opening holiday tables at {CALENDAR_DIR_ENV}={}",
                dir.display(),
            );
            match DirHolidaySource::from_dir(&dir) {
                Ok(source) => return Ok(source),
                Err(_err) => {
                    warn!(
                        "failed opening {CALENDAR_DIR_ENV}={}: {_err}",
                        dir.display(),
                    );
                }
            }
        }
        DirHolidaySource::from_dir(BUNDLED_DIR)
            .context(E::NoSourceDirectory { var: CALENDAR_DIR_ENV })
    }

    /// Uses the given directory.
    ///
    /// This returns an error when `dir` isn't a directory.
    pub fn from_dir(
        dir: impl Into<PathBuf>,
    ) -> Result<DirHolidaySource, Error> {
        let dir = dir.into();
        let metadata =
            std::fs::metadata(&dir).map_err(|err| Error::io(err).path(&dir))?;
        if !metadata.is_dir() {
            let err = std::io::Error::new(
                std::io::ErrorKind::Other,
                "not a directory",
            );
            return Err(Error::io(err).path(dir));
        }
        Ok(DirHolidaySource { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the table for `time_zone`.
    pub fn path(&self, time_zone: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", time_zone.replace('/', "-")))
    }
}

impl HolidaySource for DirHolidaySource {
    fn holidays(&self, time_zone: &str) -> Result<Vec<Holiday>, Error> {
        let path = self.path(time_zone);
        trace!("reading holidays for {time_zone} from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .map_err(|err| Error::io(err).path(&path))?;
        parse_holidays(time_zone, &text).map_err(|err| err.path(&path))
    }
}

/// Parses a holiday table.
///
/// Each line holds one record of three fields separated by `|`: a date
/// written as `yyyy.MM.dd`, a [`HolidayType`] written as `LOCAL_HOLIDAY` or
/// `BANK_HOLIDAY` and a name. Whitespace around each field is ignored.
/// Blank lines, and lines starting with `#`, are skipped.
///
/// # Errors
///
/// This returns a parse error naming the line of the first malformed
/// record, and a configuration error when `time_zone` is unknown.
///
/// # Example
///
/// ```
/// use nanotemporals::business::{parse_holidays, HolidayType};
///
/// let holidays = parse_holidays(
///     "Europe/London",
///     "# England and Wales\n2019.12.25 | BANK_HOLIDAY | Christmas Day\n",
/// )?;
/// assert_eq!(holidays.len(), 1);
/// assert_eq!(holidays[0].date().to_string(), "2019.12.25");
/// assert_eq!(holidays[0].kind(), HolidayType::BankHoliday);
/// assert_eq!(holidays[0].name(), "Christmas Day");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_holidays(
    time_zone: &str,
    text: &str,
) -> Result<Vec<Holiday>, Error> {
    let mut holidays = vec![];
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        holidays.push(parse_record(time_zone, index + 1, trimmed)?);
    }
    Ok(holidays)
}

fn parse_record(
    time_zone: &str,
    line: usize,
    text: &str,
) -> Result<Holiday, Error> {
    let malformed = |reason| E::MalformedRecord { line, reason, text: text.into() };

    let mut fields = text.split('|').map(str::trim);
    let (Some(date), Some(kind), Some(name), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected three fields separated by '|'").into());
    };
    let date =
        ZonedNanoDate::parse_with_pattern(time_zone, DEFAULT_DATE_PATTERN, date)
            .with_context(|| malformed("invalid date"))?;
    let Some(kind) = HolidayType::from_name(kind) else {
        return Err(malformed("unknown holiday type").into());
    };
    if name.is_empty() {
        return Err(malformed("empty holiday name").into());
    }
    Ok(Holiday::new(date, kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records() {
        let holidays = parse_holidays(
            "Europe/London",
            "\n  # comment\n\
             2019.05.27|BANK_HOLIDAY|Spring bank holiday\n\
             \t2019.06.01 |  LOCAL_HOLIDAY   | Fete  \n",
        )
        .unwrap();
        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[0].date().to_string(), "2019.05.27");
        assert_eq!(holidays[1].kind(), HolidayType::LocalHoliday);
        assert_eq!(holidays[1].name(), "Fete");
        assert_eq!(holidays[1].date().time_zone(), "Europe/London");
    }

    #[test]
    fn malformed_records() {
        let parse = |text| parse_holidays("Europe/London", text).unwrap_err();

        let err = parse("2019.05.27 | BANK_HOLIDAY\n");
        assert!(err.is_parse());
        insta::assert_snapshot!(
            err,
            @r#"malformed holiday record on line 1 (expected three fields separated by '|'): "2019.05.27 | BANK_HOLIDAY""#,
        );
        insta::assert_snapshot!(
            parse("# header\n2019.05.27 | HOLIDAY | x"),
            @r#"malformed holiday record on line 2 (unknown holiday type): "2019.05.27 | HOLIDAY | x""#,
        );
        insta::assert_snapshot!(
            parse("2019.05.27 | BANK_HOLIDAY | "),
            @r#"malformed holiday record on line 1 (empty holiday name): "2019.05.27 | BANK_HOLIDAY |""#,
        );
        let err = parse("2019-05-27 | BANK_HOLIDAY | x");
        assert!(err.is_parse());
        assert!(err.to_string().starts_with("malformed holiday record on line 1 (invalid date)"));
        assert!(parse("a | b | c | d").is_parse());
    }

    #[test]
    fn directories() {
        let source = DirHolidaySource::from_dir(BUNDLED_DIR).unwrap();
        assert_eq!(
            source.path("Europe/London"),
            Path::new(BUNDLED_DIR).join("Europe-London.csv"),
        );
        let holidays = source.holidays("Europe/London").unwrap();
        assert!(holidays.iter().any(|h| h.date().to_string() == "2019.08.26"));

        let err = source.holidays("Asia/Tokyo").unwrap_err();
        assert!(err.is_configuration());

        let err =
            DirHolidaySource::from_dir(source.path("Europe/London")).unwrap_err();
        assert!(err.is_configuration());
        let err = DirHolidaySource::from_dir("/nowhere/at/all").unwrap_err();
        assert!(err.is_configuration());
    }
}
