/*!
Dates and datetimes that carry a time zone identifier.

A zoned value is a nanosecond count plus an IANA time zone identifier, like
`Europe/London`. The count is always relative to the Unix epoch. The time
zone decides how calendar fields are read and how arithmetic on calendar
fields behaves, and it appears in the `Debug` output:

```
use nanotemporals::ZonedNanoDateTime;

let zdt = ZonedNanoDateTime::parse("Europe/London", "2019.05.21T19:45:07.345")?;
assert_eq!(zdt.to_string(), "2019.05.21T19:45:07.345000000");
assert_eq!(zdt.to_datetime().to_string(), "2019.05.21T18:45:07.345000000");
assert_eq!(
    format!("{zdt:?}"),
    "ZonedNanoDateTime(2019.05.21T19:45:07.345000000, Europe/London)",
);

# Ok::<(), Box<dyn std::error::Error>>(())
```

Unlike the time zone free types, two zoned values are equal only when both
their counts and their time zones are equal. They are ordered by count
first and by identifier second.

Identifiers are validated when a value is built. An unknown identifier is a
configuration error.
*/

use std::sync::{Arc, OnceLock};

pub use self::{
    date::{ZonedNanoDate, ZonedNanoDateBuilder},
    datetime::ZonedNanoDateTime,
};

mod date;
mod datetime;

/// The shared representation of an interned, zoned value.
#[derive(Debug)]
pub(crate) struct ZonedInterned {
    pub(crate) time_zone: Arc<str>,
    pub(crate) nanoseconds: i64,
    pub(crate) rendered: OnceLock<String>,
}

impl ZonedInterned {
    pub(crate) fn new(time_zone: Arc<str>, nanoseconds: i64) -> ZonedInterned {
        ZonedInterned { time_zone, nanoseconds, rendered: OnceLock::new() }
    }

    fn key(&self) -> (i64, &str) {
        (self.nanoseconds, &self.time_zone)
    }
}

impl Eq for ZonedInterned {}

impl PartialEq for ZonedInterned {
    fn eq(&self, other: &ZonedInterned) -> bool {
        self.key() == other.key()
    }
}

impl Ord for ZonedInterned {
    fn cmp(&self, other: &ZonedInterned) -> core::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ZonedInterned {
    fn partial_cmp(
        &self,
        other: &ZonedInterned,
    ) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::hash::Hash for ZonedInterned {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
