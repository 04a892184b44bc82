/*!
Time zone independent dates, times and datetimes.

A [`NanoTime`] is a time of day, a [`NanoDate`] is a calendar date and a
[`NanoDateTime`] is an instant read in UTC. Each is an immutable,
reference counted value that is interned: building a value equal to one
that was built recently returns the very same instance.

```
use nanotemporals::{NanoDate, NanoDateTime, NanoTime};

let date = NanoDate::builder().year(2019).month(5).day(21).build()?;
let time = NanoTime::builder().hour(18).minute(45).second(7).build()?;
let dt = NanoDateTime::from_date_and_time(&date, &time)?;
assert_eq!(dt.to_string(), "2019.05.21T18:45:07.000000000");
assert!(dt.date().ptr_eq(&date));

# Ok::<(), Box<dyn std::error::Error>>(())
```

For values that carry a time zone, see the [`zoned`](crate::zoned) module.
*/

use std::sync::OnceLock;

use crate::{
    arith,
    engine::CalendarFields,
    util::{
        b,
        civil::{Hms, Ymd},
    },
    Error,
};

pub use self::{
    date::{NanoDate, NanoDateBuilder},
    datetime::NanoDateTime,
    time::{NanoTime, NanoTimeBuilder},
};

mod date;
mod datetime;
mod time;

/// Defines the comparison predicates shared by every point type.
macro_rules! comparisons {
    ($ty:ident) => {
        impl $ty {
            /// Returns true when this value is earlier than `other`.
            ///
            /// Only nanosecond counts are compared. Time zones are ignored.
            #[inline]
            pub fn strictly_before(&self, other: &$ty) -> bool {
                self.nanoseconds() < other.nanoseconds()
            }

            /// Returns true when this value is later than `other`.
            ///
            /// Only nanosecond counts are compared. Time zones are ignored.
            #[inline]
            pub fn strictly_after(&self, other: &$ty) -> bool {
                self.nanoseconds() > other.nanoseconds()
            }

            #[inline]
            pub fn before_or_equal(&self, other: &$ty) -> bool {
                self.nanoseconds() <= other.nanoseconds()
            }

            #[inline]
            pub fn after_or_equal(&self, other: &$ty) -> bool {
                self.nanoseconds() >= other.nanoseconds()
            }
        }
    };
}

pub(crate) use comparisons;

/// The shared representation of an interned, time zone free value.
#[derive(Debug)]
pub(crate) struct Interned {
    pub(crate) nanoseconds: i64,
    pub(crate) rendered: OnceLock<String>,
}

impl Interned {
    pub(crate) fn new(nanoseconds: i64) -> Interned {
        Interned { nanoseconds, rendered: OnceLock::new() }
    }
}

/// Adds an exact number of nanoseconds to an epoch nanosecond count.
///
/// The sum is not range checked beyond fitting in 64 bits. Callers rebuild
/// a value from it, which checks the bounds of the value's type.
pub(crate) fn shift_epoch(nanoseconds: i64, delta: i128) -> Result<i64, Error> {
    let sum = i128::from(nanoseconds) + delta;
    i64::try_from(sum).map_err(|_| arith::overflow("fixed unit arithmetic"))
}

pub(crate) fn render_date(ymd: Ymd) -> String {
    format!("{:04}.{:02}.{:02}", ymd.year, ymd.month, ymd.day)
}

pub(crate) fn render_time(hms: Hms) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:09}",
        hms.hour, hms.minute, hms.second, hms.subsec_nanosecond,
    )
}

pub(crate) fn render_datetime(ymd: Ymd, hms: Hms) -> String {
    format!("{}T{}", render_date(ymd), render_time(hms))
}

/// Renders the wall clock fields read by a calendar engine, with the
/// sub-millisecond digits taken from the instant they were read at.
pub(crate) fn render_fields(fields: &CalendarFields, nanoseconds: i64) -> String {
    let (_, remainder) = b::split_millis(nanoseconds);
    let ymd = Ymd { year: fields.year, month: fields.month, day: fields.day };
    let hms = Hms {
        hour: fields.hour,
        minute: fields.minute,
        second: fields.second,
        // OK because it's less than one billion.
        subsec_nanosecond: (i64::from(fields.millisecond) * b::NANOS_PER_MILLI
            + remainder) as i32,
    };
    render_datetime(ymd, hms)
}
