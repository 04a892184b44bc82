/*!
Nanosecond precision dates, times and durations.

This crate provides immutable temporal values that count nanoseconds,
calendar aware arithmetic on them, a pattern based formatter and parser,
and business day calendars built from holiday tables.

Every point in time is a signed 64-bit number of nanoseconds since the
Unix epoch, `1970-01-01T00:00:00Z`. So the supported range is from
`1900-01-01T00:00:00Z` up to `2262-04-11T23:47:16.854775807Z`. Calendar
computations (what day of the week it is, how long a month is, when
daylight saving time begins) are delegated to a
[`CalendarEngine`](engine::CalendarEngine) working in milliseconds. The
default engine is backed by [`jiff`]. The
[`arith`] module keeps the sub-millisecond part of a value out of the
engine's hands, so no precision is ever lost.

# Overview

The value types are:

* [`NanoTime`], a time of day.
* [`NanoDate`], a calendar date.
* [`NanoDateTime`], an instant, read in UTC.
* [`ZonedNanoDate`] and [`ZonedNanoDateTime`], which attach an IANA time
  zone identifier to a date or an instant.
* [`NanoTimeDelta`], a signed exact duration.
* [`Tenor`], a calendar relative period such as `3m` or `2b`.

Values are interned in bounded caches (see [`cache`]), so building the same
value twice usually returns the same allocation.

# Example

```
use nanotemporals::{arith, NanoDateTime, NanoTimeDelta};

let dt = NanoDateTime::parse("2019.05.21T18:45:07.345")?;
let later = arith::plus_nanoseconds(&dt, 920_678)?;
assert_eq!(later.to_string(), "2019.05.21T18:45:07.345920678");

let next_month = arith::plus_months(&later, 1)?;
assert_eq!(next_month.to_string(), "2019.06.21T18:45:07.345920678");

let delta: NanoTimeDelta = arith::difference(&dt, &next_month)?;
assert_eq!(delta.to_whole_days(), 31);
assert_eq!(delta, "31d920678ns".parse::<NanoTimeDelta>()?);

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Crate features

* **logging** -
  Emits messages through the [`log`](https://docs.rs/log) crate. This
  covers loading holiday tables, evicting cache entries and resolving time
  zones.
* **serde** -
  Provides `Serialize` and `Deserialize` impls for the value types. See
  the [`fmt`] module for the representations used.
* **tzdb-bundle-always** (enabled by default) -
  Embeds a copy of the IANA time zone database through `jiff`.
*/

#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

pub use crate::{
    civil::{NanoDate, NanoDateTime, NanoTime},
    delta::{NanoTimeDelta, NanoTimeDeltaBuilder},
    error::Error,
    tenor::{Tenor, TenorBuilder, TenorUnit},
    unit::TemporalUnit,
    zoned::{ZonedNanoDate, ZonedNanoDateTime},
};

#[macro_use]
mod logging;

pub mod arith;
pub mod business;
pub mod cache;
pub mod civil;
mod delta;
pub mod engine;
mod error;
pub mod fmt;
pub mod rule;
mod tenor;
mod unit;
mod util;
pub mod zoned;
