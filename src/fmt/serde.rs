/*!
`Serialize` and `Deserialize` for this crate's public types.

The representations are:

* [`NanoTimeDelta`], [`Tenor`] and [`TemporalUnit`] use their text form,
  like `"1500ns"`, `"1y6m"` and `"hour"`.
* [`NanoTime`], [`NanoDate`] and [`NanoDateTime`] use their nanosecond
  count as an integer.
* [`ZonedNanoDate`] and [`ZonedNanoDateTime`] use a struct with a
  `time_zone` and a `nanoseconds` field.

# Example

```
use nanotemporals::{NanoDateTime, ZonedNanoDateTime};

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct Tick {
    at: NanoDateTime,
    local: ZonedNanoDateTime,
}

let at = NanoDateTime::from_nanoseconds(1_558_464_307_345_920_678)?;
let local = at.to_zoned("Europe/London")?;
let json = serde_json::to_string(&Tick { at, local })?;
assert_eq!(
    json,
    r#"{"at":1558464307345920678,"local":{"time_zone":"Europe/London","nanoseconds":1558464307345920678}}"#,
);

let tick: Tick = serde_json::from_str(&json)?;
assert_eq!(tick.local.to_string(), "2019.05.21T19:45:07.345920678");

# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

use serde::{de, ser::SerializeStruct};

use crate::{
    civil::{NanoDate, NanoDateTime, NanoTime},
    delta::NanoTimeDelta,
    tenor::Tenor,
    unit::TemporalUnit,
    zoned::{ZonedNanoDate, ZonedNanoDateTime},
    Error,
};

macro_rules! text {
    ($ty:ty, $expecting:literal) => {
        impl serde::Serialize for $ty {
            #[inline]
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            #[inline]
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<$ty, D::Error> {
                struct Visitor;

                impl<'de> de::Visitor<'de> for Visitor {
                    type Value = $ty;

                    fn expecting(
                        &self,
                        f: &mut core::fmt::Formatter,
                    ) -> core::fmt::Result {
                        f.write_str($expecting)
                    }

                    #[inline]
                    fn visit_str<E: de::Error>(
                        self,
                        value: &str,
                    ) -> Result<$ty, E> {
                        value.parse().map_err(de::Error::custom)
                    }
                }

                deserializer.deserialize_str(Visitor)
            }
        }
    };
}

text!(NanoTimeDelta, "a duration string like 1500ns or 3d12h");
text!(Tenor, "a tenor string like 1y6m");
text!(TemporalUnit, "a temporal unit name like hour or ms");

macro_rules! nanoseconds {
    ($ty:ident, $expecting:literal) => {
        impl serde::Serialize for $ty {
            #[inline]
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.nanoseconds())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            #[inline]
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<$ty, D::Error> {
                struct Visitor;

                impl<'de> de::Visitor<'de> for Visitor {
                    type Value = $ty;

                    fn expecting(
                        &self,
                        f: &mut core::fmt::Formatter,
                    ) -> core::fmt::Result {
                        f.write_str($expecting)
                    }

                    #[inline]
                    fn visit_i64<E: de::Error>(
                        self,
                        v: i64,
                    ) -> Result<$ty, E> {
                        $ty::from_nanoseconds(v).map_err(de::Error::custom)
                    }

                    #[inline]
                    fn visit_u64<E: de::Error>(
                        self,
                        v: u64,
                    ) -> Result<$ty, E> {
                        let v = i64::try_from(v).map_err(|_| {
                            de::Error::invalid_value(
                                de::Unexpected::Unsigned(v),
                                &self,
                            )
                        })?;
                        self.visit_i64(v)
                    }
                }

                deserializer.deserialize_i64(Visitor)
            }
        }
    };
}

nanoseconds!(NanoTime, "an integer number of nanoseconds since midnight");
nanoseconds!(NanoDate, "an integer number of nanoseconds since the Unix epoch");
nanoseconds!(
    NanoDateTime,
    "an integer number of nanoseconds since the Unix epoch"
);

const ZONED_FIELDS: &[&str] = &["time_zone", "nanoseconds"];

/// Builds either zoned type from its two fields.
struct ZonedVisitor<T> {
    name: &'static str,
    build: fn(&str, i64) -> Result<T, Error>,
}

impl<'de, T> de::Visitor<'de> for ZonedVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "a {} with a time_zone and nanoseconds", self.name)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> Result<T, A::Error> {
        let time_zone: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let nanoseconds: i64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        (self.build)(&time_zone, nanoseconds).map_err(de::Error::custom)
    }

    fn visit_map<A: de::MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<T, A::Error> {
        let mut time_zone: Option<String> = None;
        let mut nanoseconds: Option<i64> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "time_zone" if time_zone.is_some() => {
                    return Err(de::Error::duplicate_field("time_zone"));
                }
                "time_zone" => time_zone = Some(map.next_value()?),
                "nanoseconds" if nanoseconds.is_some() => {
                    return Err(de::Error::duplicate_field("nanoseconds"));
                }
                "nanoseconds" => nanoseconds = Some(map.next_value()?),
                other => {
                    return Err(de::Error::unknown_field(other, ZONED_FIELDS))
                }
            }
        }
        let time_zone =
            time_zone.ok_or_else(|| de::Error::missing_field("time_zone"))?;
        let nanoseconds = nanoseconds
            .ok_or_else(|| de::Error::missing_field("nanoseconds"))?;
        (self.build)(&time_zone, nanoseconds).map_err(de::Error::custom)
    }
}

macro_rules! zoned {
    ($ty:ident) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                let mut s = serializer.serialize_struct(stringify!($ty), 2)?;
                s.serialize_field("time_zone", self.time_zone())?;
                s.serialize_field("nanoseconds", &self.nanoseconds())?;
                s.end()
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<$ty, D::Error> {
                let visitor = ZonedVisitor {
                    name: stringify!($ty),
                    build: $ty::from_nanoseconds,
                };
                deserializer.deserialize_struct(
                    stringify!($ty),
                    ZONED_FIELDS,
                    visitor,
                )
            }
        }
    };
}

zoned!(ZonedNanoDate);
zoned!(ZonedNanoDateTime);
