use std::{fmt, str::FromStr};

use chrono::TimeDelta;
use polars::prelude::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, PeriodizeError, PeriodizeResult};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

/// Sub-daily units, largest first, used to print the nanosecond part.
const SUB_DAILY_UNITS: [(&str, i64); 6] = [
    ("h", NANOS_PER_HOUR),
    ("m", NANOS_PER_MINUTE),
    ("s", NANOS_PER_SECOND),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// A bucket width, parsed from strings like `"1m"`, `"4h"` or `"1h30m"`.
///
/// Parsing uses the polars duration language: one or more `<integer><unit>`
/// terms with units `ns`, `us`, `ms`, `s`, `m`, `h`, `d` and `w`. Months,
/// quarters, years and index counts (`mo`, `q`, `y`, `i`) are rejected, as
/// are widths mixing weeks, days and sub-daily units.
///
/// `d` and `w` are calendar units: on a zoned key column a day starts at
/// local midnight and a week on local Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Frequency {
    duration: Duration,
}

impl Frequency {
    pub fn from_nanos(nanos: i64) -> PeriodizeResult<Self> {
        format!("{nanos}ns").parse()
    }

    pub fn minutes(n: i64) -> PeriodizeResult<Self> {
        format!("{n}m").parse()
    }

    pub fn hours(n: i64) -> PeriodizeResult<Self> {
        format!("{n}h").parse()
    }

    pub fn days(n: i64) -> PeriodizeResult<Self> {
        format!("{n}d").parse()
    }

    /// The width as a polars window duration.
    pub fn as_duration(&self) -> Duration {
        self.duration
    }

    /// Nominal width, counting a day as 24 hours.
    pub fn as_nanos(&self) -> i64 {
        self.duration.duration_ns()
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        TimeDelta::nanoseconds(self.as_nanos())
    }

    /// Human readable width, e.g. `1h 30m`.
    pub fn humanize(&self) -> String {
        humantime::format_duration(std::time::Duration::from_nanos(self.as_nanos().unsigned_abs()))
            .to_string()
    }
}

impl FromStr for Frequency {
    type Err = PeriodizeError;

    fn from_str(s: &str) -> PeriodizeResult<Self> {
        let input = s.trim();
        let duration = Duration::try_parse(input).map_err(|e| invalid(s, &e.to_string()))?;

        if duration.is_zero() || duration.negative() {
            return Err(invalid(s, "width must be positive"));
        }
        if duration.months() != 0 {
            return Err(invalid(s, "months, quarters and years are not supported"));
        }
        if duration.parsed_int {
            return Err(invalid(s, "index counts ('i') need a temporal unit"));
        }
        let parts = [duration.weeks(), duration.days(), duration.nanoseconds()];
        if parts.iter().filter(|&&n| n != 0).count() > 1 {
            return Err(invalid(s, "cannot mix week, day and sub-daily units"));
        }

        Ok(Self { duration })
    }
}

fn invalid(input: &str, msg: &str) -> PeriodizeError {
    ConfigError::InvalidFrequency {
        input: input.to_string(),
        msg: msg.to_string(),
    }
    .into()
}

impl fmt::Display for Frequency {
    /// Canonical form accepted by [`FromStr`], e.g. `1h30m`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.duration.weeks() > 0 {
            return write!(f, "{}w", self.duration.weeks());
        }
        if self.duration.days() > 0 {
            return write!(f, "{}d", self.duration.days());
        }
        let mut rest = self.duration.nanoseconds();
        for (name, nanos) in SUB_DAILY_UNITS {
            let count = rest / nanos;
            if count > 0 {
                write!(f, "{count}{name}")?;
                rest -= count * nanos;
            }
        }
        Ok(())
    }
}

impl TryFrom<&str> for Frequency {
    type Error = PeriodizeError;

    fn try_from(value: &str) -> PeriodizeResult<Self> {
        value.parse()
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
