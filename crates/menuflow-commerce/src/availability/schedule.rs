//! Opening hours types.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Build from hour and minute. Returns `None` outside 00:00..=23:59.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Build from minutes since midnight.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes as u16))
    }

    /// Time of day of a timestamp, seconds dropped.
    pub fn of(at: &NaiveDateTime) -> Self {
        Self((at.hour() * 60 + at.minute()) as u16)
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.0 as u32
    }

    /// As a `NaiveTime`.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.minutes() / 60, self.minutes() % 60, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

/// Error parsing an `HH:MM` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day {0:?}, expected HH:MM")]
pub struct ClockTimeParseError(pub String);

impl FromStr for ClockTime {
    type Err = ClockTimeParseError;

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ClockTimeParseError(s.to_string());
        let mut parts = s.trim().split(':');
        let hour = parts.next().and_then(|p| p.parse::<u32>().ok()).ok_or_else(err)?;
        let minute = parts.next().and_then(|p| p.parse::<u32>().ok()).ok_or_else(err)?;
        match parts.next() {
            None => {}
            Some(sec) if sec.parse::<u32>().map(|n| n < 60).unwrap_or(false) => {}
            Some(_) => return Err(err()),
        }
        if parts.next().is_some() {
            return Err(err());
        }
        ClockTime::from_hm(hour, minute).ok_or_else(err)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One open/close interval of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningShift {
    pub open: ClockTime,
    pub close: ClockTime,
}

impl OpeningShift {
    pub fn new(open: ClockTime, close: ClockTime) -> Self {
        Self { open, close }
    }

    /// Both ends at 00:00 is how an unused shift is stored.
    pub fn is_disabled(&self) -> bool {
        self.open == ClockTime::MIDNIGHT && self.close == ClockTime::MIDNIGHT
    }

    /// Close before open means the shift runs past midnight.
    pub fn crosses_midnight(&self) -> bool {
        self.close < self.open
    }

    /// Whether the shift covers `time`. The close minute itself is outside.
    pub fn contains(&self, time: ClockTime) -> bool {
        if self.crosses_midnight() {
            time >= self.open || time < self.close
        } else {
            self.open <= time && time < self.close
        }
    }
}

/// Weekday code with Sunday = 1 through Saturday = 7.
pub fn weekday_code(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8 + 1
}

/// Everything needed to decide whether a tenant takes orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantAvailability {
    /// Up to two shifts per day.
    pub shifts: Vec<OpeningShift>,
    /// Weekday codes (Sunday = 1) the tenant opens on.
    pub opening_days: BTreeSet<u8>,
    /// Preparation buffer before the earliest bookable slot.
    pub delivery_time_minutes: u32,
    /// Last time the tenant backend reported in.
    pub last_heartbeat: Option<NaiveDateTime>,
    /// Dine-in table mode: a fresh heartbeat alone means open.
    pub is_table_mode_override: bool,
}

impl TenantAvailability {
    /// Create availability with no heartbeat yet.
    pub fn new(shifts: Vec<OpeningShift>, opening_days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            shifts,
            opening_days: opening_days.into_iter().collect(),
            delivery_time_minutes: 0,
            last_heartbeat: None,
            is_table_mode_override: false,
        }
    }

    /// Set the preparation buffer (builder style).
    pub fn with_delivery_time(mut self, minutes: u32) -> Self {
        self.delivery_time_minutes = minutes;
        self
    }

    /// Set the last heartbeat (builder style).
    pub fn with_heartbeat(mut self, at: NaiveDateTime) -> Self {
        self.last_heartbeat = Some(at);
        self
    }

    /// Enable table mode (builder style).
    pub fn with_table_mode(mut self, enabled: bool) -> Self {
        self.is_table_mode_override = enabled;
        self
    }

    /// Shifts that are not disabled.
    pub fn active_shifts(&self) -> impl Iterator<Item = &OpeningShift> {
        self.shifts.iter().filter(|s| !s.is_disabled())
    }

    /// Whether the tenant opens on `date`'s weekday.
    pub fn opens_on(&self, date: NaiveDate) -> bool {
        self.opening_days.contains(&weekday_code(date))
    }
}
