//! Availability module.
//!
//! Opening hours, liveness heartbeat and bookable delivery slots.

mod calculator;
mod schedule;

pub use calculator::{AvailabilityCalculator, DEFAULT_HEARTBEAT_TOLERANCE_SECS, DEFAULT_SLOT_MINUTES};
pub use schedule::{
    weekday_code, ClockTime, ClockTimeParseError, OpeningShift, TenantAvailability, MINUTES_PER_DAY,
};
