//! Open-now and delivery slot computation.
//!
//! Pure functions of their inputs: callers pass `now` explicitly, so the same
//! calculator can be polled on a timer or driven from tests.

use crate::availability::{ClockTime, TenantAvailability, MINUTES_PER_DAY};
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;

/// Default heartbeat tolerance (1.5 minutes).
pub const DEFAULT_HEARTBEAT_TOLERANCE_SECS: i64 = 90;

/// Default slot width in minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;

/// Decides whether a tenant is open and which delivery times it can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityCalculator {
    heartbeat_tolerance: Duration,
    slot_minutes: u32,
}

impl Default for AvailabilityCalculator {
    fn default() -> Self {
        Self {
            heartbeat_tolerance: Duration::seconds(DEFAULT_HEARTBEAT_TOLERANCE_SECS),
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl AvailabilityCalculator {
    /// Create a calculator. A zero slot width falls back to the default.
    pub fn new(heartbeat_tolerance: Duration, slot_minutes: u32) -> Self {
        Self {
            heartbeat_tolerance,
            slot_minutes: if slot_minutes == 0 {
                DEFAULT_SLOT_MINUTES
            } else {
                slot_minutes
            },
        }
    }

    /// Slot width in minutes.
    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Whether the tenant backend reported recently enough.
    ///
    /// A missing heartbeat counts as stale.
    pub fn heartbeat_is_fresh(&self, availability: &TenantAvailability, now: NaiveDateTime) -> bool {
        match availability.last_heartbeat {
            Some(beat) => now.signed_duration_since(beat) <= self.heartbeat_tolerance,
            None => false,
        }
    }

    /// Whether `at` falls on an opening day inside an active shift.
    ///
    /// Ignores the heartbeat.
    pub fn is_within_schedule(&self, availability: &TenantAvailability, at: NaiveDateTime) -> bool {
        if !availability.opens_on(at.date()) {
            return false;
        }
        let time = ClockTime::of(&at);
        availability.active_shifts().any(|shift| shift.contains(time))
    }

    /// Whether the tenant takes orders right now.
    ///
    /// Fails closed on a stale heartbeat. In table mode a fresh heartbeat is
    /// enough; posted hours are ignored.
    pub fn is_open_now(&self, availability: &TenantAvailability, now: NaiveDateTime) -> bool {
        if !self.heartbeat_is_fresh(availability, now) {
            tracing::debug!(
                last_heartbeat = ?availability.last_heartbeat,
                %now,
                "tenant heartbeat stale, reporting closed"
            );
            return false;
        }
        if availability.is_table_mode_override {
            return true;
        }
        self.is_within_schedule(availability, now)
    }

    /// Delivery times still bookable today, ascending and without duplicates.
    ///
    /// Slots sit on the slot grid, fall strictly after `now` plus the
    /// preparation buffer, and lie inside an active shift. Only today is
    /// considered: a shift that runs past midnight stops producing slots at
    /// 23:59.
    pub fn bookable_slots(
        &self,
        availability: &TenantAvailability,
        now: NaiveDateTime,
    ) -> Vec<NaiveDateTime> {
        let today = now.date();
        if !availability.opens_on(today) {
            return Vec::new();
        }

        let min_bookable = now + Duration::minutes(availability.delivery_time_minutes as i64);
        if min_bookable.date() != today {
            return Vec::new();
        }

        let step = self.slot_minutes;
        let mut slots = BTreeSet::new();

        for shift in availability.active_shifts() {
            let start = round_up(shift.open.minutes(), step);
            let end = if shift.crosses_midnight() {
                MINUTES_PER_DAY
            } else {
                shift.close.minutes()
            };

            let mut minute = start;
            while minute < end {
                let Some(time) = ClockTime::from_minutes(minute) else {
                    break;
                };
                let at = today.and_time(time.to_naive_time());
                if at > min_bookable && shift.contains(time) {
                    slots.insert(at);
                }
                minute += step;
            }
        }

        slots.into_iter().collect()
    }

    /// Whether `slot` is one of today's bookable slots.
    pub fn is_bookable(
        &self,
        availability: &TenantAvailability,
        now: NaiveDateTime,
        slot: NaiveDateTime,
    ) -> bool {
        if slot.date() != now.date() {
            return false;
        }
        self.bookable_slots(availability, now).contains(&slot)
    }
}

fn round_up(minutes: u32, step: u32) -> u32 {
    minutes.div_ceil(step) * step
}
