//! Tenant configuration as served by the tenant API.

use crate::availability::{ClockTime, OpeningShift, TenantAvailability};
use crate::checkout::PaymentMethod;
use crate::error::CommerceError;
use crate::ids::{CityId, NeighborhoodId, PaymentMethodId};
use crate::money::Money;
use crate::pricing::{FlavorCalcType, PricingEngine};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// A delivery area with its fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighborhood {
    pub id: NeighborhoodId,
    pub name: String,
    pub delivery_fee: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

/// Per-tenant settings consumed by pricing, availability and checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    #[serde(default)]
    pub flavor_calc_type: FlavorCalcType,
    #[serde(default)]
    pub opening_time: Option<ClockTime>,
    #[serde(default)]
    pub closing_time: Option<ClockTime>,
    #[serde(default)]
    pub opening_time2: Option<ClockTime>,
    #[serde(default)]
    pub closing_time2: Option<ClockTime>,
    /// Weekday codes, Sunday = 1.
    #[serde(default, deserialize_with = "deserialize_opening_days")]
    pub opening_days: BTreeSet<u8>,
    /// Preparation buffer in minutes.
    pub delivery_time: u32,
    /// Tenant backend heartbeat, in device-local time.
    #[serde(default, deserialize_with = "deserialize_local_timestamp")]
    pub last_pooling: Option<NaiveDateTime>,
    #[serde(default)]
    pub neighborhoods: Vec<Neighborhood>,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub payment_types: Vec<PaymentMethod>,
}

impl TenantConfig {
    /// Parse a tenant configuration payload.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        serde_json::from_str(json).map_err(|e| CommerceError::InvalidTenantConfig(e.to_string()))
    }

    /// Engine for this tenant's flavor mode.
    pub fn pricing_engine(&self) -> PricingEngine {
        PricingEngine::new(self.flavor_calc_type)
    }

    /// Opening shifts. Missing times count as 00:00, which disables the shift.
    pub fn shifts(&self) -> Vec<OpeningShift> {
        let shift = |open: Option<ClockTime>, close: Option<ClockTime>| {
            OpeningShift::new(
                open.unwrap_or(ClockTime::MIDNIGHT),
                close.unwrap_or(ClockTime::MIDNIGHT),
            )
        };
        vec![
            shift(self.opening_time, self.closing_time),
            shift(self.opening_time2, self.closing_time2),
        ]
    }

    /// Availability input for the calculator.
    pub fn availability(&self, table_mode: bool) -> TenantAvailability {
        let mut availability = TenantAvailability::new(self.shifts(), self.opening_days.iter().copied())
            .with_delivery_time(self.delivery_time)
            .with_table_mode(table_mode);
        availability.last_heartbeat = self.last_pooling;
        availability
    }

    pub fn payment_method(&self, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        self.payment_types.iter().find(|p| &p.id == id)
    }

    /// Payment methods the tenant currently accepts.
    pub fn active_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_types.iter().filter(|p| p.is_active)
    }

    pub fn neighborhood(&self, id: &NeighborhoodId) -> Option<&Neighborhood> {
        self.neighborhoods.iter().find(|n| &n.id == id)
    }

    pub fn city(&self, id: &CityId) -> Option<&City> {
        self.cities.iter().find(|c| &c.id == id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDay {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDays {
    List(Vec<RawDay>),
    Joined(String),
}

/// Accepts `[1, 2, 3]`, `["1", "2"]` or `"1,2,3"`.
fn deserialize_opening_days<'de, D>(deserializer: D) -> Result<BTreeSet<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDays>::deserialize(deserializer)?;
    let codes: Vec<String> = match raw {
        None => return Ok(BTreeSet::new()),
        Some(RawDays::List(days)) => days
            .into_iter()
            .map(|d| match d {
                RawDay::Number(n) => n.to_string(),
                RawDay::Text(s) => s,
            })
            .collect(),
        Some(RawDays::Joined(s)) => s.split(',').map(str::to_string).collect(),
    };

    let mut days = BTreeSet::new();
    for code in codes {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let day: u8 = code
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid weekday code {:?}", code)))?;
        if !(1..=7).contains(&day) {
            return Err(de::Error::custom(format!("weekday code {} out of range 1-7", day)));
        }
        days.insert(day);
    }
    Ok(days)
}

/// Accepts a naive `YYYY-MM-DDTHH:MM:SS` or RFC 3339. A naive value is taken
/// as device-local time; an offset timestamp is converted to device-local time
/// so it compares against the local clock as the same instant.
pub(crate) fn deserialize_local_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Local).naive_local()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(at));
        }
    }
    Err(de::Error::custom(format!("invalid timestamp {:?}", raw)))
}
