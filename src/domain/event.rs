use crate::error::{RegistrationError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Status flag an admin can set explicitly on an event. Only `Closed` changes
/// the computed lifecycle; the other values mirror what the admin form offers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Upcoming,
    Live,
    Past,
    Closed,
}

/// Manual registration override. When present it wins over the time window.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationOverride {
    Open,
    Closed,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// A tournament event as configured by the admin domain.
///
/// The core only ever reads events. Window ordering (`registration_start <=
/// registration_end`, `start_date <= end_date`) is assumed, not enforced.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    #[serde(default)]
    pub admin_status: Option<AdminStatus>,
    #[serde(default)]
    pub registration_override: Option<RegistrationOverride>,
    // TODO: drop once the admin form stops writing it; status computation
    // never reads this flag.
    #[serde(default)]
    pub is_registration_open: Option<bool>,
    /// Entry fee in whole currency units. Absent or non-positive means free.
    #[serde(default)]
    pub entry_fee: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Event {
    pub fn is_free(&self) -> bool {
        self.entry_fee.is_none_or(|fee| fee <= Decimal::ZERO)
    }

    /// Entry fee converted to the gateway's minor unit (two-decimal
    /// currencies). Free events convert to zero; callers check `is_free`.
    pub fn amount_minor_units(&self) -> Result<i64> {
        if self.is_free() {
            return Ok(0);
        }
        let fee = self.entry_fee.unwrap_or_default();
        fee.checked_mul(Decimal::ONE_HUNDRED)
            .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|minor| minor.to_i64())
            .ok_or_else(|| {
                RegistrationError::InvalidInput(format!(
                    "entry fee of event {} is out of range",
                    self.id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn event(fee: Option<Decimal>) -> Event {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        Event {
            id: "evt_1".to_string(),
            name: "Spring Cup".to_string(),
            start_date: t,
            end_date: t,
            registration_start: t,
            registration_end: t,
            admin_status: None,
            registration_override: None,
            is_registration_open: None,
            entry_fee: fee,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_free_event_detection() {
        assert!(event(None).is_free());
        assert!(event(Some(dec!(0))).is_free());
        assert!(event(Some(dec!(-5))).is_free());
        assert!(!event(Some(dec!(0.01))).is_free());
    }

    #[test]
    fn test_amount_minor_units() {
        assert_eq!(event(Some(dec!(499))).amount_minor_units().unwrap(), 49_900);
        assert_eq!(event(Some(dec!(12.345))).amount_minor_units().unwrap(), 1_235);
        assert_eq!(event(Some(dec!(0))).amount_minor_units().unwrap(), 0);
        assert_eq!(event(None).amount_minor_units().unwrap(), 0);
    }

    #[test]
    fn test_amount_minor_units_out_of_range() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(18), 0);
        assert!(matches!(
            event(Some(huge)).amount_minor_units(),
            Err(RegistrationError::InvalidInput(_))
        ));
        assert!(matches!(
            event(Some(Decimal::MAX)).amount_minor_units(),
            Err(RegistrationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_event_deserialization_defaults() {
        let json = r#"{
            "id": "evt_9",
            "name": "Night Scrims",
            "start_date": "2026-05-01T18:00:00Z",
            "end_date": "2026-05-02T02:00:00Z",
            "registration_start": "2026-04-20T00:00:00Z",
            "registration_end": "2026-04-30T23:59:59Z",
            "registration_override": "open"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.currency, "INR");
        assert_eq!(event.registration_override, Some(RegistrationOverride::Open));
        assert_eq!(event.admin_status, None);
        assert!(event.is_free());
    }
}
