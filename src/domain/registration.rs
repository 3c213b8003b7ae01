use crate::domain::ports::GatewayOrder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment dimension of a registration. Moves forward only:
/// `None -> Pending -> Paid`, and `Paid` is terminal.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    None,
    Pending,
    Paid,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Gateway-issued proof of a completed payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentProof {
    pub payment_id: String,
    pub signature: String,
    pub paid_at: DateTime<Utc>,
}

/// One team's entry into one event.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub team_name: String,
    pub captain_name: String,
    pub captain_email: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    /// Amount the attached order was issued for. The event fee may change
    /// afterwards; checkout retries keep quoting this value.
    #[serde(default)]
    pub order_amount_minor_units: Option<i64>,
    #[serde(default)]
    pub order_currency: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_signature: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Result of trying to attach a gateway order to a registration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AttachOutcome {
    Attached,
    /// Another order is already attached; carries its id.
    Existing(String),
    AlreadyPaid,
    Missing,
}

/// Result of the guarded paid transition.
#[derive(Debug, PartialEq, Clone)]
pub enum ConfirmOutcome {
    Confirmed(Registration),
    AlreadyPaid(Registration),
    OrderMismatch,
    Missing,
}

impl Registration {
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        team_name: impl Into<String>,
        captain_name: impl Into<String>,
        captain_email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            team_name: team_name.into(),
            captain_name: captain_name.into(),
            captain_email: captain_email.into(),
            payment_status: PaymentStatus::None,
            approval_status: ApprovalStatus::Pending,
            gateway_order_id: None,
            order_amount_minor_units: None,
            order_currency: None,
            payment_id: None,
            payment_signature: None,
            paid_at: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Records a freshly issued gateway order. The order id is written once;
    /// later attempts report the existing order instead of replacing it.
    ///
    /// Stores call this while holding whatever guard makes the
    /// read-check-write atomic.
    pub fn attach_order(&mut self, order: &GatewayOrder) -> AttachOutcome {
        if self.is_paid() {
            return AttachOutcome::AlreadyPaid;
        }
        if let Some(existing) = &self.gateway_order_id {
            return AttachOutcome::Existing(existing.clone());
        }
        self.gateway_order_id = Some(order.id.clone());
        self.order_amount_minor_units = Some(order.amount);
        self.order_currency = Some(order.currency.clone());
        self.payment_status = PaymentStatus::Pending;
        AttachOutcome::Attached
    }

    /// Marks the registration paid and approved if it is still unpaid and
    /// `order_id` is the attached order. A paid registration is returned
    /// untouched, so a second writer can never overwrite the first proof.
    pub fn confirm_payment(&mut self, order_id: &str, proof: PaymentProof) -> ConfirmOutcome {
        if self.is_paid() {
            return ConfirmOutcome::AlreadyPaid(self.clone());
        }
        if self.gateway_order_id.as_deref() != Some(order_id) {
            return ConfirmOutcome::OrderMismatch;
        }
        self.payment_id = Some(proof.payment_id);
        self.payment_signature = Some(proof.signature);
        self.paid_at = Some(proof.paid_at);
        self.payment_status = PaymentStatus::Paid;
        self.approval_status = ApprovalStatus::Approved;
        ConfirmOutcome::Confirmed(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order(id: &str) -> GatewayOrder {
        GatewayOrder {
            id: id.to_string(),
            amount: 49_900,
            currency: "INR".to_string(),
        }
    }

    fn proof(payment_id: &str) -> PaymentProof {
        PaymentProof {
            payment_id: payment_id.to_string(),
            signature: "ab".repeat(32),
            paid_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_attach_order_once() {
        let mut reg = Registration::new("reg_1", "evt_1", "Team", "Cap", "cap@example.com");

        assert_eq!(reg.attach_order(&order("order_a")), AttachOutcome::Attached);
        assert_eq!(reg.payment_status, PaymentStatus::Pending);

        assert_eq!(
            reg.attach_order(&order("order_b")),
            AttachOutcome::Existing("order_a".to_string())
        );
        assert_eq!(reg.gateway_order_id.as_deref(), Some("order_a"));
        assert_eq!(reg.order_amount_minor_units, Some(49_900));
        assert_eq!(reg.order_currency.as_deref(), Some("INR"));
    }

    #[test]
    fn test_confirm_payment_sets_proof_and_approval() {
        let mut reg = Registration::new("reg_1", "evt_1", "Team", "Cap", "cap@example.com");
        reg.attach_order(&order("order_a"));

        let outcome = reg.confirm_payment("order_a", proof("pay_1"));
        assert!(matches!(outcome, ConfirmOutcome::Confirmed(_)));
        assert_eq!(reg.payment_status, PaymentStatus::Paid);
        assert_eq!(reg.approval_status, ApprovalStatus::Approved);
        assert_eq!(reg.payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn test_paid_is_terminal() {
        let mut reg = Registration::new("reg_1", "evt_1", "Team", "Cap", "cap@example.com");
        reg.attach_order(&order("order_a"));
        reg.confirm_payment("order_a", proof("pay_1"));
        let snapshot = reg.clone();

        let outcome = reg.confirm_payment("order_a", proof("pay_2"));
        assert_eq!(outcome, ConfirmOutcome::AlreadyPaid(snapshot.clone()));
        assert_eq!(reg.attach_order(&order("order_c")), AttachOutcome::AlreadyPaid);
        assert_eq!(reg, snapshot);
    }

    #[test]
    fn test_confirm_rejects_foreign_order() {
        let mut reg = Registration::new("reg_1", "evt_1", "Team", "Cap", "cap@example.com");
        reg.attach_order(&order("order_abc"));

        let outcome = reg.confirm_payment("order_xyz", proof("pay_1"));
        assert_eq!(outcome, ConfirmOutcome::OrderMismatch);
        assert_eq!(reg.payment_status, PaymentStatus::Pending);
        assert!(reg.payment_id.is_none());
    }

    #[test]
    fn test_registration_deserialization_defaults() {
        let json = r#"{
            "id": "reg_1",
            "event_id": "evt_1",
            "team_name": "Falcons",
            "captain_name": "Ari",
            "captain_email": "ari@example.com"
        }"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.payment_status, PaymentStatus::None);
        assert_eq!(reg.approval_status, ApprovalStatus::Pending);
        assert!(reg.gateway_order_id.is_none());
    }
}
