use crate::config::GatewayCredentials;
use crate::domain::event::Event;
use crate::domain::ports::{
    EventStoreRef, GatewayOrder, OrderRequest, PaymentGatewayRef, RegistrationStoreRef,
};
use crate::domain::registration::{AttachOutcome, Registration};
use crate::error::{ConflictKind, Dependency, Entity, RegistrationError, Result, StateViolation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const RECEIPT_ID_CHARS: usize = 8;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prefill {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OrderNotes {
    pub event_name: String,
    pub team_name: String,
}

/// Everything the checkout widget needs to collect a payment.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OrderHandle {
    pub order_id: String,
    pub amount_minor_units: i64,
    pub currency: String,
    pub gateway_key_id: String,
    pub prefill: Prefill,
    pub notes: OrderNotes,
}

/// Gateway wiring. Absent when credentials are not configured, in which case
/// every paid order request fails closed.
pub struct GatewayAccess {
    pub gateway: PaymentGatewayRef,
    pub credentials: GatewayCredentials,
    pub timeout: Duration,
}

/// Issues gateway orders for paid event registrations.
pub struct OrderIssuer {
    events: EventStoreRef,
    registrations: RegistrationStoreRef,
    gateway: Option<GatewayAccess>,
}

impl OrderIssuer {
    pub fn new(
        events: EventStoreRef,
        registrations: RegistrationStoreRef,
        gateway: Option<GatewayAccess>,
    ) -> Self {
        Self {
            events,
            registrations,
            gateway,
        }
    }

    /// Validates the event and registration, then creates (or reuses) the
    /// registration's gateway order.
    ///
    /// Preconditions fail in a fixed order before anything is written. A
    /// gateway failure or timeout leaves the registration untouched.
    pub async fn issue_order(&self, event_id: &str, registration_id: &str) -> Result<OrderHandle> {
        if event_id.trim().is_empty() || registration_id.trim().is_empty() {
            return Err(RegistrationError::InvalidInput(
                "event_id and registration_id are required".to_string(),
            ));
        }

        let event = self
            .events
            .get(event_id)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Event))?;

        if event.is_free() {
            return Err(RegistrationError::InvalidState(StateViolation::FreeEvent));
        }
        let amount = event.amount_minor_units()?;

        let registration = self
            .registrations
            .get(registration_id)
            .await?
            .filter(|r| r.event_id == event.id)
            .ok_or(RegistrationError::NotFound(Entity::Registration))?;

        if registration.is_paid() {
            return Err(RegistrationError::Conflict(ConflictKind::AlreadyPaid));
        }

        let access = self
            .gateway
            .as_ref()
            .ok_or(RegistrationError::Unavailable(Dependency::Gateway))?;

        if let Some(order_id) = &registration.gateway_order_id {
            tracing::info!(registration_id, order_id = %order_id, "reusing open gateway order");
            let issued = GatewayOrder {
                id: order_id.clone(),
                amount: registration.order_amount_minor_units.unwrap_or(amount),
                currency: registration
                    .order_currency
                    .clone()
                    .unwrap_or_else(|| event.currency.clone()),
            };
            return Ok(handle(issued, &event, &registration, access));
        }

        let request = OrderRequest {
            amount,
            currency: event.currency.clone(),
            receipt: receipt_for(&registration.id),
            notes: BTreeMap::from([
                ("event_id".to_string(), event.id.clone()),
                ("registration_id".to_string(), registration.id.clone()),
            ]),
        };

        let pending = access.gateway.create_order(request);
        let order = match tokio::time::timeout(access.timeout, pending).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(registration_id, "gateway order request timed out");
                return Err(RegistrationError::Upstream(
                    "gateway request timed out".to_string(),
                ));
            }
        };

        let issued = match self.registrations.attach_order(registration_id, &order).await? {
            AttachOutcome::Attached => {
                tracing::info!(
                    registration_id,
                    order_id = %order.id,
                    amount = order.amount,
                    "gateway order attached"
                );
                order
            }
            AttachOutcome::Existing(existing) => {
                tracing::warn!(
                    registration_id,
                    orphaned_order_id = %order.id,
                    order_id = %existing,
                    "concurrent order issuance; keeping the first attached order"
                );
                GatewayOrder {
                    id: existing,
                    ..order
                }
            }
            AttachOutcome::AlreadyPaid => {
                return Err(RegistrationError::Conflict(ConflictKind::AlreadyPaid));
            }
            AttachOutcome::Missing => {
                return Err(RegistrationError::NotFound(Entity::Registration));
            }
        };

        Ok(handle(issued, &event, &registration, access))
    }
}

/// Gateway receipts are capped in length, so only a prefix of the id is used.
fn receipt_for(registration_id: &str) -> String {
    let prefix: String = registration_id.chars().take(RECEIPT_ID_CHARS).collect();
    format!("reg_{prefix}")
}

fn handle(
    order: GatewayOrder,
    event: &Event,
    registration: &Registration,
    access: &GatewayAccess,
) -> OrderHandle {
    OrderHandle {
        order_id: order.id,
        amount_minor_units: order.amount,
        currency: order.currency,
        gateway_key_id: access.credentials.key_id.clone(),
        prefill: Prefill {
            name: registration.captain_name.clone(),
            email: registration.captain_email.clone(),
        },
        notes: OrderNotes {
            event_name: event.name.clone(),
            team_name: registration.team_name.clone(),
        },
    }
}
