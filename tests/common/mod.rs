#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use regcore::application::order_issuer::{GatewayAccess, OrderIssuer};
use regcore::application::payment_verifier::{PaymentCallback, PaymentVerifier};
use regcore::config::GatewayCredentials;
use regcore::domain::event::Event;
use regcore::domain::ports::{
    ApprovalNotice, Clock, EventStore, GatewayOrder, Notifier, OrderRequest, PaymentGateway,
    RegistrationStore,
};
use regcore::domain::registration::Registration;
use regcore::domain::signature::sign_payment;
use regcore::error::{RegistrationError, Result};
use regcore::infrastructure::in_memory::{InMemoryEventStore, InMemoryRegistrationStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_secret";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Gateway double that hands out sequential order ids and records requests.
#[derive(Default)]
pub struct FakeGateway {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<OrderRequest>>,
    pub fail: bool,
    pub delay: Option<std::time::Duration>,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RegistrationError::Upstream("503 from gateway".to_string()));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(GatewayOrder {
            id: format!("order_{n}"),
            amount: request.amount,
            currency: request.currency,
        })
    }
}

/// Forwards every approval notice to a channel.
pub struct ChannelNotifier(pub mpsc::UnboundedSender<ApprovalNotice>);

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn registration_approved(&self, notice: ApprovalNotice) -> Result<()> {
        self.0
            .send(notice)
            .map_err(|e| RegistrationError::internal(e.to_string()))
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn registration_approved(&self, _notice: ApprovalNotice) -> Result<()> {
        Err(RegistrationError::internal("mail service down"))
    }
}

/// Paid event whose registration window is open at `t0()`.
pub fn paid_event(fee: Decimal) -> Event {
    Event {
        id: "evt_1".to_string(),
        name: "Summer Open".to_string(),
        start_date: t0() + Duration::days(3),
        end_date: t0() + Duration::days(4),
        registration_start: t0() - Duration::days(1),
        registration_end: t0() + Duration::days(1),
        admin_status: None,
        registration_override: None,
        is_registration_open: None,
        entry_fee: Some(fee),
        currency: "INR".to_string(),
    }
}

pub fn registration(id: &str) -> Registration {
    Registration::new(id, "evt_1", "Falcons", "Ari Rao", "ari@example.com")
}

pub fn gateway_order(id: &str) -> GatewayOrder {
    GatewayOrder {
        id: id.to_string(),
        amount: 49_900,
        currency: "INR".to_string(),
    }
}

pub fn callback(order_id: &str, payment_id: &str, registration_id: &str) -> PaymentCallback {
    PaymentCallback {
        order_id: Some(order_id.to_string()),
        payment_id: Some(payment_id.to_string()),
        signature: Some(sign_payment(KEY_SECRET, order_id, payment_id)),
        registration_id: Some(registration_id.to_string()),
    }
}

pub struct Harness {
    pub events: Arc<InMemoryEventStore>,
    pub registrations: Arc<InMemoryRegistrationStore>,
    pub gateway: Arc<FakeGateway>,
    pub issuer: OrderIssuer,
    pub verifier: PaymentVerifier,
    pub notices: mpsc::UnboundedReceiver<ApprovalNotice>,
}

impl Harness {
    pub async fn new(fee: Decimal) -> Self {
        Self::with_gateway(fee, FakeGateway::default()).await
    }

    pub async fn with_gateway(fee: Decimal, gateway: FakeGateway) -> Self {
        let events = Arc::new(InMemoryEventStore::new());
        let registrations = Arc::new(InMemoryRegistrationStore::new());
        events.store(paid_event(fee)).await.unwrap();
        registrations.store(registration("reg_1")).await.unwrap();

        let gateway = Arc::new(gateway);
        let access = GatewayAccess {
            gateway: gateway.clone(),
            credentials: GatewayCredentials {
                key_id: KEY_ID.to_string(),
                key_secret: KEY_SECRET.to_string(),
            },
            timeout: std::time::Duration::from_millis(200),
        };
        let (tx, notices) = mpsc::unbounded_channel();

        let issuer = OrderIssuer::new(events.clone(), registrations.clone(), Some(access));
        let verifier = PaymentVerifier::new(
            registrations.clone(),
            Some(KEY_SECRET.to_string()),
            Arc::new(ChannelNotifier(tx)),
            Arc::new(FixedClock(t0())),
        );

        Self {
            events,
            registrations,
            gateway,
            issuer,
            verifier,
            notices,
        }
    }

    pub async fn paid_default() -> Self {
        Self::new(dec!(499)).await
    }

    pub async fn registration(&self, id: &str) -> Registration {
        self.registrations.get(id).await.unwrap().unwrap()
    }
}
