use super::event::Event;
use super::registration::{AttachOutcome, ConfirmOutcome, PaymentProof, Registration};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn store(&self, event: Event) -> Result<()>;
    async fn get(&self, event_id: &str) -> Result<Option<Event>>;
}

/// Persistence for registrations.
///
/// `store` is a plain upsert used for seeding. Payment state must only change
/// through `attach_order` and `confirm_payment`, which implementations run as
/// a single atomic read-check-write against the stored record.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn store(&self, registration: Registration) -> Result<()>;
    async fn get(&self, registration_id: &str) -> Result<Option<Registration>>;
    async fn attach_order(
        &self,
        registration_id: &str,
        order: &GatewayOrder,
    ) -> Result<AttachOutcome>;
    async fn confirm_payment(
        &self,
        registration_id: &str,
        order_id: &str,
        proof: PaymentProof,
    ) -> Result<ConfirmOutcome>;
}

/// Order creation request in the gateway's terms.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder>;
}

/// Payload handed to the notification collaborator once a payment clears.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ApprovalNotice {
    pub registration_id: String,
    pub event_id: String,
    pub team_name: String,
    pub captain_name: String,
    pub captain_email: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn registration_approved(&self, notice: ApprovalNotice) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type EventStoreRef = Arc<dyn EventStore>;
pub type RegistrationStoreRef = Arc<dyn RegistrationStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type NotifierRef = Arc<dyn Notifier>;
pub type ClockRef = Arc<dyn Clock>;
