use crate::domain::event::Event;
use crate::domain::ports::{EventStore, GatewayOrder, RegistrationStore};
use crate::domain::registration::{AttachOutcome, ConfirmOutcome, PaymentProof, Registration};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for events.
///
/// Uses `Arc<RwLock<HashMap<String, Event>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<String, Event>>>,
}

impl InMemoryEventStore {
    /// Creates a new, empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn store(&self, event: Event) -> Result<()> {
        let mut events = self.events.write().await;
        events.insert(event.id.clone(), event);
        Ok(())
    }

    async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(event_id).cloned())
    }
}

/// A thread-safe in-memory store for registrations.
///
/// Guarded transitions hold the write lock for the whole read-check-write, so
/// concurrent callers are serialized and only the first one sees the record in
/// its pre-transition state.
#[derive(Default, Clone)]
pub struct InMemoryRegistrationStore {
    registrations: Arc<RwLock<HashMap<String, Registration>>>,
}

impl InMemoryRegistrationStore {
    /// Creates a new, empty in-memory registration store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn store(&self, registration: Registration) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        registrations.insert(registration.id.clone(), registration);
        Ok(())
    }

    async fn get(&self, registration_id: &str) -> Result<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations.get(registration_id).cloned())
    }

    async fn attach_order(
        &self,
        registration_id: &str,
        order: &GatewayOrder,
    ) -> Result<AttachOutcome> {
        let mut registrations = self.registrations.write().await;
        Ok(match registrations.get_mut(registration_id) {
            Some(registration) => registration.attach_order(order),
            None => AttachOutcome::Missing,
        })
    }

    async fn confirm_payment(
        &self,
        registration_id: &str,
        order_id: &str,
        proof: PaymentProof,
    ) -> Result<ConfirmOutcome> {
        let mut registrations = self.registrations.write().await;
        Ok(match registrations.get_mut(registration_id) {
            Some(registration) => registration.confirm_payment(order_id, proof),
            None => ConfirmOutcome::Missing,
        })
    }
}
