use crate::domain::event::Event;
use crate::domain::ports::{EventStore, GatewayOrder, RegistrationStore};
use crate::domain::registration::{AttachOutcome, ConfirmOutcome, PaymentProof, Registration};
use crate::error::{RegistrationError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, ErrorKind, OptimisticTransactionDB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing events.
pub const CF_EVENTS: &str = "events";
/// Column Family for storing registrations.
pub const CF_REGISTRATIONS: &str = "registrations";

/// Commits are retried this many times when another writer touched the same key.
const MAX_COMMIT_ATTEMPTS: usize = 8;

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Event` and `Registration` entities using separate
/// Column Families. Guarded registration transitions run inside optimistic
/// transactions: the record is read with `get_for_update`, checked, rewritten
/// and committed, and a commit that loses to a concurrent writer is retried
/// against the fresh value.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<OptimisticTransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("events" and
    /// "registrations") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_events = ColumnFamilyDescriptor::new(CF_EVENTS, Options::default());
        let cf_registrations = ColumnFamilyDescriptor::new(CF_REGISTRATIONS, Options::default());

        let db: OptimisticTransactionDB =
            OptimisticTransactionDB::open_cf_descriptors(&opts, path, vec![cf_events, cf_registrations])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            RegistrationError::internal(format!("{name} column family not found"))
        })
    }

    fn put<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Runs `apply` against the current registration inside an optimistic
    /// transaction. `apply` returns the outcome and whether the record changed.
    fn update_registration<O, F>(&self, registration_id: &str, mut apply: F) -> Result<O>
    where
        F: FnMut(Option<&mut Registration>) -> (O, bool),
    {
        let cf = self.cf(CF_REGISTRATIONS)?;
        let key = registration_id.as_bytes();

        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let txn = self.db.transaction();
            let mut current: Option<Registration> = match txn.get_for_update_cf(cf, key, true)? {
                Some(bytes) => Some(serde_json::from_slice(&bytes)?),
                None => None,
            };

            let (outcome, changed) = apply(current.as_mut());
            if !changed {
                return Ok(outcome);
            }

            if let Some(registration) = &current {
                txn.put_cf(cf, key, serde_json::to_vec(registration)?)?;
            }
            match txn.commit() {
                Ok(()) => return Ok(outcome),
                Err(e) if matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain) => {
                    tracing::debug!(registration_id, "registration write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RegistrationError::internal(format!(
            "registration {registration_id} stayed contended after {MAX_COMMIT_ATTEMPTS} attempts"
        )))
    }
}

#[async_trait]
impl EventStore for RocksDBStore {
    async fn store(&self, event: Event) -> Result<()> {
        self.put(CF_EVENTS, &event.id, &event)
    }

    async fn get(&self, event_id: &str) -> Result<Option<Event>> {
        self.fetch(CF_EVENTS, event_id)
    }
}

#[async_trait]
impl RegistrationStore for RocksDBStore {
    async fn store(&self, registration: Registration) -> Result<()> {
        self.put(CF_REGISTRATIONS, &registration.id, &registration)
    }

    async fn get(&self, registration_id: &str) -> Result<Option<Registration>> {
        self.fetch(CF_REGISTRATIONS, registration_id)
    }

    async fn attach_order(
        &self,
        registration_id: &str,
        order: &GatewayOrder,
    ) -> Result<AttachOutcome> {
        self.update_registration(registration_id, |current| match current {
            Some(registration) => {
                let outcome = registration.attach_order(order);
                let changed = outcome == AttachOutcome::Attached;
                (outcome, changed)
            }
            None => (AttachOutcome::Missing, false),
        })
    }

    async fn confirm_payment(
        &self,
        registration_id: &str,
        order_id: &str,
        proof: PaymentProof,
    ) -> Result<ConfirmOutcome> {
        self.update_registration(registration_id, |current| match current {
            Some(registration) => {
                let outcome = registration.confirm_payment(order_id, proof.clone());
                let changed = matches!(outcome, ConfirmOutcome::Confirmed(_));
                (outcome, changed)
            }
            None => (ConfirmOutcome::Missing, false),
        })
    }
}
