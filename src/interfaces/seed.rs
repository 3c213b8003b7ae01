use crate::domain::event::Event;
use crate::domain::ports::{EventStore, RegistrationStore};
use crate::domain::registration::Registration;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// Initial records for a store, as exported by the admin side.
#[derive(Debug, Deserialize, Default)]
pub struct SeedData {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl SeedData {
    /// Reads seed data from any `Read` source (e.g., File, Stdin).
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Writes every record into the given stores. Existing records with the
    /// same id are replaced.
    pub async fn load_into(
        self,
        events: &dyn EventStore,
        registrations: &dyn RegistrationStore,
    ) -> Result<(usize, usize)> {
        let counts = (self.events.len(), self.registrations.len());
        for event in self.events {
            events.store(event).await?;
        }
        for registration in self.registrations {
            registrations.store(registration).await?;
        }
        Ok(counts)
    }
}
