use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use regcore::application::order_issuer::{GatewayAccess, OrderIssuer};
use regcore::application::payment_verifier::PaymentVerifier;
use regcore::config::ServerConfig;
use regcore::domain::event::Event;
use regcore::domain::ports::{
    ClockRef, EventStoreRef, NotifierRef, RegistrationStoreRef, SystemClock,
};
use regcore::domain::status::compute_status;
use regcore::infrastructure::in_memory::{InMemoryEventStore, InMemoryRegistrationStore};
use regcore::infrastructure::notifier::{HttpNotifier, LogNotifier};
use regcore::infrastructure::razorpay::RazorpayGateway;
use regcore::interfaces::http::{AppState, router};
use regcore::interfaces::seed::SeedData;
use regcore::telemetry;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the checkout and payment callback HTTP service
    Serve(ServerConfig),
    /// Print the computed status of an event
    Status {
        /// Event JSON file
        #[arg(long)]
        event: PathBuf,

        /// Instant to evaluate at (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_logging().into_diagnostic()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(config) => serve(config).await,
        Command::Status { event, at } => {
            let file = File::open(event).into_diagnostic()?;
            let event: Event = serde_json::from_reader(file).into_diagnostic()?;
            let status = compute_status(&event, at.unwrap_or_else(Utc::now));
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
            Ok(())
        }
    }
}

fn open_stores(config: &ServerConfig) -> Result<(EventStoreRef, RegistrationStoreRef)> {
    if let Some(db_path) = &config.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            // Use persistent storage (RocksDB)
            let store = regcore::infrastructure::rocksdb::RocksDBStore::open(db_path)
                .into_diagnostic()?;
            tracing::info!(path = %db_path.display(), "using RocksDB storage");
            let events: EventStoreRef = Arc::new(store.clone());
            let registrations: RegistrationStoreRef = Arc::new(store);
            return Ok((events, registrations));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            miette::bail!(
                "--db-path {} requires building with the storage-rocksdb feature",
                db_path.display()
            );
        }
    }

    // Use in-memory storage
    let events: EventStoreRef = Arc::new(InMemoryEventStore::new());
    let registrations: RegistrationStoreRef = Arc::new(InMemoryRegistrationStore::new());
    Ok((events, registrations))
}

async fn serve(config: ServerConfig) -> Result<()> {
    let (events, registrations) = open_stores(&config)?;

    if let Some(seed) = &config.seed {
        let file = File::open(seed).into_diagnostic()?;
        let (event_count, registration_count) = SeedData::from_reader(file)
            .into_diagnostic()?
            .load_into(events.as_ref(), registrations.as_ref())
            .await
            .into_diagnostic()?;
        tracing::info!(events = event_count, registrations = registration_count, "seed loaded");
    }

    let credentials = config.gateway.credentials();
    let gateway = match &credentials {
        Some(credentials) => {
            let client = RazorpayGateway::new(
                config.gateway.api_base.clone(),
                credentials.clone(),
                config.gateway.timeout(),
            )
            .into_diagnostic()?;
            Some(GatewayAccess {
                gateway: Arc::new(client),
                credentials: credentials.clone(),
                timeout: config.gateway.timeout(),
            })
        }
        None => {
            tracing::warn!("gateway credentials missing; paid checkout and verification are disabled");
            None
        }
    };

    let notifier: NotifierRef = match &config.notify_url {
        Some(url) => Arc::new(HttpNotifier::new(url.clone(), NOTIFY_TIMEOUT).into_diagnostic()?),
        None => Arc::new(LogNotifier),
    };
    let clock: ClockRef = Arc::new(SystemClock);

    let state = AppState {
        issuer: Arc::new(OrderIssuer::new(events.clone(), registrations.clone(), gateway)),
        verifier: Arc::new(PaymentVerifier::new(
            registrations,
            credentials.map(|c| c.key_secret),
            notifier,
            clock.clone(),
        )),
        events,
        clock,
    };

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .into_diagnostic()?;
    tracing::info!(addr = %config.listen, "listening");
    axum::serve(listener, router(state)).await.into_diagnostic()?;

    Ok(())
}
