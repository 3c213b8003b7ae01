//! Runtime configuration, read from flags with environment fallbacks.

use crate::infrastructure::razorpay::DEFAULT_API_BASE;
use clap::Args;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway key pair. Only constructed when both halves are present.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Args, Clone)]
pub struct GatewayConfig {
    /// Gateway key id
    #[arg(long, env = "RAZORPAY_KEY_ID", hide_env_values = true)]
    pub key_id: Option<String>,

    /// Gateway key secret, also used to verify callback signatures
    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    pub key_secret: Option<String>,

    /// Base URL of the gateway REST API
    #[arg(long, env = "RAZORPAY_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Upper bound for a single gateway request, in milliseconds
    #[arg(long, env = "GATEWAY_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
}

impl GatewayConfig {
    /// Returns the key pair if both halves are set and non-blank. Anything
    /// less leaves the payment flow disabled.
    pub fn credentials(&self) -> Option<GatewayCredentials> {
        let key_id = self.key_id.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let key_secret = self
            .key_secret
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        Some(GatewayCredentials {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Args, Clone)]
pub struct ServerConfig {
    /// Address the HTTP service binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// JSON file with `events` and `registrations` to load at startup
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Mail service endpoint for approval notices. Logged only when unset.
    #[arg(long, env = "NOTIFY_URL")]
    pub notify_url: Option<String>,

    #[command(flatten)]
    pub gateway: GatewayConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key_id: Option<&str>, key_secret: Option<&str>) -> GatewayConfig {
        GatewayConfig {
            key_id: key_id.map(str::to_string),
            key_secret: key_secret.map(str::to_string),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_ms: 10_000,
        }
    }

    #[test]
    fn test_credentials_require_both_halves() {
        assert!(config(Some("rzp_test_1"), Some("s3cret")).credentials().is_some());
        assert!(config(Some("rzp_test_1"), None).credentials().is_none());
        assert!(config(None, Some("s3cret")).credentials().is_none());
        assert!(config(Some("rzp_test_1"), Some("   ")).credentials().is_none());
        assert!(config(Some(""), Some("s3cret")).credentials().is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = config(Some("rzp_test_1"), Some("s3cret")).credentials().unwrap();
        let printed = format!("{creds:?}");
        assert!(printed.contains("rzp_test_1"));
        assert!(!printed.contains("s3cret"));
    }
}
