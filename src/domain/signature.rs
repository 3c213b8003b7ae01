//! Gateway callback signatures.
//!
//! The gateway signs `order_id|payment_id` with HMAC-SHA256 under the shared
//! key secret and hex-encodes the tag.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn payment_mac(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Hex signature the gateway produces for a payment.
pub fn sign_payment(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(payment_mac(secret, order_id, payment_id).finalize().into_bytes())
}

/// Checks a hex signature against `order_id|payment_id`.
///
/// Uses constant-time comparison. Anything that does not decode as hex is
/// treated as a mismatch.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let Ok(tag) = hex::decode(signature.trim()) else {
        return false;
    };
    payment_mac(secret, order_id, payment_id)
        .verify_slice(&tag)
        .is_ok()
}
