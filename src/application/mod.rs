//! Application layer containing the payment workflow orchestration.
//!
//! `OrderIssuer` prepares gateway orders for paid registrations and
//! `PaymentVerifier` turns authenticated gateway callbacks into paid,
//! approved registrations. Both are stateless between requests; all shared
//! state lives behind the store ports.

pub mod order_issuer;
pub mod payment_verifier;
