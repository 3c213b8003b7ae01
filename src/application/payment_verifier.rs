use crate::domain::ports::{ApprovalNotice, ClockRef, NotifierRef, RegistrationStoreRef};
use crate::domain::registration::{ConfirmOutcome, PaymentProof, Registration};
use crate::domain::signature::verify_payment_signature;
use crate::error::{Dependency, Entity, RegistrationError, Result};
use serde::{Deserialize, Serialize};

/// Gateway callback fields as they arrive. Every field is untrusted until the
/// signature checks out.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaymentCallback {
    #[serde(default, rename = "razorpay_order_id")]
    pub order_id: Option<String>,
    #[serde(default, rename = "razorpay_payment_id")]
    pub payment_id: Option<String>,
    #[serde(default, rename = "razorpay_signature")]
    pub signature: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub success: bool,
    pub registration_id: String,
}

/// Authenticates gateway callbacks and moves registrations to paid.
pub struct PaymentVerifier {
    registrations: RegistrationStoreRef,
    key_secret: Option<String>,
    notifier: NotifierRef,
    clock: ClockRef,
}

/// Rejects absent or blank fields. Present values are passed on byte for
/// byte, since they feed the signature check.
fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl PaymentVerifier {
    pub fn new(
        registrations: RegistrationStoreRef,
        key_secret: Option<String>,
        notifier: NotifierRef,
        clock: ClockRef,
    ) -> Self {
        Self {
            registrations,
            key_secret,
            notifier,
            clock,
        }
    }

    /// Verifies a payment callback and marks the registration paid and
    /// approved.
    ///
    /// Safe to call repeatedly: once a registration is paid, further valid
    /// callbacks succeed without touching it. Only the call that performs the
    /// transition dispatches the approval notice.
    pub async fn verify(&self, callback: &PaymentCallback) -> Result<Confirmation> {
        let (Some(order_id), Some(payment_id), Some(signature), Some(registration_id)) = (
            required(callback.order_id.as_deref()),
            required(callback.payment_id.as_deref()),
            required(callback.signature.as_deref()),
            required(callback.registration_id.as_deref()),
        ) else {
            return Err(RegistrationError::InvalidInput(
                "Missing required payment verification fields".to_string(),
            ));
        };

        let secret = self
            .key_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RegistrationError::Unavailable(Dependency::Gateway))?;

        if !verify_payment_signature(secret, order_id, payment_id, signature) {
            tracing::warn!(registration_id, order_id, "rejected payment callback: bad signature");
            return Err(RegistrationError::SignatureInvalid);
        }

        let registration = self
            .registrations
            .get(registration_id)
            .await?
            .ok_or(RegistrationError::NotFound(Entity::Registration))?;

        if registration.gateway_order_id.as_deref() != Some(order_id) {
            tracing::warn!(
                registration_id,
                order_id,
                "rejected payment callback: order does not belong to registration"
            );
            return Err(RegistrationError::OrderMismatch);
        }

        if registration.is_paid() {
            tracing::info!(registration_id, "payment already confirmed");
            return Ok(confirmed(registration_id));
        }

        let proof = PaymentProof {
            payment_id: payment_id.to_string(),
            signature: signature.to_string(),
            paid_at: self.clock.now(),
        };

        match self
            .registrations
            .confirm_payment(registration_id, order_id, proof)
            .await?
        {
            ConfirmOutcome::Confirmed(registration) => {
                tracing::info!(registration_id, order_id, payment_id, "payment confirmed");
                self.dispatch_approval(&registration);
                Ok(confirmed(registration_id))
            }
            ConfirmOutcome::AlreadyPaid(_) => {
                tracing::info!(registration_id, "payment confirmed by a concurrent callback");
                Ok(confirmed(registration_id))
            }
            ConfirmOutcome::OrderMismatch => Err(RegistrationError::OrderMismatch),
            ConfirmOutcome::Missing => Err(RegistrationError::NotFound(Entity::Registration)),
        }
    }

    /// Fire-and-forget: the payment is already committed, so delivery
    /// problems are only logged.
    fn dispatch_approval(&self, registration: &Registration) {
        let notifier = self.notifier.clone();
        let notice = ApprovalNotice {
            registration_id: registration.id.clone(),
            event_id: registration.event_id.clone(),
            team_name: registration.team_name.clone(),
            captain_name: registration.captain_name.clone(),
            captain_email: registration.captain_email.clone(),
        };
        tokio::spawn(async move {
            let registration_id = notice.registration_id.clone();
            if let Err(e) = notifier.registration_approved(notice).await {
                tracing::warn!(%registration_id, error = %e, "approval notice not delivered");
            }
        });
    }
}

fn confirmed(registration_id: &str) -> Confirmation {
    Confirmation {
        success: true,
        registration_id: registration_id.to_string(),
    }
}
