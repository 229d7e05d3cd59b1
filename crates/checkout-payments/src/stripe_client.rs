//! Stripe Payment Intents
//!
//! `IntentCollaborator` backed by the Stripe API.

use async_trait::async_trait;
use checkout_core::{PaymentIntentRecord, PaymentRequest};
use stripe::{Client, CreatePaymentIntent, CreatePaymentIntentAutomaticPaymentMethods, Currency};

use crate::error::{PaymentError, Result};
use crate::intent::IntentCollaborator;

const PAYMENT_INTENTS_PATH: &str = "/payment_intents";

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

/// Map a lowercase ISO code onto Stripe's currency enum
fn parse_currency(code: &str) -> Result<Currency> {
    serde_json::from_value(serde_json::Value::String(code.to_ascii_lowercase()))
        .map_err(|_| PaymentError::Config(format!("Unsupported currency: {code}")))
}

#[async_trait]
impl IntentCollaborator for StripeClient {
    async fn create_payment_intent(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentIntentRecord> {
        let currency = parse_currency(&request.currency)?;

        let mut params = CreatePaymentIntent::new(request.amount, currency);
        params.automatic_payment_methods = Some(CreatePaymentIntentAutomaticPaymentMethods {
            allow_redirects: None,
            enabled: request.automatic_payment_methods.enabled,
        });

        // Decoded straight from the response body; the typed
        // `stripe::PaymentIntent` drops keys it does not model.
        self.client
            .post_form::<PaymentIntentRecord, _>(PAYMENT_INTENTS_PATH, &params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))
    }

    fn name(&self) -> &str {
        "stripe"
    }
}
