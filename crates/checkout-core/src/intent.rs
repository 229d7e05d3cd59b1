//! Payment Intent Types
//!
//! Records exchanged with the collaborator and the wire shapes of the
//! `/api/setup-stripe` endpoint.

use serde::{Deserialize, Serialize};

/// Single-use token scoping client-side operations to one payment intent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Lifecycle status of a payment intent, as reported by the collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment intent record owned by the collaborator
///
/// Only the consumed fields are typed; everything else the collaborator
/// sends is kept in `extra` so the record can be handed back verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRecord {
    pub id: String,

    #[serde(default)]
    pub client_secret: Option<ClientSecret>,

    pub status: IntentStatus,

    #[serde(default)]
    pub amount: i64,

    #[serde(default)]
    pub currency: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PaymentIntentRecord {
    /// Client secret, if the collaborator returned a non-empty one
    pub fn secret(&self) -> Option<&ClientSecret> {
        self.client_secret.as_ref().filter(|s| !s.is_empty())
    }
}

/// Automatic payment-method negotiation flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticPaymentMethods {
    pub enabled: bool,
}

/// Parameters of the collaborator's intent-creation call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in the smallest currency unit
    pub amount: i64,

    /// Lowercase ISO 4217 code
    pub currency: String,

    pub automatic_payment_methods: AutomaticPaymentMethods,
}

impl PaymentRequest {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            automatic_payment_methods: AutomaticPaymentMethods { enabled: true },
        }
    }
}

/// Body of `POST /api/setup-stripe`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntentRequest {
    pub amount: i64,
}

/// Response of `POST /api/setup-stripe`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetupIntentResponse {
    #[serde(rename = "paymentIntents")]
    pub payment_intents: PaymentIntentRecord,
}

/// Header carrying the checkout token on `POST /api/setup-stripe`
pub const CHECKOUT_TOKEN_HEADER: &str = "x-checkout-token";

/// Response of `POST /api/checkout/session`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTokenResponse {
    pub token: String,

    /// RFC 3339 timestamp
    pub expires_at: String,
}

/// Response of `GET /api/config`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub publishable_key: String,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_request_wire_shape() {
        let request = PaymentRequest::new(999, "eur");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "amount": 999,
                "currency": "eur",
                "automatic_payment_methods": { "enabled": true }
            })
        );
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let raw = json!({
            "id": "pi_123",
            "object": "payment_intent",
            "client_secret": "pi_123_secret_abc",
            "status": "requires_payment_method",
            "amount": 999,
            "currency": "eur",
            "livemode": false
        });
        let record: PaymentIntentRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.status, IntentStatus::RequiresPaymentMethod);
        assert_eq!(record.secret().map(ClientSecret::as_str), Some("pi_123_secret_abc"));
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn test_empty_secret_is_absent() {
        let record: PaymentIntentRecord = serde_json::from_value(json!({
            "id": "pi_1",
            "client_secret": "",
            "status": "requires_payment_method"
        }))
        .unwrap();
        assert!(record.secret().is_none());
    }

    #[test]
    fn test_unknown_status() {
        let status: IntentStatus = serde_json::from_value(json!("requires_reauthorization")).unwrap();
        assert_eq!(status, IntentStatus::Unknown);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = ClientSecret::new("pi_1_secret_xyz");
        assert!(!format!("{secret:?}").contains("xyz"));
    }

    #[test]
    fn test_setup_response_key() {
        let response: SetupIntentResponse = serde_json::from_value(json!({
            "paymentIntents": { "id": "pi_1", "status": "succeeded" }
        }))
        .unwrap();
        assert_eq!(response.payment_intents.status, IntentStatus::Succeeded);
    }
}
