//! Mock Intent Collaborator
//!
//! For testing and local development without Stripe credentials.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use checkout_core::{ClientSecret, IntentStatus, PaymentIntentRecord, PaymentRequest};

use crate::error::{PaymentError, Result};
use crate::intent::IntentCollaborator;

#[derive(Clone, Debug)]
enum Behavior {
    Succeed,
    OmitSecret,
    Fail(String),
}

/// Records every request and answers with a canned intent or error
pub struct MockIntentCollaborator {
    behavior: Behavior,
    requests: Mutex<Vec<PaymentRequest>>,
    counter: AtomicU64,
}

impl Default for MockIntentCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIntentCollaborator {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    /// Return records without a client secret
    pub fn without_secret() -> Self {
        Self::with_behavior(Behavior::OmitSecret)
    }

    /// Fail every call with a Stripe error
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl IntentCollaborator for MockIntentCollaborator {
    async fn create_payment_intent(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentIntentRecord> {
        self.requests
            .lock()
            .map_err(|_| PaymentError::Storage("mock request log poisoned".into()))?
            .push(request.clone());

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_mock_{n}");

        let client_secret = match &self.behavior {
            Behavior::Fail(message) => return Err(PaymentError::Stripe(message.clone())),
            Behavior::OmitSecret => None,
            Behavior::Succeed => Some(ClientSecret::new(format!("{id}_secret_{n:08}"))),
        };

        let mut extra = serde_json::Map::new();
        extra.insert("object".into(), "payment_intent".into());
        extra.insert("livemode".into(), false.into());
        extra.insert(
            "automatic_payment_methods".into(),
            serde_json::to_value(request.automatic_payment_methods)?,
        );

        Ok(PaymentIntentRecord {
            id,
            client_secret,
            status: IntentStatus::RequiresPaymentMethod,
            amount: request.amount,
            currency: request.currency.clone(),
            extra,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
