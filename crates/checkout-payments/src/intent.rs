//! Intent Service
//!
//! Creates payment intents through an injected collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use checkout_core::{ClientSecret, PaymentIntentRecord, PaymentRequest};

use crate::error::Result;

/// Server-side payment collaborator (Strategy pattern)
///
/// Implemented by [`StripeClient`](crate::StripeClient) and
/// [`MockIntentCollaborator`](crate::MockIntentCollaborator).
#[async_trait]
pub trait IntentCollaborator: Send + Sync {
    /// Create a payment intent and return the collaborator's record
    async fn create_payment_intent(&self, request: &PaymentRequest)
    -> Result<PaymentIntentRecord>;

    /// Collaborator name for logs
    fn name(&self) -> &str;
}

/// A freshly created intent
#[derive(Clone, Debug)]
pub struct CreatedIntent {
    /// Client secret, absent if the collaborator did not return one
    pub secret: Option<ClientSecret>,

    /// The collaborator's record, untouched
    pub raw: PaymentIntentRecord,
}

/// Creates payment intents in a fixed currency
#[derive(Clone)]
pub struct IntentService {
    collaborator: Arc<dyn IntentCollaborator>,
    currency: String,
}

impl IntentService {
    pub fn new(collaborator: Arc<dyn IntentCollaborator>, currency: impl Into<String>) -> Self {
        Self {
            collaborator,
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create an intent for `amount` minor units
    ///
    /// The amount is passed through unchecked; the collaborator rejects
    /// invalid values. Errors are not retried.
    pub async fn create_intent(&self, amount: i64) -> Result<CreatedIntent> {
        let request = PaymentRequest::new(amount, self.currency.clone());

        let record = self
            .collaborator
            .create_payment_intent(&request)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    collaborator = self.collaborator.name(),
                    amount,
                    currency = %self.currency,
                    error = %e,
                    "Payment intent creation failed"
                );
            })?;

        tracing::info!(
            collaborator = self.collaborator.name(),
            intent_id = %record.id,
            amount,
            currency = %self.currency,
            status = %record.status,
            "Created payment intent"
        );

        Ok(CreatedIntent {
            secret: record.secret().cloned(),
            raw: record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::mock::MockIntentCollaborator;

    #[tokio::test]
    async fn test_forwards_amount_and_currency() {
        let mock = Arc::new(MockIntentCollaborator::new());
        let service = IntentService::new(mock.clone(), "eur");

        for amount in [1, 999, 250_000] {
            let created = service.create_intent(amount).await.unwrap();
            assert!(created.secret.as_ref().is_some_and(|s| !s.is_empty()));
            assert_eq!(created.raw.amount, amount);
        }

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1], PaymentRequest::new(999, "eur"));
        assert!(requests.iter().all(|r| r.automatic_payment_methods.enabled));
    }

    #[tokio::test]
    async fn test_collaborator_error_propagates_without_retry() {
        let mock = Arc::new(MockIntentCollaborator::failing("Invalid API Key provided"));
        let service = IntentService::new(mock.clone(), "eur");

        let err = service.create_intent(999).await.unwrap_err();
        assert!(matches!(err, PaymentError::Stripe(ref msg) if msg.contains("Invalid API Key")));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_secret_is_passed_through() {
        let mock = Arc::new(MockIntentCollaborator::without_secret());
        let service = IntentService::new(mock, "usd");

        let created = service.create_intent(500).await.unwrap();
        assert!(created.secret.is_none());
        assert_eq!(created.raw.currency, "usd");
    }
}
