//! # checkout-payments
//!
//! Server side of the checkout: payment intent creation and the session
//! binding step that gates it.
//!
//! ## Flow
//!
//! ```text
//! POST /api/checkout/session ──▶ CheckoutTokenStore::issue
//! POST /api/setup-stripe     ──▶ CheckoutTokenStore::redeem
//!                            ──▶ IntentService::create_intent
//!                            ──▶ IntentCollaborator (Stripe)
//! ```
//!
//! The collaborator is injected into [`IntentService`] as a trait object, so
//! the Stripe client is built once per process and tests swap in
//! [`MockIntentCollaborator`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_payments::{CheckoutConfig, IntentService, StripeClient};
//!
//! let config = CheckoutConfig::from_env()?;
//! let service = IntentService::new(
//!     Arc::new(StripeClient::new(&config.secret_key)),
//!     config.currency.clone(),
//! );
//!
//! let created = service.create_intent(999).await?;
//! // hand created.raw back to the browser
//! ```

mod config;
mod error;
mod intent;
mod mock;
mod stripe_client;
mod token;

pub use config::{CheckoutConfig, CollaboratorKind};
pub use error::{PaymentError, Result};
pub use intent::{CreatedIntent, IntentCollaborator, IntentService};
pub use mock::MockIntentCollaborator;
pub use stripe_client::StripeClient;
pub use token::{CheckoutToken, CheckoutTokenStore, MemoryTokenStore, TokenGrant};
