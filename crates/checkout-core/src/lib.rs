//! # checkout-core
//!
//! Data model and client-side state machine for an embedded card checkout.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  amount   ┌────────────────┐  create   ┌──────────────┐
//! │ CheckoutPage │──────────▶│ Intent Service │──────────▶│    Stripe    │
//! │   (client)   │◀──────────│    (server)    │◀──────────│ (collaborator)│
//! └──────┬───────┘  secret   └────────────────┘  record   └──────▲───────┘
//!        │ mount hosted form, confirm                            │
//!        └───────────────────────────────────────────────────────┘
//! ```
//!
//! The collaborator's client SDK is reached only through the traits in
//! [`collaborator`], so the state machine in [`session`] runs unchanged
//! against Stripe.js in the browser or a mock in tests.

pub mod collaborator;
pub mod error;
pub mod intent;
pub mod session;
pub mod view;

pub use collaborator::{
    Appearance, ConfirmOutcome, FieldKind, MountTarget, PaymentClient, PaymentElementOptions,
    PaymentElements, PaymentField, PaymentLoader, RedirectPolicy,
};
pub use error::{CheckoutError, Result, SdkError};
pub use intent::{
    CHECKOUT_TOKEN_HEADER, CheckoutTokenResponse, ClientConfig, ClientSecret, IntentStatus,
    PaymentIntentRecord, PaymentRequest, SetupIntentRequest, SetupIntentResponse,
};
pub use session::{CheckoutSession, CheckoutStatus, PendingConfirm};
pub use view::{CheckoutView, ViewBody, format_amount};
