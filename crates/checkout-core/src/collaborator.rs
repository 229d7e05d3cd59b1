//! Payment Collaborator (client side)
//!
//! The capability set the checkout consumes from the payment SDK running in
//! the browser. Implemented over Stripe.js in `checkout-web`.
//!
//! ```text
//! PaymentLoader::load(pk) ──▶ PaymentClient
//!                               ├─ elements(appearance, secret) ──▶ PaymentElements
//!                               │                                      └─ create(kind, opts) ──▶ PaymentField
//!                               │                                                                  └─ mount(target)
//!                               └─ confirm_payment(elements, redirect) ──▶ ConfirmOutcome
//! ```
//!
//! The traits are `?Send`: the browser event loop is single-threaded and the
//! SDK handles are JS objects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::intent::{ClientSecret, IntentStatus};

/// Loads the SDK and returns a ready client handle
#[async_trait(?Send)]
pub trait PaymentLoader {
    type Client: PaymentClient;

    async fn load(&self, publishable_key: &str) -> Result<Self::Client, SdkError>;
}

/// Initialized SDK client
#[async_trait(?Send)]
pub trait PaymentClient: Clone {
    type Elements: PaymentElements;

    /// Create the hosted form group scoped to one intent
    fn elements(
        &self,
        appearance: &Appearance,
        client_secret: &ClientSecret,
    ) -> Result<Self::Elements, SdkError>;

    /// Confirm the intent with the details collected by `elements`
    async fn confirm_payment(
        &self,
        elements: &Self::Elements,
        redirect: RedirectPolicy,
    ) -> ConfirmOutcome;
}

/// Group of hosted fields bound to one client secret
pub trait PaymentElements: Clone {
    type Field: PaymentField;

    fn create(
        &self,
        kind: FieldKind,
        options: &PaymentElementOptions,
    ) -> Result<Self::Field, SdkError>;
}

/// A single hosted field
pub trait PaymentField {
    /// Where the field renders (a DOM node in the browser)
    type Target: ?Sized;

    fn mount(&self, target: &Self::Target) -> Result<(), SdkError>;
}

/// Mount target type for a given client
pub type MountTarget<C> =
    <<<C as PaymentClient>::Elements as PaymentElements>::Field as PaymentField>::Target;

/// Kind of hosted field to create
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Payment,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
        }
    }
}

/// Whether confirmation may navigate away from the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectPolicy {
    /// Only redirect for payment methods that require it
    IfRequired,
}

impl RedirectPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfRequired => "if_required",
        }
    }
}

/// Visual theme of the hosted form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub theme: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            theme: "night".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingDetailsMode {
    #[default]
    Auto,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFields {
    pub billing_details: BillingDetailsMode,
}

/// Options passed when creating the payment field
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentElementOptions {
    pub business: BusinessDetails,
    pub fields: ElementFields,
}

/// Intent as returned by a confirm call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedIntent {
    #[serde(default)]
    pub id: Option<String>,
    pub status: IntentStatus,
}

/// Result of `confirm_payment`: an intent, an error, or both absent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    #[serde(default, rename = "paymentIntent")]
    pub payment_intent: Option<ConfirmedIntent>,

    #[serde(default)]
    pub error: Option<SdkError>,
}

impl ConfirmOutcome {
    pub fn succeeded() -> Self {
        Self::with_status(IntentStatus::Succeeded)
    }

    pub fn with_status(status: IntentStatus) -> Self {
        Self {
            payment_intent: Some(ConfirmedIntent { id: None, status }),
            error: None,
        }
    }

    pub fn failed(error: SdkError) -> Self {
        Self {
            payment_intent: None,
            error: Some(error),
        }
    }

    pub fn status(&self) -> Option<IntentStatus> {
        self.payment_intent.as_ref().map(|pi| pi.status)
    }
}
