//! Application State

use std::sync::Arc;
use std::time::Duration;

use checkout_payments::{CheckoutConfig, CheckoutTokenStore, IntentService};

/// Payment services, present only when Stripe keys are configured
#[derive(Clone)]
pub struct Payments {
    /// Intent creation over the injected collaborator
    pub intents: IntentService,

    pub config: Arc<CheckoutConfig>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payments (optional - None if not configured)
    pub payments: Option<Payments>,

    /// Issued checkout tokens
    pub tokens: Arc<dyn CheckoutTokenStore>,

    pub rate_limit: RateLimit,
}

/// Per-client limit on the checkout routes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// One request is replenished per period
    pub period: Duration,

    /// Requests allowed back to back
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(2),
            burst: 10,
        }
    }
}

impl RateLimit {
    /// Read `CHECKOUT_RATE_PERIOD_MS` and `CHECKOUT_RATE_BURST`
    pub fn from_env() -> anyhow::Result<Self> {
        let mut limit = Self::default();

        if let Ok(ms) = std::env::var("CHECKOUT_RATE_PERIOD_MS") {
            limit.period = Duration::from_millis(ms.parse()?);
        }
        if let Ok(burst) = std::env::var("CHECKOUT_RATE_BURST") {
            limit.burst = burst.parse()?;
        }

        Ok(limit)
    }
}
