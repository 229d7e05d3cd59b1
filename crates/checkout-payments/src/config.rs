//! Checkout Configuration
//!
//! Read from the environment (`.env` is loaded by the server binary).

use crate::error::{PaymentError, Result};

const DEFAULT_CURRENCY: &str = "eur";
const DEFAULT_TOKEN_TTL_SECS: i64 = 900;
const MOCK_PUBLISHABLE_KEY: &str = "pk_test_mock";

/// Which intent collaborator the server talks to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollaboratorKind {
    #[default]
    Stripe,
    /// In-process mock, no Stripe account needed
    Mock,
}

/// Keys and settings for the checkout flow
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Server-only Stripe secret key
    pub secret_key: String,

    /// Client-safe Stripe publishable key
    pub publishable_key: String,

    /// Lowercase ISO 4217 code every intent is created in
    pub currency: String,

    /// Lifetime of an issued checkout token
    pub token_ttl: chrono::Duration,

    pub collaborator: CollaboratorKind,
}

impl CheckoutConfig {
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            currency: DEFAULT_CURRENCY.into(),
            token_ttl: chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            collaborator: CollaboratorKind::Stripe,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create from a variable lookup
    ///
    /// With `CHECKOUT_COLLABORATOR=mock` the Stripe keys are optional.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let collaborator = match var("CHECKOUT_COLLABORATOR").as_deref() {
            None | Some("stripe") => CollaboratorKind::Stripe,
            Some("mock") => CollaboratorKind::Mock,
            Some(other) => {
                return Err(PaymentError::Config(format!(
                    "Unknown CHECKOUT_COLLABORATOR: {other}"
                )));
            }
        };

        let (secret_key, publishable_key) = match collaborator {
            CollaboratorKind::Stripe => (
                var("STRIPE_SECRET_KEY")
                    .ok_or_else(|| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?,
                var("STRIPE_PUBLISHABLE_KEY").ok_or_else(|| {
                    PaymentError::Config("STRIPE_PUBLISHABLE_KEY not set".into())
                })?,
            ),
            CollaboratorKind::Mock => (
                var("STRIPE_SECRET_KEY").unwrap_or_default(),
                var("STRIPE_PUBLISHABLE_KEY").unwrap_or_else(|| MOCK_PUBLISHABLE_KEY.into()),
            ),
        };

        let mut config = Self::new(secret_key, publishable_key);
        config.collaborator = collaborator;

        if let Some(currency) = var("CHECKOUT_CURRENCY") {
            config.currency = normalize_currency(&currency)?;
        }

        if let Some(ttl) = var("CHECKOUT_TOKEN_TTL_SECS") {
            let secs: i64 = ttl.parse().map_err(|_| {
                PaymentError::Config(format!("CHECKOUT_TOKEN_TTL_SECS is not a number: {ttl}"))
            })?;
            config.token_ttl = chrono::Duration::seconds(secs);
        }

        Ok(config)
    }
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("secret_key", &"***")
            .field("publishable_key", &self.publishable_key)
            .field("currency", &self.currency)
            .field("token_ttl", &self.token_ttl)
            .field("collaborator", &self.collaborator)
            .finish()
    }
}

/// Lowercase a three-letter currency code
fn normalize_currency(code: &str) -> Result<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(PaymentError::Config(format!("Invalid currency code: {code}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::new("sk_test_1", "pk_test_1");
        assert_eq!(config.currency, "eur");
        assert_eq!(config.token_ttl.num_seconds(), 900);
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_stripe_requires_keys() {
        let err = CheckoutConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: STRIPE_SECRET_KEY not set");

        let config = CheckoutConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_1"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_1"),
            ("CHECKOUT_CURRENCY", "USD"),
            ("CHECKOUT_TOKEN_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.collaborator, CollaboratorKind::Stripe);
        assert_eq!(config.currency, "usd");
        assert_eq!(config.token_ttl.num_seconds(), 60);
    }

    #[test]
    fn test_mock_runs_without_keys() {
        let config =
            CheckoutConfig::from_lookup(lookup(&[("CHECKOUT_COLLABORATOR", "mock")])).unwrap();
        assert_eq!(config.collaborator, CollaboratorKind::Mock);
        assert_eq!(config.publishable_key, "pk_test_mock");
        assert!(config.secret_key.is_empty());

        let unknown = lookup(&[("CHECKOUT_COLLABORATOR", "paypal")]);
        assert!(CheckoutConfig::from_lookup(unknown).is_err());
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency(" EUR ").unwrap(), "eur");
        assert!(normalize_currency("euro").is_err());
        assert!(normalize_currency("e1r").is_err());
    }

    #[test]
    fn test_debug_hides_secret_key() {
        let config = CheckoutConfig::new("sk_test_hidden", "pk_test_1");
        assert!(!format!("{config:?}").contains("sk_test_hidden"));
    }
}
