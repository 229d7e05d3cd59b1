//! Checkout Tokens
//!
//! Session binding for intent creation: a browser must hold an unexpired,
//! unused token before the server creates an intent for it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{PaymentError, Result};

/// Opaque checkout token
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutToken(String);

impl CheckoutToken {
    /// Generate a new random token
    pub fn generate() -> Self {
        Self(format!("cs_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Parse from string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CheckoutToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An issued token and its lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: CheckoutToken,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,

    /// Intent created with this token, once known
    pub intent_id: Option<String>,
}

impl TokenGrant {
    fn new(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token: CheckoutToken::generate(),
            issued_at: now,
            expires_at: now + ttl,
            redeemed_at: None,
            intent_id: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn is_redeemed(&self) -> bool {
        self.redeemed_at.is_some()
    }
}

/// Token store trait for persistence
pub trait CheckoutTokenStore: Send + Sync {
    /// Issue a fresh token valid for `ttl`
    fn issue(&self, ttl: Duration) -> Result<TokenGrant>;

    /// Mark a token used; fails if unknown, expired or already used
    fn redeem(&self, token: &CheckoutToken) -> Result<TokenGrant>;

    /// Record the intent a redeemed token produced
    fn bind_intent(&self, token: &CheckoutToken, intent_id: &str) -> Result<()>;

    /// Look up a grant
    fn get(&self, token: &CheckoutToken) -> Result<Option<TokenGrant>>;
}

/// Live grants kept by [`MemoryTokenStore::new`]
const DEFAULT_MAX_GRANTS: usize = 10_000;

/// In-memory token store (for development and single-instance deployments)
///
/// Holds at most `max_grants` unexpired grants; `issue` fails with
/// [`PaymentError::StoreFull`] beyond that.
pub struct MemoryTokenStore {
    grants: RwLock<HashMap<CheckoutToken, TokenGrant>>,
    max_grants: usize,
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::with_max_grants(DEFAULT_MAX_GRANTS)
    }

    pub fn with_max_grants(max_grants: usize) -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
            max_grants,
        }
    }

    /// Number of grants currently held
    pub fn len(&self) -> usize {
        self.grants.read().map_or(0, |grants| grants.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned<E>(_: E) -> PaymentError {
        PaymentError::Storage("token store lock poisoned".into())
    }
}

impl CheckoutTokenStore for MemoryTokenStore {
    fn issue(&self, ttl: Duration) -> Result<TokenGrant> {
        let mut grants = self.grants.write().map_err(Self::poisoned)?;

        // Expired grants are never redeemable again
        grants.retain(|_, grant| !grant.is_expired());

        if grants.len() >= self.max_grants {
            tracing::warn!(live = grants.len(), "Checkout token store full");
            return Err(PaymentError::StoreFull(grants.len()));
        }

        let grant = TokenGrant::new(ttl);
        grants.insert(grant.token.clone(), grant.clone());

        tracing::debug!(token = %grant.token, expires_at = %grant.expires_at, "Issued checkout token");
        Ok(grant)
    }

    fn redeem(&self, token: &CheckoutToken) -> Result<TokenGrant> {
        let mut grants = self.grants.write().map_err(Self::poisoned)?;

        let grant = grants
            .get_mut(token)
            .ok_or_else(|| PaymentError::TokenRejected("unknown token".into()))?;

        if grant.is_expired() {
            return Err(PaymentError::TokenRejected("token expired".into()));
        }
        if grant.is_redeemed() {
            return Err(PaymentError::TokenRejected("token already used".into()));
        }

        grant.redeemed_at = Some(Utc::now());
        Ok(grant.clone())
    }

    fn bind_intent(&self, token: &CheckoutToken, intent_id: &str) -> Result<()> {
        let mut grants = self.grants.write().map_err(Self::poisoned)?;

        if let Some(grant) = grants.get_mut(token) {
            grant.intent_id = Some(intent_id.to_string());
        }

        Ok(())
    }

    fn get(&self, token: &CheckoutToken) -> Result<Option<TokenGrant>> {
        let grants = self.grants.read().map_err(Self::poisoned)?;
        Ok(grants.get(token).cloned())
    }
}
