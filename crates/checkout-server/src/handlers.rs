//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use checkout_core::{
    CHECKOUT_TOKEN_HEADER, CheckoutTokenResponse, ClientConfig, SetupIntentRequest,
    SetupIntentResponse,
};
use checkout_payments::{CheckoutToken, PaymentError};

use crate::state::{AppState, Payments};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn payments(state: &AppState) -> Result<&Payments, ApiError> {
    state.payments.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.payments.is_some(),
    })
}

/// Publishable key and currency for the frontend
pub async fn client_config(State(state): State<AppState>) -> Result<Json<ClientConfig>, ApiError> {
    let payments = payments(&state)?;

    Ok(Json(ClientConfig {
        publishable_key: payments.config.publishable_key.clone(),
        currency: payments.intents.currency().to_string(),
    }))
}

/// Issue a checkout token that authorizes one intent creation
pub async fn create_checkout_session(
    State(state): State<AppState>,
) -> Result<Json<CheckoutTokenResponse>, ApiError> {
    let payments = payments(&state)?;

    let grant = state
        .tokens
        .issue(payments.config.token_ttl)
        .map_err(|e| match e {
            PaymentError::StoreFull(_) => {
                tracing::warn!("Refusing checkout session: {}", e);
                api_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    e.user_message(),
                    "SESSION_LIMIT",
                )
            }
            other => {
                tracing::error!("Token store error: {}", other);
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    other.user_message(),
                    "SESSION_ERROR",
                )
            }
        })?;

    Ok(Json(CheckoutTokenResponse {
        token: grant.token.to_string(),
        expires_at: grant.expires_at.to_rfc3339(),
    }))
}

/// Create a payment intent and return the collaborator's record
pub async fn setup_stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SetupIntentRequest>,
) -> Result<Json<SetupIntentResponse>, ApiError> {
    let payments = payments(&state)?;

    let token = headers
        .get(CHECKOUT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(CheckoutToken::from_string)
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "Missing checkout token",
                "MISSING_TOKEN",
            )
        })?;

    state.tokens.redeem(&token).map_err(|e| match e {
        PaymentError::TokenRejected(ref reason) => {
            tracing::warn!(%token, reason = %reason, "Checkout token rejected");
            api_error(StatusCode::FORBIDDEN, e.user_message(), "INVALID_TOKEN")
        }
        other => {
            tracing::error!("Token store error: {}", other);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                other.user_message(),
                "SESSION_ERROR",
            )
        }
    })?;

    let created = payments
        .intents
        .create_intent(payload.amount)
        .await
        .map_err(|e| {
            tracing::error!("Intent error: {}", e);
            api_error(StatusCode::BAD_GATEWAY, e.user_message(), "INTENT_ERROR")
        })?;

    if let Err(e) = state.tokens.bind_intent(&token, &created.raw.id) {
        tracing::warn!(%token, "Could not record intent for token: {}", e);
    }

    Ok(Json(SetupIntentResponse {
        payment_intents: created.raw,
    }))
}
