//! API Client

use checkout_core::{
    CHECKOUT_TOKEN_HEADER, CheckoutError, CheckoutTokenResponse, ClientConfig,
    PaymentIntentRecord, SetupIntentRequest, SetupIntentResponse,
};
use serde::de::DeserializeOwned;

/// Absolute URL for an API path (reqwest needs a base in the browser)
fn endpoint(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

/// Read a JSON body, turning non-2xx statuses into network errors
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CheckoutError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        let message = data["error"]
            .as_str()
            .map_or_else(|| format!("Request failed ({status})"), str::to_string);
        Err(CheckoutError::Network(message))
    }
}

/// Fetch the publishable key and currency
pub async fn fetch_config() -> Result<ClientConfig, CheckoutError> {
    let response = reqwest::Client::new()
        .get(endpoint("/api/config"))
        .send()
        .await
        .map_err(|e| CheckoutError::Network(e.to_string()))?;

    read_json(response).await
}

/// Obtain a checkout token, then create an intent for `amount`
pub async fn request_intent(amount: i64) -> Result<PaymentIntentRecord, CheckoutError> {
    let client = reqwest::Client::new();

    let response = client
        .post(endpoint("/api/checkout/session"))
        .send()
        .await
        .map_err(|e| CheckoutError::Network(e.to_string()))?;
    let session: CheckoutTokenResponse = read_json(response).await?;

    let response = client
        .post(endpoint("/api/setup-stripe"))
        .header(CHECKOUT_TOKEN_HEADER, session.token)
        .json(&SetupIntentRequest { amount })
        .send()
        .await
        .map_err(|e| CheckoutError::Network(e.to_string()))?;
    let data: SetupIntentResponse = read_json(response).await?;

    Ok(data.payment_intents)
}
