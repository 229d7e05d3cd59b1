//! Render Model
//!
//! Pure projection of the session state onto what the checkout shows.

use crate::error::CheckoutError;
use crate::session::CheckoutStatus;

pub const PROCESSING_MESSAGE: &str = "PROCESSING PAYMENT...";
pub const SUCCESS_MESSAGE: &str = "Payment succeeded!";

/// Currencies Stripe charges in whole units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

/// Display an amount in minor units, e.g. `999` `"eur"` as `9.99 EUR`
pub fn format_amount(amount: i64, currency: &str) -> String {
    let code = currency.to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.to_ascii_lowercase().as_str()) {
        return format!("{amount} {code}");
    }

    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02} {code}", abs / 100, abs % 100)
}

/// Main body of the checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewBody {
    /// Payment library still loading
    Blank,

    /// Mount target, optional error banner and submit control
    Form {
        error: Option<String>,
        submit_enabled: bool,
    },

    Success,

    /// Payment library failed to load
    Unavailable { error: String },
}

/// Everything the component renders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutView {
    /// Show the processing indicator
    pub processing: bool,
    pub body: ViewBody,
}

impl CheckoutView {
    pub fn derive(status: CheckoutStatus, error: Option<&CheckoutError>, loading: bool) -> Self {
        let body = match status {
            CheckoutStatus::Uninitialized => ViewBody::Blank,
            CheckoutStatus::WaitingForUser => ViewBody::Form {
                error: error.map(ToString::to_string),
                submit_enabled: !loading,
            },
            CheckoutStatus::Succeeded => ViewBody::Success,
            CheckoutStatus::Failed => ViewBody::Unavailable {
                error: error.map_or_else(
                    || "Payment form could not be loaded".to_string(),
                    ToString::to_string,
                ),
            },
        };

        Self {
            processing: loading,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_overlays_form() {
        let view = CheckoutView::derive(CheckoutStatus::WaitingForUser, None, true);
        assert!(view.processing);
        assert_eq!(
            view.body,
            ViewBody::Form {
                error: None,
                submit_enabled: false
            }
        );
    }

    #[test]
    fn test_error_banner_text() {
        let err = CheckoutError::NotReady;
        let view = CheckoutView::derive(CheckoutStatus::WaitingForUser, Some(&err), false);
        assert_eq!(
            view.body,
            ViewBody::Form {
                error: Some("Instance or Element not ready".into()),
                submit_enabled: true
            }
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(999, "eur"), "9.99 EUR");
        assert_eq!(format_amount(5, "usd"), "0.05 USD");
        assert_eq!(format_amount(999, "jpy"), "999 JPY");
    }

    #[test]
    fn test_success_hides_form() {
        let view = CheckoutView::derive(CheckoutStatus::Succeeded, None, false);
        assert!(!view.processing);
        assert_eq!(view.body, ViewBody::Success);
    }
}
