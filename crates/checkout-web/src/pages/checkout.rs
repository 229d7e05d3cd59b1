//! Checkout Page

use checkout_core::{
    CheckoutSession, PaymentLoader, SdkError, ViewBody, format_amount,
    view::{PROCESSING_MESSAGE, SUCCESS_MESSAGE},
};
use leptos::{html, prelude::*};

use crate::api;
use crate::components::ErrorBanner;
use crate::stripe_js::{StripeJs, StripeJsLoader};

/// Charge amount in minor units
const CHECKOUT_AMOUNT: i64 = 999;

#[component]
pub fn CheckoutPage() -> impl IntoView {
    // SDK handles are JS objects, so the session lives in local storage
    let session = RwSignal::new_local(CheckoutSession::<StripeJs>::new());
    let target = NodeRef::<html::Div>::new();
    let view_state = Memo::new(move |_| session.with(CheckoutSession::view));
    let currency = RwSignal::new(None::<String>);

    // Load Stripe.js, then fetch an intent and mount the hosted form
    leptos::task::spawn_local(async move {
        let loaded = match api::fetch_config().await {
            Ok(config) => {
                currency.set(Some(config.currency));
                StripeJsLoader::default()
                    .load(&config.publishable_key)
                    .await
            }
            Err(e) => Err(SdkError::new(e.to_string())),
        };
        let ready = loaded.is_ok();
        session.update(|s| s.client_ready(loaded));
        if !ready {
            return;
        }

        let intent = api::request_intent(CHECKOUT_AMOUNT).await;
        let node = target.get_untracked();
        session.update(|s| s.attach_intent(intent, node.as_deref()));
    });

    let submit = move |_| {
        let Some(pending) = session.try_update(CheckoutSession::begin_submit).flatten() else {
            return;
        };
        leptos::task::spawn_local(async move {
            let outcome = pending.confirm().await;
            session.update(|s| s.finish_submit(outcome));
        });
    };

    let banner = move || match view_state.get().body {
        ViewBody::Form { error, .. } => error,
        ViewBody::Unavailable { error } => Some(error),
        ViewBody::Blank | ViewBody::Success => None,
    };
    let showing_form = move || matches!(view_state.get().body, ViewBody::Form { .. });
    let unavailable = move || matches!(view_state.get().body, ViewBody::Unavailable { .. });
    let submit_enabled = move || {
        matches!(
            view_state.get().body,
            ViewBody::Form {
                submit_enabled: true,
                ..
            }
        )
    };

    view! {
        <div class="checkout">
            <Show when=move || view_state.get().processing>
                <h3>{PROCESSING_MESSAGE}</h3>
            </Show>

            <Show when=move || view_state.get().body == ViewBody::Success>
                <h1>{SUCCESS_MESSAGE}</h1>
            </Show>

            <Show when=showing_form>
                {move || {
                    currency.get().map(|code| {
                        view! { <p class="amount">{format_amount(CHECKOUT_AMOUNT, &code)}</p> }
                    })
                }}
                <div node_ref=target></div>
                <ErrorBanner message=Signal::derive(banner) />
                <button on:click=submit disabled=move || !submit_enabled()>
                    "Submit"
                </button>
            </Show>

            <Show when=unavailable>
                <ErrorBanner message=Signal::derive(banner) />
            </Show>
        </div>
    }
}
