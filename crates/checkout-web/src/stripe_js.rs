//! Stripe.js Collaborator
//!
//! wasm-bindgen bindings to Stripe.js v3 and the `checkout_core`
//! collaborator traits implemented over them.

use async_trait::async_trait;
use checkout_core::{
    Appearance, ClientSecret, ConfirmOutcome, FieldKind, PaymentClient, PaymentElementOptions,
    PaymentElements, PaymentField, PaymentLoader, RedirectPolicy, SdkError,
};
use serde::Serialize;
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::JsFuture;

const STRIPE_JS_URL: &str = "https://js.stripe.com/v3/";

#[wasm_bindgen]
extern "C" {
    /// Raw Stripe.js client handle
    #[wasm_bindgen(js_name = Stripe)]
    #[derive(Debug, Clone)]
    pub type JsStripe;

    /// Raw Elements group handle
    #[wasm_bindgen(js_name = Elements)]
    #[derive(Debug, Clone)]
    pub type JsElements;

    /// Raw Payment Element handle
    #[wasm_bindgen(js_name = PaymentElement)]
    #[derive(Debug, Clone)]
    pub type JsPaymentElement;

    /// `Stripe("pk_...")`
    #[wasm_bindgen(catch, js_name = Stripe, js_namespace = window)]
    fn new_stripe(publishable_key: &str) -> Result<JsStripe, JsValue>;

    /// `stripe.elements({ appearance, clientSecret })`
    #[wasm_bindgen(method, catch, js_name = elements)]
    fn elements(this: &JsStripe, options: &JsValue) -> Result<JsElements, JsValue>;

    /// `elements.create("payment", options)`
    #[wasm_bindgen(method, catch, js_name = create)]
    fn create(this: &JsElements, kind: &str, options: &JsValue)
    -> Result<JsPaymentElement, JsValue>;

    /// `paymentElement.mount(node)`
    #[wasm_bindgen(method, catch, js_name = mount)]
    fn mount(this: &JsPaymentElement, target: &web_sys::Element) -> Result<(), JsValue>;

    /// `stripe.confirmPayment({ elements, redirect })`
    #[wasm_bindgen(method, catch, js_name = confirmPayment)]
    fn confirm_payment(this: &JsStripe, options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Best-effort conversion of a thrown JS value into an SDK error
fn js_error(value: JsValue) -> SdkError {
    if let Ok(err) = serde_wasm_bindgen::from_value::<SdkError>(value.clone()) {
        return err;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return SdkError::new(String::from(err.message()));
    }
    SdkError::new(
        value
            .as_string()
            .unwrap_or_else(|| "Unknown payment library error".into()),
    )
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, SdkError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| SdkError::new(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementsOptions<'a> {
    appearance: &'a Appearance,
    client_secret: &'a str,
}

/// Injects the Stripe.js script once and creates clients
#[derive(Clone, Debug)]
pub struct StripeJsLoader {
    script_url: &'static str,
}

impl Default for StripeJsLoader {
    fn default() -> Self {
        Self {
            script_url: STRIPE_JS_URL,
        }
    }
}

impl StripeJsLoader {
    /// Resolve once `window.Stripe` exists, loading the script if needed
    async fn ensure_script(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        if js_sys::Reflect::has(&window, &JsValue::from_str("Stripe"))? {
            return Ok(());
        }

        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let script: web_sys::HtmlScriptElement =
            document.create_element("script")?.dyn_into()?;
        script.set_src(self.script_url);

        let loaded = js_sys::Promise::new(&mut |resolve, reject| {
            script.set_onload(Some(&resolve));
            script.set_onerror(Some(&reject));
        });

        document
            .head()
            .ok_or_else(|| JsValue::from_str("no document head"))?
            .append_child(&script)?;

        JsFuture::from(loaded)
            .await
            .map_err(|_| JsValue::from_str("Stripe.js failed to load"))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl PaymentLoader for StripeJsLoader {
    type Client = StripeJs;

    async fn load(&self, publishable_key: &str) -> Result<StripeJs, SdkError> {
        self.ensure_script().await.map_err(js_error)?;
        new_stripe(publishable_key).map(StripeJs).map_err(js_error)
    }
}

/// Initialized Stripe.js client
#[derive(Clone, Debug)]
pub struct StripeJs(JsStripe);

#[derive(Clone, Debug)]
pub struct StripeElements(JsElements);

#[derive(Debug)]
pub struct StripePaymentElement(JsPaymentElement);

impl StripeJs {
    fn confirm_options(
        elements: &StripeElements,
        redirect: RedirectPolicy,
    ) -> Result<js_sys::Object, JsValue> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"elements".into(), &elements.0)?;
        js_sys::Reflect::set(&options, &"redirect".into(), &redirect.as_str().into())?;
        Ok(options)
    }
}

#[async_trait(?Send)]
impl PaymentClient for StripeJs {
    type Elements = StripeElements;

    fn elements(
        &self,
        appearance: &Appearance,
        client_secret: &ClientSecret,
    ) -> Result<StripeElements, SdkError> {
        let options = to_js(&ElementsOptions {
            appearance,
            client_secret: client_secret.as_str(),
        })?;
        self.0.elements(&options).map(StripeElements).map_err(js_error)
    }

    async fn confirm_payment(
        &self,
        elements: &StripeElements,
        redirect: RedirectPolicy,
    ) -> ConfirmOutcome {
        let promise = match Self::confirm_options(elements, redirect)
            .and_then(|options| self.0.confirm_payment(&options))
        {
            Ok(promise) => promise,
            Err(e) => return ConfirmOutcome::failed(js_error(e)),
        };

        match JsFuture::from(promise).await {
            Ok(result) => serde_wasm_bindgen::from_value(result)
                .unwrap_or_else(|e| ConfirmOutcome::failed(SdkError::new(e.to_string()))),
            Err(e) => ConfirmOutcome::failed(js_error(e)),
        }
    }
}

impl PaymentElements for StripeElements {
    type Field = StripePaymentElement;

    fn create(
        &self,
        kind: FieldKind,
        options: &PaymentElementOptions,
    ) -> Result<StripePaymentElement, SdkError> {
        let options = to_js(options)?;
        self.0
            .create(kind.as_str(), &options)
            .map(StripePaymentElement)
            .map_err(js_error)
    }
}

impl PaymentField for StripePaymentElement {
    type Target = web_sys::HtmlElement;

    fn mount(&self, target: &web_sys::HtmlElement) -> Result<(), SdkError> {
        self.0.mount(target).map_err(js_error)
    }
}
