//! stripe-checkout Web Frontend
//!
//! Leptos-based WASM checkout page embedding Stripe's hosted payment form.

mod api;
mod app;
mod components;
mod pages;
mod stripe_js;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
