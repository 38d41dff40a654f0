//! Sweetheart core crate.
//!
//! A four-screen greeting page (loading, letter, question, celebration) driven from
//! WASM. The animated parts are plain Rust and testable on the host:
//! floating hearts with self-expiring lifetimes, a bounded spawn scheduler, the
//! decline-button evasion controller and a confetti simulation. The `dom` and
//! `app` modules bind them to the browser.

use wasm_bindgen::prelude::*;

mod app;
pub mod config;
pub mod confetti;
pub mod dom;
pub mod evasion;
pub mod flow;
pub mod hearts;
pub mod random;
pub mod scheduler;

pub use config::ExperienceConfig;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Wire up the page with the default timings.
#[wasm_bindgen]
pub fn start_experience() -> Result<(), JsValue> {
    app::start(ExperienceConfig::default())
}

/// Same as [`start_experience`], with a partial JSON config overriding defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_experience_with_config(json: &str) -> Result<(), JsValue> {
    let config = ExperienceConfig::from_json(json)
        .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?;
    app::start(config)
}
