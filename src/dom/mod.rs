//! Browser glue: element lookup, timers, console logging and the shared RNG.
//! Everything under `dom` needs a real `window` and only runs in wasm.

pub mod confetti;
pub mod evasion;
pub mod hearts;

use std::cell::RefCell;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::evasion::Viewport;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// Run `f` with the page-wide random generator.
pub fn with_rng<T>(f: impl FnOnce(&mut SmallRng) -> T) -> T {
    RNG.with(|rng| f(&mut rng.borrow_mut()))
}

pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document(win: &Window) -> Result<Document, JsValue> {
    win.document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn element<T: JsCast>(doc: &Document, id: &str) -> Result<T, JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has unexpected type")))
}

pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn viewport(win: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport {
        width: dim(win.inner_width()),
        height: dim(win.inner_height()),
    }
}

/// `prefers-reduced-motion: reduce`; any failure of the query means motion is allowed.
pub fn prefers_reduced_motion(win: &Window) -> bool {
    win.match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

/// Browser timer delay; negative and NaN become 0, huge values saturate.
pub fn timer_delay(ms: f64) -> i32 {
    if ms.is_nan() {
        return 0;
    }
    ms.clamp(0.0, i32::MAX as f64) as i32
}

/// One-shot timer. The callback is released by the browser after it fires.
pub fn set_timeout(win: &Window, delay_ms: f64, f: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let cb = Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), timer_delay(delay_ms))
}

pub fn show(el: &HtmlElement) {
    if let Err(e) = el.class_list().remove_1("hidden") {
        log(&format!("show failed: {e:?}"));
    }
}

pub fn hide(el: &HtmlElement) {
    if let Err(e) = el.class_list().add_1("hidden") {
        log(&format!("hide failed: {e:?}"));
    }
}
