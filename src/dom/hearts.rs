use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{log, set_timeout, timer_delay, with_rng};
use crate::hearts::{HeartParticle, ParticleField, spawn_particle};
use crate::scheduler::{BurstPlan, SpawnPlan, SpawnSession};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const HEART_PATH: &str =
    "M32 56 C16 44, 2 32, 2 20 A14 14 0 0 1 32 12 A14 14 0 0 1 62 20 C62 32, 48 44, 32 56Z";

/// Hearts field backed by a container element; each heart is a child `div`
/// removed by its own timer.
#[derive(Clone)]
pub struct DomHeartField {
    win: Window,
    doc: Document,
    container: HtmlElement,
}

impl DomHeartField {
    pub fn new(win: Window, doc: Document, container: HtmlElement) -> Self {
        Self { win, doc, container }
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    fn build_heart(&self, heart: &HeartParticle) -> Result<Element, JsValue> {
        let el: HtmlElement = self.doc.create_element("div")?.dyn_into()?;
        el.class_list().add_1("floating-heart")?;
        let style = el.style();
        style.set_property("left", &format!("{}%", heart.left_percent))?;
        style.set_property("--duration", &format!("{}s", heart.duration_s))?;
        style.set_property("--delay", &format!("{}s", heart.delay_s))?;
        style.set_property("--rotate", &format!("{}deg", heart.rotate_deg))?;
        style.set_property("--scale", &format!("{:.2}", heart.scale))?;

        let size = heart.size_px.to_string();
        let svg = self.doc.create_element_ns(Some(SVG_NS), "svg")?;
        svg.set_attribute("viewBox", "0 0 64 64")?;
        svg.set_attribute("width", &size)?;
        svg.set_attribute("height", &size)?;
        let path = self.doc.create_element_ns(Some(SVG_NS), "path")?;
        path.set_attribute("d", HEART_PATH)?;
        path.set_attribute("fill", heart.hue.css())?;
        svg.append_child(&path)?;
        el.append_child(&svg)?;
        Ok(el.into())
    }

    fn try_insert(&self, heart: HeartParticle) -> Result<(), JsValue> {
        let el = self.build_heart(&heart)?;
        self.container.append_child(&el)?;
        // `remove` on a detached node is a no-op.
        set_timeout(&self.win, heart.removal_delay_ms(), move || el.remove())?;
        Ok(())
    }
}

impl ParticleField for DomHeartField {
    fn live_count(&self) -> usize {
        self.container.child_element_count() as usize
    }

    fn insert(&mut self, heart: HeartParticle) {
        if let Err(e) = self.try_insert(heart) {
            log(&format!("heart spawn failed: {e:?}"));
        }
    }
}

/// Burst, then top up on an interval until the session's quota is spent.
pub fn start_spawning(mut field: DomHeartField, plan: SpawnPlan) -> Result<(), JsValue> {
    let win = field.win.clone();
    let session = with_rng(|rng| SpawnSession::start(plan, &mut field, rng));
    if session.is_exhausted() {
        return Ok(());
    }

    let state = Rc::new(RefCell::new((field, session)));
    let handle = Rc::new(RefCell::new(None::<i32>));
    let handle_cb = handle.clone();
    let win_cb = win.clone();
    let closure = Closure::wrap(Box::new(move || {
        let mut st = state.borrow_mut();
        let (field, session) = &mut *st;
        let outcome = with_rng(|rng| session.tick(field, rng));
        if outcome.exhausted {
            if let Some(id) = handle_cb.borrow_mut().take() {
                win_cb.clear_interval_with_handle(id);
            }
            log(&format!("hearts session done: {} spawned", session.spawned()));
        }
    }) as Box<dyn FnMut()>);
    let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        timer_delay(f64::from(plan.interval_ms)),
    )?;
    *handle.borrow_mut() = Some(id);
    closure.forget();
    Ok(())
}

/// Staggered one-shot burst; ignores caps and quotas.
pub fn burst(field: &DomHeartField, plan: BurstPlan) -> Result<(), JsValue> {
    for delay in plan.delays_ms() {
        let mut f = field.clone();
        set_timeout(&field.win, f64::from(delay), move || {
            with_rng(|rng| spawn_particle(&mut f, rng));
        })?;
    }
    Ok(())
}
