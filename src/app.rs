//! Page wiring: looks up the screens, feeds UI events into [`ScreenFlow`] and
//! performs the effects it returns.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Event, HtmlCanvasElement, HtmlElement, Window};

use crate::config::ExperienceConfig;
use crate::confetti::ConfettiGate;
use crate::dom::evasion::EvasionBinding;
use crate::dom::hearts::{DomHeartField, burst, start_spawning};
use crate::dom::{self, element, hide, log, prefers_reduced_motion, set_timeout, show};
use crate::evasion::EvasionController;
use crate::flow::{Effect, FlowEvent, ScreenFlow};

struct Elements {
    overlay: HtmlElement,
    main_content: HtmlElement,
    open_btn: HtmlElement,
    letter_card: HtmlElement,
    hearts_field: HtmlElement,
    next_btn: HtmlElement,
    question_screen: HtmlElement,
    yes_btn: HtmlElement,
    no_btn: HtmlElement,
    question_buttons: HtmlElement,
    celebrate_msg: HtmlElement,
    confetti_canvas: HtmlCanvasElement,
    question_hearts_field: HtmlElement,
}

impl Elements {
    fn lookup(doc: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            overlay: element(doc, "loading-overlay")?,
            main_content: element(doc, "main-content")?,
            open_btn: element(doc, "open-letter-btn")?,
            letter_card: element(doc, "letter-card")?,
            hearts_field: element(doc, "hearts-field")?,
            next_btn: element(doc, "next-btn")?,
            question_screen: element(doc, "question-screen")?,
            yes_btn: element(doc, "yes-btn")?,
            no_btn: element(doc, "no-btn")?,
            question_buttons: element(doc, "question-buttons")?,
            celebrate_msg: element(doc, "celebrate-msg")?,
            confetti_canvas: element(doc, "confetti-canvas")?,
            question_hearts_field: element(doc, "question-hearts-field")?,
        })
    }
}

struct App {
    win: Window,
    doc: Document,
    config: ExperienceConfig,
    el: Elements,
    flow: ScreenFlow,
    evasion: Rc<RefCell<EvasionController>>,
    evasion_binding: Option<EvasionBinding>,
    confetti_gate: Rc<RefCell<ConfettiGate>>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

pub fn start(config: ExperienceConfig) -> Result<(), JsValue> {
    let win = dom::window()?;
    let doc = dom::document(&win)?;
    let el = Elements::lookup(&doc)?;
    let reduced = prefers_reduced_motion(&win);
    log(&format!("sweetheart: start (reduced motion: {reduced})"));

    on_click(&el.open_btn, FlowEvent::OpenLetter)?;
    on_click(&el.next_btn, FlowEvent::Continue)?;
    on_click(&el.yes_btn, FlowEvent::Affirm)?;
    once(&el.letter_card, "animationend", || dispatch(FlowEvent::RevealFinished))?;

    let loading_ms = f64::from(config.loading_ms);
    let app = App {
        evasion: Rc::new(RefCell::new(EvasionController::new(config.evasion))),
        evasion_binding: None,
        confetti_gate: Rc::new(RefCell::new(ConfettiGate::default())),
        flow: ScreenFlow::new(reduced),
        win: win.clone(),
        doc,
        config,
        el,
    };
    APP.with(|cell| cell.replace(Some(app)));

    set_timeout(&win, loading_ms, || dispatch(FlowEvent::LoadingElapsed))?;
    Ok(())
}

fn on_click(target: &HtmlElement, event: FlowEvent) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_e: Event| dispatch(event)) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn once(target: &HtmlElement, event: &str, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let opts = AddEventListenerOptions::new();
    opts.set_once(true);
    let cb = Closure::once_into_js(f);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        cb.unchecked_ref(),
        &opts,
    )
}

/// Run a flow event. Effects are applied after the state borrow is released
/// so that callbacks they install may dispatch again.
fn dispatch(event: FlowEvent) {
    let effects = APP.with(|cell| match cell.borrow_mut().as_mut() {
        Some(app) => app.flow.handle(event),
        None => Vec::new(),
    });
    if !effects.is_empty() {
        log(&format!("sweetheart: {event:?} -> {effects:?}"));
    }
    for effect in effects {
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                if let Err(e) = apply(app, effect) {
                    log(&format!("sweetheart: {effect:?} failed: {e:?}"));
                }
            }
        });
    }
}

fn apply(app: &mut App, effect: Effect) -> Result<(), JsValue> {
    let el = &app.el;
    match effect {
        Effect::DismissLoading => {
            el.overlay.class_list().add_1("fade-out")?;
            let overlay = el.overlay.clone();
            once(&el.overlay, "transitionend", move || hide(&overlay))?;
            show(&el.main_content);
        }
        Effect::RevealLetter => {
            el.open_btn.class_list().add_1("btn-hide")?;
            show(&el.letter_card);
            el.letter_card.class_list().add_1("reveal")?;
        }
        Effect::ScheduleRevealFallback => {
            set_timeout(&app.win, f64::from(app.config.reveal_fallback_ms), || {
                dispatch(FlowEvent::RevealFinished)
            })?;
        }
        Effect::StartIdleHearts => {
            let field = DomHeartField::new(app.win.clone(), app.doc.clone(), el.hearts_field.clone());
            start_spawning(field, app.config.idle_hearts)?;
        }
        Effect::ShowContinue => {
            show(&el.next_btn);
            el.next_btn.class_list().add_1("show")?;
            el.next_btn.focus()?;
        }
        Effect::ShowQuestion => {
            hide(&el.main_content);
            show(&el.question_screen);
            el.yes_btn.focus()?;
        }
        Effect::ArmEvasion => {
            let binding = EvasionBinding::attach(&app.win, &app.doc, &el.no_btn, app.evasion.clone())?;
            app.evasion_binding = Some(binding);
        }
        Effect::StartQuestionHearts => {
            let field = DomHeartField::new(
                app.win.clone(),
                app.doc.clone(),
                el.question_hearts_field.clone(),
            );
            start_spawning(field, app.config.question_hearts)?;
        }
        Effect::DisarmEvasion => match app.evasion_binding.take() {
            Some(binding) => binding.detach()?,
            None => app.evasion.borrow_mut().disarm(),
        },
        Effect::ShowCelebration => {
            hide(&el.question_buttons);
            show(&el.celebrate_msg);
        }
        Effect::LaunchConfetti => {
            dom::confetti::launch(
                &app.win,
                el.confetti_canvas.clone(),
                app.config.confetti,
                app.confetti_gate.clone(),
            )?;
        }
        Effect::BurstHearts => {
            el.hearts_field
                .style()
                .set_property("z-index", &app.config.burst_z_index.to_string())?;
            let field = DomHeartField::new(app.win.clone(), app.doc.clone(), el.hearts_field.clone());
            burst(&field, app.config.celebration_burst)?;
        }
    }
    Ok(())
}
