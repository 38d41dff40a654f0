use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, PointerEvent, Window};

use super::{log, viewport, with_rng};
use crate::evasion::{ControlRect, EvasionController, Relocation, Trigger};

/// Listeners attached to the decline control while the question is shown.
/// Owns the document move callback, so it must live until [`EvasionBinding::detach`].
pub struct EvasionBinding {
    doc: Document,
    controller: Rc<RefCell<EvasionController>>,
    pointer_move: Closure<dyn FnMut(PointerEvent)>,
}

fn control_rect(button: &HtmlElement) -> ControlRect {
    let rect = button.get_bounding_client_rect();
    ControlRect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
        layout_width: button.offset_width() as f64,
        layout_height: button.offset_height() as f64,
    }
}

fn apply(button: &HtmlElement, to: Relocation) -> Result<(), JsValue> {
    if to.detach_from_flow {
        button.class_list().add_1("evading")?;
    }
    let style = button.style();
    style.set_property("left", &format!("{}px", to.x))?;
    style.set_property("top", &format!("{}px", to.y))?;
    Ok(())
}

/// Feed one trigger to the controller and move the control if asked.
/// Returns whether the control moved.
fn dispatch(
    win: &Window,
    button: &HtmlElement,
    controller: &RefCell<EvasionController>,
    trigger: Trigger,
) -> bool {
    let rect = control_rect(button);
    let view = viewport(win);
    let moved = with_rng(|rng| controller.borrow_mut().handle(trigger, rect, view, rng));
    match moved {
        Some(to) => {
            if let Err(e) = apply(button, to) {
                log(&format!("evasion move failed: {e:?}"));
            }
            true
        }
        None => false,
    }
}

impl EvasionBinding {
    /// Arm the controller and hook pointer move (document), down and enter (control).
    pub fn attach(
        win: &Window,
        doc: &Document,
        button: &HtmlElement,
        controller: Rc<RefCell<EvasionController>>,
    ) -> Result<Self, JsValue> {
        controller.borrow_mut().arm();

        let pointer_move = {
            let (win, button, ctl) = (win.clone(), button.clone(), controller.clone());
            Closure::wrap(Box::new(move |evt: PointerEvent| {
                let trigger = Trigger::PointerMove {
                    x: evt.client_x() as f64,
                    y: evt.client_y() as f64,
                };
                dispatch(&win, &button, &ctl, trigger);
            }) as Box<dyn FnMut(PointerEvent)>)
        };
        doc.add_event_listener_with_callback("pointermove", pointer_move.as_ref().unchecked_ref())?;

        {
            let (win, btn, ctl) = (win.clone(), button.clone(), controller.clone());
            let closure = Closure::wrap(Box::new(move |evt: PointerEvent| {
                if dispatch(&win, &btn, &ctl, Trigger::PointerDown) {
                    evt.prevent_default();
                }
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let (win, btn, ctl) = (win.clone(), button.clone(), controller.clone());
            let closure = Closure::wrap(Box::new(move |_evt: PointerEvent| {
                dispatch(&win, &btn, &ctl, Trigger::PointerEnter);
            }) as Box<dyn FnMut(_)>);
            button.add_event_listener_with_callback("pointerenter", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(Self {
            doc: doc.clone(),
            controller,
            pointer_move,
        })
    }

    /// Disarm and remove the document-wide move listener. Down/enter listeners
    /// stay attached but the disarmed controller ignores them.
    pub fn detach(self) -> Result<(), JsValue> {
        self.controller.borrow_mut().disarm();
        self.doc.remove_event_listener_with_callback(
            "pointermove",
            self.pointer_move.as_ref().unchecked_ref(),
        )
    }
}
