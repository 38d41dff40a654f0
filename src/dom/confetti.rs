use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, Window};

use super::{hide, log, now_ms, set_timeout, show, viewport, with_rng};
use crate::confetti::{ConfettiGate, ConfettiPiece, ConfettiRun, ConfettiSettings, ConfettiSurface, FrameStatus};

/// 2D canvas target for a confetti run.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D context not available"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    fn fit(&self, win: &Window) {
        fit_canvas(&self.canvas, win);
    }
}

fn fit_canvas(canvas: &HtmlCanvasElement, win: &Window) {
    let view = viewport(win);
    canvas.set_width(view.width as u32);
    canvas.set_height(view.height as u32);
}

impl ConfettiSurface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn draw_piece(&mut self, p: &ConfettiPiece) {
        let ctx = &self.ctx;
        ctx.save();
        let placed = ctx
            .translate(p.x, p.y)
            .and_then(|_| ctx.rotate(p.rotation * PI / 180.0));
        if placed.is_ok() {
            ctx.set_global_alpha(p.alpha);
            ctx.set_fill_style(&JsValue::from_str(p.color));
            ctx.fill_rect(-p.w / 2.0, -p.h / 2.0, p.w, p.h);
        }
        ctx.restore();
    }

    fn hide(&mut self) {
        hide(&self.canvas);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Show the canvas and animate one run on it. A start while another run is
/// still animating is logged and ignored.
pub fn launch(
    win: &Window,
    canvas: HtmlCanvasElement,
    settings: ConfettiSettings,
    gate: Rc<RefCell<ConfettiGate>>,
) -> Result<(), JsValue> {
    if let Err(busy) = gate.borrow_mut().try_begin() {
        log(&format!("confetti start ignored: {busy}"));
        return Ok(());
    }
    let surface = match CanvasSurface::new(canvas.clone()) {
        Ok(s) => s,
        Err(e) => {
            gate.borrow_mut().release();
            return Err(e);
        }
    };
    show(&canvas);
    surface.fit(win);

    let run = with_rng(|rng| {
        ConfettiRun::new(
            settings,
            canvas.width() as f64,
            canvas.height() as f64,
            now_ms(),
            rng,
        )
    });

    // Track viewport size while the run lasts, plus a short grace period.
    let on_resize = {
        let (canvas, win) = (canvas.clone(), win.clone());
        Closure::wrap(Box::new(move |_e: Event| fit_canvas(&canvas, &win)) as Box<dyn FnMut(Event)>)
    };
    win.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    {
        let win_cb = win.clone();
        set_timeout(
            win,
            settings.duration_ms + settings.resize_grace_ms,
            move || {
                if let Err(e) = win_cb
                    .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
                {
                    log(&format!("resize listener removal failed: {e:?}"));
                }
                drop(on_resize);
            },
        )?;
    }

    start_frame_loop(win, run, surface, gate);
    Ok(())
}

fn start_frame_loop(
    win: &Window,
    mut run: ConfettiRun,
    mut surface: CanvasSurface,
    gate: Rc<RefCell<ConfettiGate>>,
) -> Weak<RefCell<Option<Closure<dyn FnMut(f64)>>>> {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    let win_cb = win.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        match run.frame(ts, &mut surface) {
            FrameStatus::Running => {
                if let Some(cb) = f.borrow().as_ref() {
                    let _ = win_cb.request_animation_frame(cb.as_ref().unchecked_ref());
                }
            }
            FrameStatus::Finished => {
                gate.borrow_mut().release();
                // Break the self-reference once this call has returned.
                let slot = f.clone();
                if let Err(e) = set_timeout(&win_cb, 0.0, move || drop(slot.borrow_mut().take())) {
                    log(&format!("frame loop cleanup failed: {e:?}"));
                }
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
    }
    Rc::downgrade(&g)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::dom::{document, window};
    use rand::rngs::mock::StepRng;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn sleep(win: &Window, ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        });
        let _ = JsFuture::from(promise).await;
    }

    #[wasm_bindgen_test]
    async fn finished_loop_frees_its_callback() {
        let win = window().unwrap();
        let doc = document(&win).unwrap();
        let canvas: HtmlCanvasElement = doc.create_element("canvas").unwrap().dyn_into().unwrap();
        let surface = CanvasSurface::new(canvas).unwrap();
        let settings = ConfettiSettings {
            particle_count: 5,
            duration_ms: 40.0,
            ..ConfettiSettings::default()
        };
        let run = ConfettiRun::new(settings, 300.0, 200.0, now_ms(), &mut StepRng::new(0, 0));
        let gate = Rc::new(RefCell::new(ConfettiGate::default()));
        gate.borrow_mut().try_begin().unwrap();

        let slot = start_frame_loop(&win, run, surface, gate.clone());
        assert!(slot.upgrade().is_some());
        sleep(&win, 500).await;
        assert!(!gate.borrow().is_active());
        assert!(slot.upgrade().is_none());
    }
}
