//! Decline-button evasion.
//!
//! The controller starts disarmed. Arming it (question screen shown) lets pointer
//! triggers relocate the control; the first relocation pulls it out of the
//! normal layout flow (`Idle -> Evading`). Disarming (affirmative answer) turns
//! every trigger into a no-op for the rest of the session.

use rand::Rng;

use crate::random::random_between;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvasionSettings {
    /// Pointer distance from the control center that triggers a move (px).
    pub danger_radius: f64,
    /// Minimum gap kept between the control and every viewport edge (px).
    pub padding: f64,
}

impl Default for EvasionSettings {
    fn default() -> Self {
        Self {
            danger_radius: 160.0,
            padding: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Box of the control, viewport-relative.
///
/// `width`/`height` are the rendered size (after transforms) and locate the
/// center; `layout_width`/`layout_height` are the untransformed size used to
/// keep a relocated control inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub layout_width: f64,
    pub layout_height: f64,
}

impl ControlRect {
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.center();
        (x - cx).hypot(y - cy)
    }
}

/// Pointer events the controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// Pointer moved anywhere in the document.
    PointerMove { x: f64, y: f64 },
    /// Pointer pressed on the control itself.
    PointerDown,
    /// Pointer entered the control's box.
    PointerEnter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvasionPhase {
    Idle,
    Evading,
}

/// New absolute position for the control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Relocation {
    pub x: f64,
    pub y: f64,
    /// First relocation: switch the control to free positioning.
    pub detach_from_flow: bool,
}

#[derive(Debug)]
pub struct EvasionController {
    settings: EvasionSettings,
    phase: EvasionPhase,
    armed: bool,
    relocations: u32,
}

impl EvasionController {
    pub fn new(settings: EvasionSettings) -> Self {
        Self {
            settings,
            phase: EvasionPhase::Idle,
            armed: false,
            relocations: 0,
        }
    }

    pub fn phase(&self) -> EvasionPhase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn relocations(&self) -> u32 {
        self.relocations
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Permanently stop relocating. The phase is kept: a control that already
    /// left the layout flow stays where it was last placed.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Feed one trigger. Returns the new position when the control must move.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        trigger: Trigger,
        control: ControlRect,
        viewport: Viewport,
        rng: &mut R,
    ) -> Option<Relocation> {
        if !self.armed {
            return None;
        }
        let fire = match trigger {
            Trigger::PointerMove { x, y } => control.distance_to(x, y) < self.settings.danger_radius,
            Trigger::PointerDown | Trigger::PointerEnter => true,
        };
        if !fire {
            return None;
        }
        let detach_from_flow = self.phase == EvasionPhase::Idle;
        self.phase = EvasionPhase::Evading;
        self.relocations += 1;
        let (x, y) = relocation_target(
            viewport,
            control.layout_width,
            control.layout_height,
            self.settings.padding,
            rng,
        );
        Some(Relocation {
            x,
            y,
            detach_from_flow,
        })
    }
}

/// Random top-left corner keeping the whole control `padding` away from every
/// viewport edge. A viewport too small for that clamps to `padding`.
pub fn relocation_target<R: Rng + ?Sized>(
    viewport: Viewport,
    width: f64,
    height: f64,
    padding: f64,
    rng: &mut R,
) -> (f64, f64) {
    let max_x = viewport.width - width - padding;
    let max_y = viewport.height - height - padding;
    let x = random_between(rng, 0.0, max_x).max(padding);
    let y = random_between(rng, 0.0, max_y).max(padding);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    const VIEW: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    fn rect_at(left: f64, top: f64) -> ControlRect {
        ControlRect {
            left,
            top,
            width: 80.0,
            height: 40.0,
            layout_width: 80.0,
            layout_height: 40.0,
        }
    }

    #[test]
    fn test_disarmed_ignores_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctl = EvasionController::new(EvasionSettings::default());
        assert!(!ctl.is_armed());
        assert!(ctl.handle(Trigger::PointerDown, rect_at(100.0, 100.0), VIEW, &mut rng).is_none());
        assert_eq!(ctl.phase(), EvasionPhase::Idle);
    }

    #[test]
    fn test_first_relocation_detaches() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctl = EvasionController::new(EvasionSettings::default());
        ctl.arm();
        let first = ctl
            .handle(Trigger::PointerEnter, rect_at(100.0, 100.0), VIEW, &mut rng)
            .unwrap();
        assert!(first.detach_from_flow);
        assert_eq!(ctl.phase(), EvasionPhase::Evading);
        let second = ctl
            .handle(Trigger::PointerDown, rect_at(first.x, first.y), VIEW, &mut rng)
            .unwrap();
        assert!(!second.detach_from_flow);
        assert_eq!(ctl.phase(), EvasionPhase::Evading);
        assert_eq!(ctl.relocations(), 2);
    }

    #[test]
    fn test_pointer_move_respects_danger_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctl = EvasionController::new(EvasionSettings::default());
        ctl.arm();
        let rect = rect_at(460.0, 380.0); // center (500, 400)
        let far = Trigger::PointerMove { x: 500.0, y: 560.0 };
        assert!(ctl.handle(far, rect, VIEW, &mut rng).is_none());
        let near = Trigger::PointerMove { x: 500.0, y: 559.0 };
        assert!(ctl.handle(near, rect, VIEW, &mut rng).is_some());
    }

    #[test]
    fn test_disarm_keeps_phase() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctl = EvasionController::new(EvasionSettings::default());
        ctl.arm();
        ctl.handle(Trigger::PointerDown, rect_at(0.0, 0.0), VIEW, &mut rng);
        ctl.disarm();
        assert!(!ctl.is_armed());
        assert_eq!(ctl.phase(), EvasionPhase::Evading);
        let touch = Trigger::PointerMove { x: 40.0, y: 20.0 };
        assert!(ctl.handle(touch, rect_at(0.0, 0.0), VIEW, &mut rng).is_none());
        assert_eq!(ctl.relocations(), 1);
    }

    #[test]
    fn test_center_uses_rendered_size_and_bounds_use_layout_size() {
        let mut high = StepRng::new(u64::MAX, 0);
        let mut ctl = EvasionController::new(EvasionSettings::default());
        ctl.arm();
        // Scaled up to twice its layout size.
        let rect = ControlRect {
            left: 100.0,
            top: 100.0,
            width: 160.0,
            height: 80.0,
            layout_width: 80.0,
            layout_height: 40.0,
        };
        assert_eq!(rect.center(), (180.0, 140.0));
        let near = Trigger::PointerMove { x: 180.0, y: 299.0 };
        let to = ctl.handle(near, rect, VIEW, &mut high).unwrap();
        assert!(to.x > 899.0 && to.x < 900.0);
        assert!(to.y > 739.0 && to.y < 740.0);
    }

    #[test]
    fn test_relocation_target_extremes() {
        let mut low = StepRng::new(0, 0);
        assert_eq!(relocation_target(VIEW, 80.0, 40.0, 20.0, &mut low), (20.0, 20.0));
        let mut high = StepRng::new(u64::MAX, 0);
        let (x, y) = relocation_target(VIEW, 80.0, 40.0, 20.0, &mut high);
        assert!(x < 900.0 && x > 899.0);
        assert!(y < 740.0 && y > 739.0);
    }

    #[test]
    fn test_tiny_viewport_clamps_to_padding() {
        let mut high = StepRng::new(u64::MAX, 0);
        let tiny = Viewport {
            width: 90.0,
            height: 50.0,
        };
        assert_eq!(relocation_target(tiny, 80.0, 40.0, 20.0, &mut high), (20.0, 20.0));
    }
}
