//! Confetti burst simulation.
//!
//! Pieces are launched from around the middle of the canvas, pulled down by a
//! constant per-frame gravity, slowed by drag and spun. The whole run fades out
//! over its final 30% and then clears and hides the canvas. Drawing goes through
//! [`ConfettiSurface`] so frames can be recorded natively.

use rand::Rng;

use crate::random::{random_between, random_index};

pub const CONFETTI_PALETTE: [&str; 10] = [
    "#c084fc", "#f472b6", "#a855f7", "#ec4899", "#e879f9", "#fb7185", "#f9a8d4", "#d946ef",
    "#fbbf24", "#34d399",
];

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConfettiSettings {
    pub particle_count: usize,
    /// Added to vertical velocity every frame.
    pub gravity: f64,
    /// Velocity multiplier per frame.
    pub drag: f64,
    pub duration_ms: f64,
    /// Progress after which pieces fade out.
    pub fade_start: f64,
    /// How long after the nominal end the resize listener is kept.
    pub resize_grace_ms: f64,
}

impl Default for ConfettiSettings {
    fn default() -> Self {
        Self {
            particle_count: 180,
            gravity: 0.12,
            drag: 0.98,
            duration_ms: 4_500.0,
            fade_start: 0.7,
            resize_grace_ms: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfettiPiece {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub w: f64,
    pub h: f64,
    pub color: &'static str,
    /// Degrees.
    pub rotation: f64,
    /// Degrees per frame.
    pub spin: f64,
    pub alpha: f64,
}

impl ConfettiPiece {
    fn launch<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> Self {
        Self {
            x: width / 2.0 + random_between(rng, -80.0, 80.0),
            y: height / 2.0 + random_between(rng, -40.0, 40.0),
            vx: random_between(rng, -12.0, 12.0),
            vy: random_between(rng, -18.0, -4.0),
            w: random_between(rng, 6.0, 12.0),
            h: random_between(rng, 4.0, 8.0),
            color: CONFETTI_PALETTE[random_index(rng, CONFETTI_PALETTE.len())],
            rotation: random_between(rng, 0.0, 360.0),
            spin: random_between(rng, -8.0, 8.0),
            alpha: 1.0,
        }
    }

    fn step(&mut self, gravity: f64, drag: f64) {
        self.vy += gravity;
        self.vx *= drag;
        self.vy *= drag;
        self.x += self.vx;
        self.y += self.vy;
        self.rotation += self.spin;
    }
}

/// Opacity for a given run progress: 1 up to `fade_start`, then linear to 0.
pub fn fade_alpha(progress: f64, fade_start: f64) -> f64 {
    if progress > fade_start {
        (1.0 - (progress - fade_start) / (1.0 - fade_start)).max(0.0)
    } else {
        1.0
    }
}

/// Raster target of a run.
pub trait ConfettiSurface {
    /// Wipe the whole surface at its current size.
    fn clear(&mut self);
    /// Filled rectangle centered on the piece, rotated and blended by its alpha.
    fn draw_piece(&mut self, piece: &ConfettiPiece);
    fn hide(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Finished,
}

#[derive(Debug)]
pub struct ConfettiRun {
    settings: ConfettiSettings,
    pieces: Vec<ConfettiPiece>,
    start_ms: f64,
    finished: bool,
}

impl ConfettiRun {
    pub fn new<R: Rng + ?Sized>(
        settings: ConfettiSettings,
        width: f64,
        height: f64,
        start_ms: f64,
        rng: &mut R,
    ) -> Self {
        let pieces = (0..settings.particle_count)
            .map(|_| ConfettiPiece::launch(width, height, rng))
            .collect();
        Self {
            settings,
            pieces,
            start_ms,
            finished: false,
        }
    }

    pub fn pieces(&self) -> &[ConfettiPiece] {
        &self.pieces
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self, now_ms: f64) -> f64 {
        ((now_ms - self.start_ms) / self.settings.duration_ms).clamp(0.0, 1.0)
    }

    /// Advance and draw one display frame. Once finished, the surface has been
    /// cleared and hidden and further calls draw nothing.
    pub fn frame<S: ConfettiSurface + ?Sized>(&mut self, now_ms: f64, surface: &mut S) -> FrameStatus {
        if self.finished {
            return FrameStatus::Finished;
        }
        let progress = self.progress(now_ms);
        let alpha = fade_alpha(progress, self.settings.fade_start);
        surface.clear();
        for piece in &mut self.pieces {
            piece.step(self.settings.gravity, self.settings.drag);
            piece.alpha = alpha;
            surface.draw_piece(piece);
        }
        if progress < 1.0 {
            return FrameStatus::Running;
        }
        surface.clear();
        surface.hide();
        self.finished = true;
        self.pieces.clear();
        FrameStatus::Finished
    }
}

/// A start was refused because a run is still animating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfettiBusy;

impl std::fmt::Display for ConfettiBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("confetti run already active")
    }
}

impl std::error::Error for ConfettiBusy {}

/// Serializes runs on one canvas: overlapping starts are rejected.
#[derive(Debug, Default)]
pub struct ConfettiGate {
    active: bool,
}

impl ConfettiGate {
    pub fn try_begin(&mut self) -> Result<(), ConfettiBusy> {
        if self.active {
            return Err(ConfettiBusy);
        }
        self.active = true;
        Ok(())
    }

    pub fn release(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
