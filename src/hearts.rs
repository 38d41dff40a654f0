//! Floating heart particles.
//!
//! A heart is a transient element with randomized motion parameters that removes
//! itself once its CSS animation has certainly finished. The engine is written
//! against the [`ParticleField`] trait: the browser implementation appends a DOM
//! node and arms a one-shot timer, while [`TimedField`] keeps explicit expiry
//! timestamps and is driven by a caller-supplied clock.

use rand::Rng;

use crate::random::{coin, random_between};

/// Extra time a heart stays attached after its animation can have finished.
pub const REMOVAL_MARGIN_MS: f64 = 200.0;

/// The two heart fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartHue {
    Lilac,
    Pink,
}

impl HeartHue {
    pub const ALL: [HeartHue; 2] = [HeartHue::Lilac, HeartHue::Pink];

    pub fn css(self) -> &'static str {
        match self {
            HeartHue::Lilac => "#c084fc",
            HeartHue::Pink => "#f472b6",
        }
    }
}

/// Randomized visual parameters of one heart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartParticle {
    pub left_percent: f64,
    pub size_px: f64,
    pub duration_s: f64,
    pub delay_s: f64,
    pub rotate_deg: f64,
    /// Rounded to two decimals.
    pub scale: f64,
    pub hue: HeartHue,
}

impl HeartParticle {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let size_px = random_between(rng, 18.0, 34.0);
        let left_percent = random_between(rng, 5.0, 95.0);
        let duration_s = random_between(rng, 5.0, 9.0);
        let delay_s = random_between(rng, 0.0, 1.5);
        let rotate_deg = random_between(rng, -40.0, 40.0);
        let scale = random_between(rng, 60.0, 120.0).round() / 100.0;
        let hue = if coin(rng) { HeartHue::Lilac } else { HeartHue::Pink };
        Self {
            left_percent,
            size_px,
            duration_s,
            delay_s,
            rotate_deg,
            scale,
            hue,
        }
    }

    /// Time from insertion to removal: animation, delay and the safety margin.
    pub fn removal_delay_ms(&self) -> f64 {
        (self.duration_s + self.delay_s) * 1000.0 + REMOVAL_MARGIN_MS
    }
}

/// A container that hearts are spawned into.
pub trait ParticleField {
    /// Hearts currently attached.
    fn live_count(&self) -> usize;
    /// Attach a heart and arrange its removal after [`HeartParticle::removal_delay_ms`].
    fn insert(&mut self, heart: HeartParticle);
}

/// Create one heart with fresh random parameters and hand it to `field`.
pub fn spawn_particle<F, R>(field: &mut F, rng: &mut R)
where
    F: ParticleField + ?Sized,
    R: Rng + ?Sized,
{
    field.insert(HeartParticle::sample(rng));
}

/// Heart tracked by a [`TimedField`].
#[derive(Clone, Debug)]
pub struct TimedHeart {
    pub heart: HeartParticle,
    pub born_ms: f64,
    pub expires_ms: f64,
}

/// In-memory field where each heart carries its expiry timestamp.
///
/// Time only moves through [`TimedField::advance_to`]; every heart is removed
/// exactly once, at the first advance that reaches its expiry.
#[derive(Debug, Default)]
pub struct TimedField {
    now_ms: f64,
    live: Vec<TimedHeart>,
    spawned: usize,
}

impl TimedField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn live(&self) -> &[TimedHeart] {
        &self.live
    }

    /// Move the clock forward and return the hearts that expired on the way,
    /// in expiry order.
    pub fn advance_to(&mut self, now_ms: f64) -> Vec<TimedHeart> {
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
        let now = self.now_ms;
        let mut expired = Vec::new();
        self.live.retain(|h| {
            if h.expires_ms <= now {
                expired.push(h.clone());
                false
            } else {
                true
            }
        });
        expired.sort_by(|a, b| a.expires_ms.total_cmp(&b.expires_ms));
        expired
    }
}

impl ParticleField for TimedField {
    fn live_count(&self) -> usize {
        self.live.len()
    }

    fn insert(&mut self, heart: HeartParticle) {
        self.spawned += 1;
        self.live.push(TimedHeart {
            heart,
            born_ms: self.now_ms,
            expires_ms: self.now_ms + heart.removal_delay_ms(),
        });
    }
}
