//! Bounded spawning of hearts into a [`ParticleField`].
//!
//! A [`SpawnSession`] fires an initial burst, then is ticked on a fixed period by
//! its owner (a browser interval in the DOM layer, a loop in tests). Each tick
//! tops the field up by at most one heart while it is below the concurrency cap,
//! and the session reports exhaustion on the tick that reaches its quota so the
//! owner can cancel the repeating trigger. Hearts already alive are untouched.

use rand::Rng;

use crate::hearts::{ParticleField, spawn_particle};

/// Parameters of one ambient heart session.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnPlan {
    pub burst: u32,
    pub quota: u32,
    pub interval_ms: u32,
    pub concurrency_cap: usize,
}

impl SpawnPlan {
    /// Hearts behind the open letter.
    pub const IDLE_HEARTS: SpawnPlan = SpawnPlan {
        burst: 6,
        quota: 18,
        interval_ms: 600,
        concurrency_cap: 12,
    };

    /// Hearts behind the proposal question.
    pub const QUESTION_HEARTS: SpawnPlan = SpawnPlan {
        burst: 4,
        quota: 14,
        interval_ms: 900,
        concurrency_cap: 8,
    };

    /// Deserialize a plan whose missing keys are taken from `base`.
    #[cfg(feature = "serde")]
    pub fn deserialize_over<'de, D>(base: SpawnPlan, deserializer: D) -> Result<SpawnPlan, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let patch = <SpawnPlanPatch as serde::Deserialize>::deserialize(deserializer)?;
        Ok(SpawnPlan {
            burst: patch.burst.unwrap_or(base.burst),
            quota: patch.quota.unwrap_or(base.quota),
            interval_ms: patch.interval_ms.unwrap_or(base.interval_ms),
            concurrency_cap: patch.concurrency_cap.unwrap_or(base.concurrency_cap),
        })
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct SpawnPlanPatch {
    burst: Option<u32>,
    quota: Option<u32>,
    interval_ms: Option<u32>,
    concurrency_cap: Option<usize>,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub spawned: bool,
    /// Quota reached; the repeating trigger must be cancelled now.
    pub exhausted: bool,
}

#[derive(Debug)]
pub struct SpawnSession {
    plan: SpawnPlan,
    spawned: u32,
    ticks: u32,
}

impl SpawnSession {
    /// Fire the initial burst (clamped to the quota) and return the session.
    pub fn start<F, R>(plan: SpawnPlan, field: &mut F, rng: &mut R) -> Self
    where
        F: ParticleField + ?Sized,
        R: Rng + ?Sized,
    {
        let burst = plan.burst.min(plan.quota);
        for _ in 0..burst {
            spawn_particle(field, rng);
        }
        Self {
            plan,
            spawned: burst,
            ticks: 0,
        }
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_exhausted(&self) -> bool {
        self.spawned >= self.plan.quota
    }

    /// One period of the repeating trigger. Reading the live count and
    /// spawning happen in the same call, so the cap is never overshot.
    pub fn tick<F, R>(&mut self, field: &mut F, rng: &mut R) -> TickOutcome
    where
        F: ParticleField + ?Sized,
        R: Rng + ?Sized,
    {
        if self.is_exhausted() {
            return TickOutcome {
                spawned: false,
                exhausted: true,
            };
        }
        self.ticks += 1;
        let spawned = field.live_count() < self.plan.concurrency_cap;
        if spawned {
            spawn_particle(field, rng);
            self.spawned += 1;
        }
        TickOutcome {
            spawned,
            exhausted: self.is_exhausted(),
        }
    }
}

/// One-shot staggered burst used at the celebration. No cap, no quota.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BurstPlan {
    pub count: u32,
    pub stagger_ms: u32,
}

impl Default for BurstPlan {
    fn default() -> Self {
        Self::CELEBRATION
    }
}

impl BurstPlan {
    pub const CELEBRATION: BurstPlan = BurstPlan {
        count: 40,
        stagger_ms: 80,
    };

    /// Delay of each heart from the start of the burst.
    pub fn delays_ms(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.count).map(move |i| i * self.stagger_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hearts::{HeartParticle, TimedField};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Field whose live count is fixed by the test.
    struct PinnedField {
        live: usize,
        inserted: usize,
    }

    impl ParticleField for PinnedField {
        fn live_count(&self) -> usize {
            self.live
        }
        fn insert(&mut self, _heart: HeartParticle) {
            self.inserted += 1;
        }
    }

    #[test]
    fn test_start_spawns_burst() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = TimedField::new();
        let session = SpawnSession::start(SpawnPlan::QUESTION_HEARTS, &mut field, &mut rng);
        assert_eq!(session.spawned(), 4);
        assert_eq!(field.live_count(), 4);
        assert!(!session.is_exhausted());
    }

    #[test]
    fn test_tick_holds_at_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = PinnedField { live: 0, inserted: 0 };
        let mut session = SpawnSession::start(SpawnPlan::IDLE_HEARTS, &mut field, &mut rng);
        field.live = 12;
        for _ in 0..10 {
            let out = session.tick(&mut field, &mut rng);
            assert!(!out.spawned);
            assert!(!out.exhausted);
        }
        assert_eq!(field.inserted, 6);
        assert_eq!(session.ticks(), 10);
        field.live = 11;
        assert!(session.tick(&mut field, &mut rng).spawned);
        assert_eq!(session.spawned(), 7);
    }

    #[test]
    fn test_exhausts_on_quota_tick() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = PinnedField { live: 0, inserted: 0 };
        let mut session = SpawnSession::start(SpawnPlan::QUESTION_HEARTS, &mut field, &mut rng);
        let mut last = None;
        for i in 0..10 {
            let out = session.tick(&mut field, &mut rng);
            assert!(out.spawned);
            assert_eq!(out.exhausted, i == 9);
            last = Some(out);
        }
        assert_eq!(last.map(|o| o.exhausted), Some(true));
        let after = session.tick(&mut field, &mut rng);
        assert_eq!(after, TickOutcome { spawned: false, exhausted: true });
        assert_eq!(field.inserted, 14);
    }

    #[test]
    fn test_burst_larger_than_quota_is_clamped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = PinnedField { live: 0, inserted: 0 };
        let plan = SpawnPlan {
            burst: 10,
            quota: 3,
            interval_ms: 100,
            concurrency_cap: 50,
        };
        let session = SpawnSession::start(plan, &mut field, &mut rng);
        assert_eq!(field.inserted, 3);
        assert!(session.is_exhausted());
    }

    #[test]
    fn test_burst_delays() {
        let delays: Vec<u32> = BurstPlan { count: 4, stagger_ms: 80 }.delays_ms().collect();
        assert_eq!(delays, vec![0, 80, 160, 240]);
        assert_eq!(BurstPlan::CELEBRATION.delays_ms().last(), Some(39 * 80));
    }
}
