//! Timings and tunables for the whole page.

use crate::confetti::ConfettiSettings;
use crate::evasion::EvasionSettings;
use crate::scheduler::{BurstPlan, SpawnPlan};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExperienceConfig {
    pub loading_ms: u32,
    /// Delay before "continue" appears when the reveal animation is disabled.
    pub reveal_fallback_ms: u32,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "idle_hearts"))]
    pub idle_hearts: SpawnPlan,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "question_hearts"))]
    pub question_hearts: SpawnPlan,
    pub celebration_burst: BurstPlan,
    /// Stacking order the idle hearts field is raised to for the burst.
    pub burst_z_index: i32,
    pub evasion: EvasionSettings,
    pub confetti: ConfettiSettings,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            loading_ms: 2_800,
            reveal_fallback_ms: 300,
            idle_hearts: SpawnPlan::IDLE_HEARTS,
            question_hearts: SpawnPlan::QUESTION_HEARTS,
            celebration_burst: BurstPlan::CELEBRATION,
            burst_z_index: 8,
            evasion: EvasionSettings::default(),
            confetti: ConfettiSettings::default(),
        }
    }
}

#[cfg(feature = "serde")]
fn idle_hearts<'de, D: serde::Deserializer<'de>>(d: D) -> Result<SpawnPlan, D::Error> {
    SpawnPlan::deserialize_over(SpawnPlan::IDLE_HEARTS, d)
}

#[cfg(feature = "serde")]
fn question_hearts<'de, D: serde::Deserializer<'de>>(d: D) -> Result<SpawnPlan, D::Error> {
    SpawnPlan::deserialize_over(SpawnPlan::QUESTION_HEARTS, d)
}

#[cfg(feature = "serde_json")]
impl ExperienceConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ExperienceConfig::default();
        assert_eq!(cfg.loading_ms, 2_800);
        assert_eq!(cfg.idle_hearts.quota, 18);
        assert_eq!(cfg.question_hearts.concurrency_cap, 8);
        assert_eq!(cfg.celebration_burst.count, 40);
        assert_eq!(cfg.evasion.danger_radius, 160.0);
        assert_eq!(cfg.confetti.duration_ms, 4_500.0);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ExperienceConfig::from_json(r#"{ "loading_ms": 1000 }"#).unwrap();
        assert_eq!(cfg.loading_ms, 1_000);
        assert_eq!(cfg.idle_hearts, SpawnPlan::IDLE_HEARTS);
        assert!(ExperienceConfig::from_json("not json").is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn test_nested_partial_json_keeps_sibling_defaults() {
        let cfg = ExperienceConfig::from_json(
            r#"{
                "idle_hearts": { "quota": 30 },
                "question_hearts": { "interval_ms": 500 },
                "celebration_burst": { "count": 10 },
                "confetti": { "gravity": 0.2 }
            }"#,
        )
        .unwrap();
        assert_eq!(
            cfg.idle_hearts,
            SpawnPlan {
                quota: 30,
                ..SpawnPlan::IDLE_HEARTS
            }
        );
        assert_eq!(
            cfg.question_hearts,
            SpawnPlan {
                interval_ms: 500,
                ..SpawnPlan::QUESTION_HEARTS
            }
        );
        assert_eq!(cfg.celebration_burst.count, 10);
        assert_eq!(cfg.celebration_burst.stagger_ms, 80);
        assert_eq!(cfg.confetti.duration_ms, 4_500.0);
        assert!(ExperienceConfig::from_json(r#"{ "idle_hearts": { "quota": -1 } }"#).is_err());
    }
}
