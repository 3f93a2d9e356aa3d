use anyhow::{bail, Result};

use crate::models::pipeline::RecommendedPosition;

pub const MIN_DEFAULT_PERCENT: f64 = 10.0;
pub const MAX_DEFAULT_PERCENT: f64 = 100.0;

/// Decides the `percent` of each job match.
///
/// A usable similarity score is taken as-is (clamped to 0 – 100); anything
/// else receives one uniform default so results stay deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    default_percent: f64,
}

impl ScoringPolicy {
    pub fn uniform(default_percent: f64) -> Result<Self> {
        if !(MIN_DEFAULT_PERCENT..=MAX_DEFAULT_PERCENT).contains(&default_percent) {
            bail!(
                "default match percent must lie between {MIN_DEFAULT_PERCENT} and {MAX_DEFAULT_PERCENT}, got {default_percent}"
            );
        }
        Ok(Self { default_percent })
    }

    pub fn percent_for(&self, position: &RecommendedPosition) -> f64 {
        match position.similarity_score {
            Some(score) if score.is_finite() => score.clamp(0.0, 100.0),
            _ => self.default_percent,
        }
    }
}
