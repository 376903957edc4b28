/// GameResult: the immutable record one minigame run hands to the controller.
///
/// Construction is the only place scores are clamped, so a GameResult
/// can never carry an out-of-range score or metric.

use super::category::Category;
use super::classify;

/// Upper bound of the final score scale.
pub const MAX_SCORE: u32 = 200;

/// Upper bound of a breakdown metric.
pub const MAX_METRIC: f64 = 100.0;

/// Clamp a raw score into `[0, MAX_SCORE]`. NaN and infinities become 0.
pub fn clamp_score(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, MAX_SCORE as f64) as u32
}

/// Clamp a raw metric into `[0, MAX_METRIC]`. NaN and infinities become 0.
pub fn clamp_metric(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, MAX_METRIC)
}

/// One named sub-score.
#[derive(Clone, Debug, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

/// Named sub-scores explaining a result. Display order follows insertion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Breakdown {
    metrics: Vec<Metric>,
}

impl Breakdown {
    /// Build from raw entries, clamping every value.
    /// A repeated name keeps its last value.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut metrics: Vec<Metric> = Vec::new();
        for (name, raw) in entries {
            let value = clamp_metric(raw);
            match metrics.iter_mut().find(|m| m.name == name) {
                Some(existing) => existing.value = value,
                None => metrics.push(Metric { name: name.to_string(), value }),
            }
        }
        Breakdown { metrics }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameResult {
    category: Category,
    score: u32,
    profile: String,
    breakdown: Breakdown,
}

impl GameResult {
    /// Seal a run: clamp the score, classify it, and freeze the breakdown.
    pub fn new(category: Category, raw_score: f64, breakdown: Breakdown) -> Self {
        let score = clamp_score(raw_score);
        let profile = classify::classify(category, score).profile.to_string();
        GameResult { category, score, profile, breakdown }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    /// Full classification (visa, band, assessment) of this result.
    pub fn classification(&self) -> classify::Classification {
        classify::classify(self.category, self.score)
    }
}
