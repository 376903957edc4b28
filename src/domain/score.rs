/// ScoreAggregator: named counters fed during a run, sealed into a GameResult.
///
/// Counters are plain `f64` sums keyed by static names. Reduction is left to
/// each minigame (its formula lives next to its rules); the aggregator owns the
/// guarded arithmetic and the final clamp.

use std::collections::BTreeMap;

use super::category::Category;
use super::result::{Breakdown, GameResult};

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// quotient is not finite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let q = numerator / denominator;
    if q.is_finite() { q } else { 0.0 }
}

#[derive(Clone, Debug)]
pub struct ScoreAggregator {
    category: Category,
    counters: BTreeMap<&'static str, f64>,
}

impl ScoreAggregator {
    pub fn new(category: Category) -> Self {
        ScoreAggregator { category, counters: BTreeMap::new() }
    }

    /// Add `delta` to a counter. Non-finite deltas are dropped.
    pub fn add(&mut self, name: &'static str, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        *self.counters.entry(name).or_insert(0.0) += delta;
    }

    pub fn incr(&mut self, name: &'static str) {
        self.add(name, 1.0);
    }

    /// Current value of a counter; untouched counters read as 0.
    pub fn get(&self, name: &str) -> f64 {
        self.counters.get(name).copied().unwrap_or(0.0)
    }

    /// Guarded ratio of two counters.
    pub fn ratio_of(&self, numerator: &str, denominator: &str) -> f64 {
        ratio(self.get(numerator), self.get(denominator))
    }

    /// Consume the aggregator and produce the immutable result.
    /// The score is clamped to the score scale, every entry to the metric scale.
    pub fn seal<'a, I>(self, raw_score: f64, entries: I) -> GameResult
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        GameResult::new(self.category, raw_score, Breakdown::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::{MAX_METRIC, MAX_SCORE};
    use proptest::prelude::*;

    #[test]
    fn zero_attempts_ratio_is_zero_not_nan() {
        let agg = ScoreAggregator::new(Category::Clubs);
        let r = agg.ratio_of("syncs", "attempts");
        assert_eq!(r, 0.0);
        assert!(!r.is_nan());
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert_eq!(ratio(3.0, 4.0), 0.75);
    }

    #[test]
    fn counters_accumulate() {
        let mut agg = ScoreAggregator::new(Category::Spades);
        agg.add("hits", 20.0);
        agg.add("hits", -10.0);
        agg.incr("flashes");
        agg.add("hits", f64::NAN);
        assert_eq!(agg.get("hits"), 10.0);
        assert_eq!(agg.get("flashes"), 1.0);
        assert_eq!(agg.get("never"), 0.0);
    }

    #[test]
    fn seal_clamps_everything() {
        let agg = ScoreAggregator::new(Category::Diamonds);
        let r = agg.seal(260.0, [("Logic", 150.0), ("Consistency", -20.0)]);
        assert_eq!(r.score(), MAX_SCORE);
        assert_eq!(r.breakdown().get("Logic"), Some(MAX_METRIC));
        assert_eq!(r.breakdown().get("Consistency"), Some(0.0));
        assert_eq!(r.category(), Category::Diamonds);
    }

    proptest! {
        #[test]
        fn sealed_results_stay_in_bounds(
            raw in prop::num::f64::ANY,
            metrics in prop::collection::vec(prop::num::f64::ANY, 0..6),
        ) {
            let names = ["a", "b", "c", "d", "e", "f"];
            let agg = ScoreAggregator::new(Category::Hearts);
            let r = agg.seal(raw, names.iter().copied().zip(metrics.into_iter()));
            prop_assert!(r.score() <= MAX_SCORE);
            for m in r.breakdown().iter() {
                prop_assert!(m.value >= 0.0 && m.value <= MAX_METRIC);
            }
        }
    }
}
