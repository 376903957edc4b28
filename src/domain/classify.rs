/// Result classification: score → profile label, visa tier, assessment.
///
/// Pure functions over fixed tables. Every threshold lives in this file.
///
/// ## Score bands (all categories, 0–200 scale)
/// ┌──────────────┬────────┬────────────┐
/// │ Score         │ Band   │ Visa bonus │
/// ├──────────────┼────────┼────────────┤
/// │ ≥ 160         │ Top    │ +2 days    │
/// │ ≥ 120         │ High   │ +1 day     │
/// │ ≥ 80          │ Mid    │ ±0         │
/// │ otherwise     │ Low    │ −1 day     │
/// └──────────────┴────────┴────────────┘
///
/// ## Metric grades (breakdown entries, 0–100 scale)
/// ≥ 80 → A, ≥ 60 → B, ≥ 40 → C, otherwise D.

use thiserror::Error;

use super::category::Category;
use super::result::{MAX_METRIC, MAX_SCORE};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("band thresholds must be strictly descending, got {0:?}")]
    NotDescending([u32; 3]),
    #[error("band threshold {threshold} exceeds the scale ceiling {ceiling}")]
    AboveCeiling { threshold: u32, ceiling: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Band {
    Top,
    High,
    Mid,
    Low,
}

impl Band {
    /// Visa day adjustment for this band.
    fn visa_bonus(self) -> i32 {
        match self {
            Band::Top => 2,
            Band::High => 1,
            Band::Mid => 0,
            Band::Low => -1,
        }
    }

    fn slot(self) -> usize {
        match self {
            Band::Top => 0,
            Band::High => 1,
            Band::Mid => 2,
            Band::Low => 3,
        }
    }
}

/// Three descending cut points splitting a scale into four bands.
/// A value equal to a cut point belongs to the higher band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandTable {
    thresholds: [u32; 3],
}

impl BandTable {
    pub fn new(thresholds: [u32; 3], ceiling: u32) -> Result<Self, ClassifyError> {
        if !(thresholds[0] > thresholds[1] && thresholds[1] > thresholds[2]) {
            return Err(ClassifyError::NotDescending(thresholds));
        }
        if thresholds[0] > ceiling {
            return Err(ClassifyError::AboveCeiling { threshold: thresholds[0], ceiling });
        }
        Ok(BandTable { thresholds })
    }

    pub fn band(&self, value: u32) -> Band {
        let [top, high, mid] = self.thresholds;
        if value >= top {
            Band::Top
        } else if value >= high {
            Band::High
        } else if value >= mid {
            Band::Mid
        } else {
            Band::Low
        }
    }
}

/// Cut points on the 0–200 score scale.
pub const SCORE_THRESHOLDS: [u32; 3] = [160, 120, 80];

/// Cut points on the 0–100 metric scale.
pub const GRADE_THRESHOLDS: [u32; 3] = [80, 60, 40];

/// Check the shipped tables. Called once at startup so a bad edit fails
/// before the first screen is drawn.
pub fn validate_tables() -> Result<(), ClassifyError> {
    BandTable::new(SCORE_THRESHOLDS, MAX_SCORE)?;
    BandTable::new(GRADE_THRESHOLDS, MAX_METRIC as u32)?;
    Ok(())
}

fn score_bands() -> BandTable {
    BandTable { thresholds: SCORE_THRESHOLDS }
}

fn grade_bands() -> BandTable {
    BandTable { thresholds: GRADE_THRESHOLDS }
}

// ── Profile labels (Top, High, Mid, Low) ──

fn profile_labels(category: Category) -> [&'static str; 4] {
    match category {
        Category::Spades => [
            "♠ Tactical Master",
            "♠ Focused Operative",
            "♠ Nervous Recruit",
            "♠ Frozen Target",
        ],
        Category::Diamonds => [
            "♦ Unpredictable Genius",
            "♦ Calculated Thinker",
            "♦ Predictable Pattern",
            "♦ Open Book",
        ],
        Category::Hearts => [
            "♥ Trustworthy Leader",
            "♥ Cautious Survivor",
            "♥ Paranoid Betrayer",
            "♥ Emotionally Reactive",
        ],
        Category::Clubs => [
            "♣ Master Collaborator",
            "♣ Team Player",
            "♣ Silent Observer",
            "♣ Lone Wolf",
        ],
    }
}

// ── Visa ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visa {
    pub kind: &'static str,
    pub days: u32,
}

impl Visa {
    pub fn remark(&self) -> &'static str {
        match self.days {
            d if d >= 4 => "Exceptional performance grants extended survival privileges.",
            3 => "Above average results. You've earned your stay.",
            2 => "Minimum requirements met. Prove yourself further.",
            _ => "Barely acceptable. Your time is limited.",
        }
    }
}

fn base_visa(category: Category) -> (&'static str, u32) {
    match category {
        Category::Spades => ("Survivor", 3),
        Category::Diamonds => ("Thinker", 4),
        Category::Hearts => ("Trustbreaker", 2),
        Category::Clubs => ("Harmonizer", 5),
    }
}

// ── Classification ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub band: Band,
    pub profile: &'static str,
    pub visa: Visa,
}

impl Classification {
    /// e.g. "Survivor · 5-DAY VISA"
    pub fn tier_label(&self) -> String {
        format!("{} · {}-DAY VISA", self.visa.kind, self.visa.days)
    }

    pub fn assessment(&self) -> &'static str {
        match self.band {
            Band::Top => "Exceptional performance. You demonstrate the qualities needed to survive in the Borderland. Your mind is both sharp and adaptable.",
            Band::High => "Above average capabilities. You show promise, but the Borderland will test you further. Stay vigilant.",
            Band::Mid => "Standard performance. You have potential, but survival will require growth. Learn from each trial.",
            Band::Low => "Below expectations. The Borderland is unforgiving to those who are unprepared. Consider your weaknesses carefully.",
        }
    }
}

/// Classify a final score. Scores above the ceiling are treated as the ceiling.
pub fn classify(category: Category, score: u32) -> Classification {
    let band = score_bands().band(score.min(MAX_SCORE));
    let (kind, base_days) = base_visa(category);
    let days = (base_days as i32 + band.visa_bonus()).max(1) as u32;
    Classification {
        band,
        profile: profile_labels(category)[band.slot()],
        visa: Visa { kind, days },
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn letter(self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
        }
    }
}

/// Grade of a breakdown metric. Non-finite values grade as D.
pub fn grade(metric: f64) -> Grade {
    if !metric.is_finite() {
        return Grade::D;
    }
    let v = metric.clamp(0.0, MAX_METRIC) as u32;
    match grade_bands().band(v) {
        Band::Top => Grade::A,
        Band::High => Grade::B,
        Band::Mid => Grade::C,
        Band::Low => Grade::D,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shipped_tables_are_valid() {
        assert_eq!(validate_tables(), Ok(()));
    }

    #[test]
    fn malformed_tables_are_rejected() {
        assert_eq!(
            BandTable::new([120, 160, 80], 200),
            Err(ClassifyError::NotDescending([120, 160, 80]))
        );
        assert_eq!(
            BandTable::new([80, 80, 40], 100),
            Err(ClassifyError::NotDescending([80, 80, 40]))
        );
        assert_eq!(
            BandTable::new([260, 120, 80], 200),
            Err(ClassifyError::AboveCeiling { threshold: 260, ceiling: 200 })
        );
    }

    #[test]
    fn boundaries_resolve_to_higher_band() {
        for c in Category::ALL {
            assert_eq!(classify(c, 160).band, Band::Top);
            assert_eq!(classify(c, 159).band, Band::High);
            assert_eq!(classify(c, 120).band, Band::High);
            assert_eq!(classify(c, 119).band, Band::Mid);
            assert_eq!(classify(c, 80).band, Band::Mid);
            assert_eq!(classify(c, 79).band, Band::Low);
            assert_eq!(classify(c, 0).band, Band::Low);
        }
    }

    #[test]
    fn profile_labels_follow_bands() {
        assert_eq!(classify(Category::Spades, 200).profile, "♠ Tactical Master");
        assert_eq!(classify(Category::Diamonds, 130).profile, "♦ Calculated Thinker");
        assert_eq!(classify(Category::Hearts, 80).profile, "♥ Paranoid Betrayer");
        assert_eq!(classify(Category::Clubs, 10).profile, "♣ Lone Wolf");
    }

    #[test]
    fn visa_days_adjust_by_band_with_floor() {
        assert_eq!(classify(Category::Clubs, 170).visa, Visa { kind: "Harmonizer", days: 7 });
        assert_eq!(classify(Category::Spades, 125).visa.days, 4);
        assert_eq!(classify(Category::Diamonds, 90).visa.days, 4);
        // Hearts base is 2, Low band takes one day away.
        assert_eq!(classify(Category::Hearts, 0).visa.days, 1);
        assert_eq!(classify(Category::Hearts, 0).tier_label(), "Trustbreaker · 1-DAY VISA");
    }

    #[test]
    fn grades_cover_metric_scale() {
        assert_eq!(grade(100.0), Grade::A);
        assert_eq!(grade(80.0), Grade::A);
        assert_eq!(grade(79.9), Grade::B);
        assert_eq!(grade(40.0), Grade::C);
        assert_eq!(grade(0.0), Grade::D);
        assert_eq!(grade(f64::NAN), Grade::D);
        assert_eq!(grade(-5.0), Grade::D);
    }

    proptest! {
        #[test]
        fn classification_is_one_of_four_labels(idx in 0usize..4, score in 0u32..=400) {
            let c = Category::from_index(idx).unwrap();
            let result = classify(c, score);
            prop_assert!(profile_labels(c).contains(&result.profile));
            prop_assert!(result.visa.days >= 1);
        }

        #[test]
        fn classification_is_idempotent(idx in 0usize..4, score in 0u32..=200) {
            let c = Category::from_index(idx).unwrap();
            prop_assert_eq!(classify(c, score), classify(c, score));
        }
    }
}
