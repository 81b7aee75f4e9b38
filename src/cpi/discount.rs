//! Discrete rent-discount tiers derived from the CPI score.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discount band a score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscountTier {
    /// Best band: 5% off rent.
    Tier1,
    Tier2,
    Tier3,
    /// No discount.
    None,
}

impl DiscountTier {
    /// Fraction of rent discounted for this tier.
    pub fn fraction(self) -> f64 {
        match self {
            Self::Tier1 => 0.05,
            Self::Tier2 => 0.02,
            Self::Tier3 => 0.005,
            Self::None => 0.0,
        }
    }

    /// Report label, e.g. `"Tier 2 (2%)"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "Tier 1 (5%)",
            Self::Tier2 => "Tier 2 (2%)",
            Self::Tier3 => "Tier 3 (0.5%)",
            Self::None => "None",
        }
    }

    /// All tiers, best first.
    pub const ALL: [DiscountTier; 4] = [Self::Tier1, Self::Tier2, Self::Tier3, Self::None];
}

impl fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum scores for tiers 1, 2 and 3.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSchedule {
    /// 90 / 70 / 50.
    #[default]
    Current,
    /// 90 / 75 / 60.
    Legacy,
}

impl TierSchedule {
    /// Lower score bounds `[tier1, tier2, tier3]`.
    pub fn thresholds(self) -> [u8; 3] {
        match self {
            Self::Current => [90, 70, 50],
            Self::Legacy => [90, 75, 60],
        }
    }

    /// Maps a score to its tier.
    pub fn tier_for(self, score: u8) -> DiscountTier {
        let [t1, t2, t3] = self.thresholds();
        if score >= t1 {
            DiscountTier::Tier1
        } else if score >= t2 {
            DiscountTier::Tier2
        } else if score >= t3 {
            DiscountTier::Tier3
        } else {
            DiscountTier::None
        }
    }

    /// Maps a score to its discount fraction.
    pub fn discount_for(self, score: u8) -> f64 {
        self.tier_for(score).fraction()
    }
}

/// Discount fraction for a score under the current 90/70/50 schedule.
///
/// # Examples
///
/// ```
/// use verdant::cpi::discount::discount_for_score;
///
/// assert_eq!(discount_for_score(90), 0.05);
/// assert_eq!(discount_for_score(49), 0.0);
/// ```
pub fn discount_for_score(score: u8) -> f64 {
    TierSchedule::Current.discount_for(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_at_current_boundaries() {
        assert!(discount_for_score(89) < discount_for_score(90));
        assert!(discount_for_score(69) < discount_for_score(70));
        assert!(discount_for_score(49) < discount_for_score(50));
    }

    #[test]
    fn constant_within_bands() {
        for s in 90..=100 {
            assert_eq!(discount_for_score(s), 0.05);
        }
        for s in 70..90 {
            assert_eq!(discount_for_score(s), 0.02);
        }
        for s in 50..70 {
            assert_eq!(discount_for_score(s), 0.005);
        }
        for s in 0..50 {
            assert_eq!(discount_for_score(s), 0.0);
        }
    }

    #[test]
    fn discount_is_non_decreasing_in_score() {
        for s in 0..100u8 {
            assert!(discount_for_score(s) <= discount_for_score(s + 1));
        }
    }

    #[test]
    fn legacy_schedule_boundaries() {
        let legacy = TierSchedule::Legacy;
        assert_eq!(legacy.tier_for(90), DiscountTier::Tier1);
        assert_eq!(legacy.tier_for(89), DiscountTier::Tier2);
        assert_eq!(legacy.tier_for(75), DiscountTier::Tier2);
        assert_eq!(legacy.tier_for(74), DiscountTier::Tier3);
        assert_eq!(legacy.tier_for(60), DiscountTier::Tier3);
        assert_eq!(legacy.tier_for(59), DiscountTier::None);
        // 70 is Tier 2 now but Tier 3 under the legacy cuts.
        assert_eq!(TierSchedule::Current.tier_for(70), DiscountTier::Tier2);
        assert_eq!(legacy.tier_for(70), DiscountTier::Tier3);
    }

    #[test]
    fn labels_match_fractions() {
        for tier in DiscountTier::ALL {
            let pct = tier.fraction() * 100.0;
            if tier != DiscountTier::None {
                assert!(tier.label().contains(&format!("({pct}%)")), "{tier}");
            }
        }
    }
}
