use serde::{Deserialize, Serialize};

/// Scores strictly below this cutoff classify as high risk.
pub const HIGH_RISK_BELOW: f64 = -0.5;
/// Scores at or above this cutoff classify as low risk.
pub const LOW_RISK_FROM: f64 = 0.5;

/// Discrete risk tier derived from a resilience score.
///
/// The cutoffs are policy constants, not per-call parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    HighRisk,
    ModerateRisk,
    LowRisk,
}

impl RiskTier {
    /// Half-open tiers: a score of exactly -0.5 is moderate and 0.5 is low.
    pub fn classify(resilience_score: f64) -> Self {
        if resilience_score < HIGH_RISK_BELOW {
            RiskTier::HighRisk
        } else if resilience_score < LOW_RISK_FROM {
            RiskTier::ModerateRisk
        } else {
            RiskTier::LowRisk
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::HighRisk => "High Risk",
            RiskTier::ModerateRisk => "Moderate Risk",
            RiskTier::LowRisk => "Low Risk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_respects_boundaries() {
        assert_eq!(RiskTier::classify(-0.51), RiskTier::HighRisk);
        assert_eq!(RiskTier::classify(-0.5), RiskTier::ModerateRisk);
        assert_eq!(RiskTier::classify(0.0), RiskTier::ModerateRisk);
        assert_eq!(RiskTier::classify(0.49), RiskTier::ModerateRisk);
        assert_eq!(RiskTier::classify(0.5), RiskTier::LowRisk);
        assert_eq!(RiskTier::classify(0.9), RiskTier::LowRisk);
    }

    #[test]
    fn labels_match_published_wording() {
        assert_eq!(RiskTier::classify(-1.0).label(), "High Risk");
        assert_eq!(RiskTier::classify(0.0).label(), "Moderate Risk");
        assert_eq!(RiskTier::classify(1.0).label(), "Low Risk");
    }
}
