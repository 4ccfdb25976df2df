//! Prediction result types.
//!
//! Represents the output of the readmission classifier after thresholding.

use serde::{Deserialize, Serialize};

/// Probability at or above which a patient is flagged as likely readmitted.
pub const READMISSION_THRESHOLD: f64 = 0.5;

/// Binary readmission verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Probability below the threshold
    Unlikely,
    /// Probability at or above the threshold
    Likely,
}

impl Verdict {
    /// Threshold decision, closed on the likely side.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= READMISSION_THRESHOLD {
            Self::Likely
        } else {
            Self::Unlikely
        }
    }

    /// Sentence shown to the operator.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Likely => "Patient is likely to be readmitted within 30 days.",
            Self::Unlikely => "Patient is unlikely to be readmitted within 30 days.",
        }
    }

    /// Whether the verdict should be presented as an alert.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Likely)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Likely => write!(f, "LIKELY"),
            Self::Unlikely => write!(f, "UNLIKELY"),
        }
    }
}

/// One computed prediction. Ephemeral: displayed and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of readmission (0.0 to 1.0)
    pub probability: f64,

    /// Thresholded verdict
    pub verdict: Verdict,

    /// When the prediction was computed
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    /// Create a prediction from the classifier's readmitted-class probability.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            verdict: Verdict::from_probability(probability),
            computed_at: chrono::Utc::now(),
        }
    }

    /// Probability formatted for display.
    #[must_use]
    pub fn formatted_probability(&self) -> String {
        format!("{:.2}", self.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_closed_on_likely_side() {
        assert_eq!(Verdict::from_probability(0.5), Verdict::Likely);
        assert_eq!(Verdict::from_probability(0.499_999), Verdict::Unlikely);
        assert_eq!(Prediction::new(0.50).verdict, Verdict::Likely);
    }

    #[test]
    fn test_threshold_is_monotonic() {
        let mut seen_likely = false;
        for i in 0..=1000 {
            let verdict = Verdict::from_probability(f64::from(i) / 1000.0);
            if seen_likely {
                assert_eq!(verdict, Verdict::Likely, "flipped back at {i}");
            }
            seen_likely |= verdict == Verdict::Likely;
        }
        assert!(seen_likely);
    }

    #[test]
    fn test_formatting() {
        let p = Prediction::new(0.456);
        assert_eq!(p.formatted_probability(), "0.46");
        assert!(!p.verdict.is_alert());
        assert!(Prediction::new(0.9).verdict.description().contains("likely to be"));
    }
}
