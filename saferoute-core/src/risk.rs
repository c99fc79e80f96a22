//! Ordered risk levels shared by zones, reports and advisories.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Risk classification, ordered from least to most severe.
///
/// The derived ordering is the severity ordering, so `max` picks the more
/// dangerous of two levels.
///
/// # Examples
///
/// ```
/// use saferoute_core::RiskLevel;
///
/// assert!(RiskLevel::Critical > RiskLevel::High);
/// assert_eq!(RiskLevel::Medium.weight(), 2);
/// assert_eq!("Alto".parse::<RiskLevel>(), Ok(RiskLevel::High));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RiskLevel {
    /// No known hazard.
    #[default]
    Low,
    /// Elevated caution advised.
    Medium,
    /// Significant hazard.
    High,
    /// Avoid if at all possible.
    Critical,
}

/// Error returned when a risk label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown risk level {label:?}")]
pub struct ParseRiskLevelError {
    /// The label that failed to parse.
    pub label: String,
}

impl RiskLevel {
    /// Every level in ascending order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Numeric weight used when summing route samples (`1..=4`).
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Lowercase English label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether the level warrants a warning on its own.
    #[must_use]
    pub const fn is_severe(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    /// Parse English labels and the Spanish labels found in legacy data.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "bajo" => Ok(Self::Low),
            "medium" | "medio" => Ok(Self::Medium),
            "high" | "alto" => Ok(Self::High),
            "critical" | "crítico" | "critico" => Ok(Self::Critical),
            _ => Err(ParseRiskLevelError {
                label: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("low", RiskLevel::Low)]
    #[case("MEDIUM", RiskLevel::Medium)]
    #[case(" high ", RiskLevel::High)]
    #[case("Critical", RiskLevel::Critical)]
    #[case("Bajo", RiskLevel::Low)]
    #[case("medio", RiskLevel::Medium)]
    #[case("ALTO", RiskLevel::High)]
    #[case("Crítico", RiskLevel::Critical)]
    #[case("critico", RiskLevel::Critical)]
    fn parses_known_labels(#[case] label: &str, #[case] expected: RiskLevel) {
        assert_eq!(label.parse::<RiskLevel>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_label() {
        let err = "severe".parse::<RiskLevel>().expect_err("unknown label");
        assert_eq!(err.label, "severe");
    }

    #[rstest]
    fn weights_follow_ordering() {
        let weights: Vec<u32> = RiskLevel::ALL.iter().map(|level| level.weight()).collect();
        assert_eq!(weights, vec![1, 2, 3, 4]);
        assert!(RiskLevel::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn display_round_trips_through_parse() {
        for level in RiskLevel::ALL {
            assert_eq!(level.to_string().parse::<RiskLevel>(), Ok(level));
        }
    }

    #[rstest]
    fn only_high_and_critical_are_severe() {
        assert!(!RiskLevel::Low.is_severe());
        assert!(!RiskLevel::Medium.is_severe());
        assert!(RiskLevel::High.is_severe());
        assert!(RiskLevel::Critical.is_severe());
    }
}
