//! Per-transport-mode time and risk estimates.

use std::fmt;

use thiserror::Error;

use crate::RiskLevel;

/// Motorcycles are assumed this much faster than cars through traffic.
pub const DEFAULT_MOTORCYCLE_FACTOR: f64 = 0.85;
/// Cycling speed in km/h.
pub const BICYCLE_SPEED_KMH: f64 = 15.0;
/// Walking speed in km/h.
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// Float noise tolerated before flooring to whole minutes.
const MINUTE_EPSILON: f64 = 1e-9;

/// Travel-time multipliers applied to motorised modes per risk level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskMultipliers {
    /// Multiplier for [`RiskLevel::Low`].
    pub low: f64,
    /// Multiplier for [`RiskLevel::Medium`].
    pub medium: f64,
    /// Multiplier for [`RiskLevel::High`].
    pub high: f64,
    /// Multiplier for [`RiskLevel::Critical`].
    pub critical: f64,
}

impl Default for RiskMultipliers {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.15,
            high: 1.3,
            critical: 1.5,
        }
    }
}

impl RiskMultipliers {
    /// Multiplier for `level`.
    #[must_use]
    pub const fn for_level(&self, level: RiskLevel) -> f64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
            RiskLevel::Critical => self.critical,
        }
    }
}

/// Ways of travelling a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransportMode {
    /// Private car.
    Car,
    /// Motorcycle.
    Motorcycle,
    /// Bicycle.
    Bicycle,
    /// On foot.
    Walking,
}

impl TransportMode {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Bicycle => "bicycle",
            Self::Walking => "walking",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Car => "Fastest route",
            Self::Motorcycle => "Nimble in traffic",
            Self::Bicycle => "Healthy and eco-friendly",
            Self::Walking => "For short distances",
        }
    }

    const fn is_eco_friendly(self) -> bool {
        matches!(self, Self::Bicycle | Self::Walking)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimate for one transport mode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransportOption {
    /// Transport mode.
    pub mode: TransportMode,
    /// Estimated travel time in whole minutes, rounded down.
    pub minutes: u32,
    /// Risk exposure for this mode.
    pub risk: RiskLevel,
    /// Short human description.
    pub description: String,
    /// Whether the mode is emission-free.
    pub eco_friendly: bool,
}

/// Errors returned by [`TransportEstimator::estimate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Distance was zero, negative, or not finite.
    #[error("distance must be finite and positive, got {value} km")]
    InvalidDistance {
        /// Rejected value.
        value: f64,
    },
    /// Duration was zero, negative, or not finite.
    #[error("duration must be finite and positive, got {value} min")]
    InvalidDuration {
        /// Rejected value.
        value: f64,
    },
}

/// Translates a route's distance and duration into per-mode estimates.
///
/// # Examples
///
/// ```
/// use saferoute_core::{RiskLevel, TransportEstimator, TransportMode};
///
/// let options = TransportEstimator::default()
///     .estimate(10.0, 20.0, RiskLevel::High)
///     .expect("valid inputs");
/// assert_eq!(options[0].mode, TransportMode::Car);
/// assert_eq!(options[0].minutes, 26);
/// assert_eq!(options[2].minutes, 40);
/// assert_eq!(options[2].risk, RiskLevel::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportEstimator {
    multipliers: RiskMultipliers,
    motorcycle_factor: f64,
}

impl Default for TransportEstimator {
    fn default() -> Self {
        Self::new(RiskMultipliers::default())
    }
}

impl TransportEstimator {
    /// Create an estimator with the given multiplier table.
    #[must_use]
    pub const fn new(multipliers: RiskMultipliers) -> Self {
        Self {
            multipliers,
            motorcycle_factor: DEFAULT_MOTORCYCLE_FACTOR,
        }
    }

    /// Override the motorcycle factor.
    #[must_use]
    pub fn with_motorcycle_factor(mut self, factor: f64) -> Self {
        self.motorcycle_factor = factor;
        self
    }

    /// Active multiplier table.
    #[must_use]
    pub const fn multipliers(&self) -> &RiskMultipliers {
        &self.multipliers
    }

    /// Estimates for car, motorcycle, bicycle and walking, in that order.
    pub fn estimate(
        &self,
        distance_km: f64,
        duration_min: f64,
        risk: RiskLevel,
    ) -> Result<Vec<TransportOption>, EstimateError> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(EstimateError::InvalidDistance { value: distance_km });
        }
        if !duration_min.is_finite() || duration_min <= 0.0 {
            return Err(EstimateError::InvalidDuration {
                value: duration_min,
            });
        }

        let multiplier = self.multipliers.for_level(risk);
        Ok(vec![
            option(TransportMode::Car, duration_min * multiplier, risk),
            option(
                TransportMode::Motorcycle,
                duration_min * self.motorcycle_factor * multiplier,
                risk,
            ),
            option(
                TransportMode::Bicycle,
                distance_km * 60.0 / BICYCLE_SPEED_KMH,
                RiskLevel::Low,
            ),
            option(
                TransportMode::Walking,
                distance_km * 60.0 / WALKING_SPEED_KMH,
                risk,
            ),
        ])
    }
}

fn option(mode: TransportMode, minutes: f64, risk: RiskLevel) -> TransportOption {
    TransportOption {
        mode,
        minutes: whole_minutes(minutes),
        risk,
        description: mode.description().to_owned(),
        eco_friendly: mode.is_eco_friendly(),
    }
}

/// Floor to whole minutes, absorbing float noise; saturates at `u32::MAX`.
fn whole_minutes(minutes: f64) -> u32 {
    (minutes + MINUTE_EPSILON).floor() as u32
}
