//! Route risk scoring and best-candidate selection.

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

use crate::{HazardSnapshot, RiskClassifier, RiskLevel, RouteCandidate};

/// Default distance, in vertices, between scored samples.
pub const DEFAULT_SAMPLING_STRIDE: usize = 10;

/// Errors returned by [`RouteEvaluator::select_best`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluateError {
    /// The candidate list was empty.
    #[error("no route candidates to choose from")]
    NoCandidates,
}

/// The chosen route and its risk.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSelection {
    /// Position of the chosen candidate in the input list.
    pub index: usize,
    /// The chosen candidate.
    pub candidate: RouteCandidate,
    /// Classification of the candidate's midpoint.
    pub risk: RiskLevel,
    /// Summed sample weights, present only when candidates were scored.
    pub score: Option<u32>,
}

/// Scores candidate routes by sampling their geometry.
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator {
    classifier: RiskClassifier,
    stride: usize,
}

impl Default for RouteEvaluator {
    fn default() -> Self {
        Self::new(RiskClassifier::default())
    }
}

impl RouteEvaluator {
    /// Create an evaluator sampling every [`DEFAULT_SAMPLING_STRIDE`]th vertex.
    #[must_use]
    pub const fn new(classifier: RiskClassifier) -> Self {
        Self {
            classifier,
            stride: DEFAULT_SAMPLING_STRIDE,
        }
    }

    /// Set the sampling stride. Zero is treated as one.
    #[must_use]
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Current sampling stride.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Vertices scored for `candidate`: every stride-th vertex starting at
    /// the first, plus the last vertex.
    pub fn samples<'a>(&self, candidate: &'a RouteCandidate) -> impl Iterator<Item = Coord> + 'a {
        let vertices = candidate.vertices();
        let last_index = vertices.len().saturating_sub(1);
        let tail = (last_index % self.stride != 0).then_some(candidate.end());
        vertices
            .iter()
            .step_by(self.stride)
            .copied()
            .chain(tail)
    }

    /// Sum of the level weights of every sample.
    #[must_use]
    pub fn score(
        &self,
        candidate: &RouteCandidate,
        snapshot: &HazardSnapshot,
        now: DateTime<Utc>,
    ) -> u32 {
        self.samples(candidate)
            .map(|point| self.classifier.classify(point, snapshot, now).weight())
            .sum()
    }

    /// Choose the route to recommend.
    ///
    /// Without `avoid_risk`, or with a single candidate, the first candidate
    /// is returned unscored. Otherwise the lowest score wins and ties keep
    /// the earlier candidate.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use geo::Coord;
    /// use saferoute_core::{HazardSnapshot, RouteCandidate, RouteEvaluator};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let a = Coord { x: -106.10, y: 28.60 };
    /// let b = Coord { x: -106.08, y: 28.64 };
    /// let candidates = vec![
    ///     RouteCandidate::new(vec![a, b], 5.0, 10.0)?,
    ///     RouteCandidate::new(vec![a, b], 6.0, 12.0)?,
    /// ];
    /// let selection = RouteEvaluator::default().select_best(
    ///     candidates,
    ///     true,
    ///     &HazardSnapshot::empty(1),
    ///     Utc::now(),
    /// )?;
    /// assert_eq!(selection.index, 0);
    /// assert_eq!(selection.score, Some(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn select_best(
        &self,
        candidates: Vec<RouteCandidate>,
        avoid_risk: bool,
        snapshot: &HazardSnapshot,
        now: DateTime<Utc>,
    ) -> Result<RouteSelection, EvaluateError> {
        if !avoid_risk || candidates.len() == 1 {
            let candidate = candidates
                .into_iter()
                .next()
                .ok_or(EvaluateError::NoCandidates)?;
            return Ok(self.selection(0, candidate, None, snapshot, now));
        }

        let (index, score) = candidates
            .iter()
            .map(|candidate| self.score(candidate, snapshot, now))
            .enumerate()
            .min_by_key(|&(_, score)| score)
            .ok_or(EvaluateError::NoCandidates)?;
        log::debug!("selected route candidate {index} with risk score {score}");
        let candidate = candidates
            .into_iter()
            .nth(index)
            .ok_or(EvaluateError::NoCandidates)?;
        Ok(self.selection(index, candidate, Some(score), snapshot, now))
    }

    fn selection(
        &self,
        index: usize,
        candidate: RouteCandidate,
        score: Option<u32>,
        snapshot: &HazardSnapshot,
        now: DateTime<Utc>,
    ) -> RouteSelection {
        let risk = self.classifier.classify(candidate.midpoint(), snapshot, now);
        RouteSelection {
            index,
            candidate,
            risk,
            score,
        }
    }
}
