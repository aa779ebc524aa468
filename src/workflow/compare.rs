//! Side-by-side comparison of two history entries.

use serde::Serialize;

use crate::core::RunState;

/// Difference in one strategic dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDelta {
    /// Dimension name.
    pub dimension: &'static str,
    /// Score of the left run.
    pub left: u8,
    /// Score of the right run.
    pub right: u8,
    /// `right - left`.
    pub delta: i16,
}

/// Two runs plus their score differences.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// First run.
    pub left: RunState,
    /// Second run.
    pub right: RunState,
    /// Per-dimension deltas; absent unless both runs have a SWOT.
    pub score_deltas: Option<Vec<ScoreDelta>>,
}

impl Comparison {
    /// Builds the comparison of `left` and `right`.
    #[must_use]
    pub fn new(left: RunState, right: RunState) -> Self {
        let score_deltas = match (&left.swot_analysis, &right.swot_analysis) {
            (Some(l), Some(r)) => Some(
                l.scores
                    .dimensions()
                    .into_iter()
                    .zip(r.scores.dimensions())
                    .map(|((dimension, left), (_, right))| ScoreDelta {
                        dimension,
                        left,
                        right,
                        delta: i16::from(right) - i16::from(left),
                    })
                    .collect(),
            ),
            _ => None,
        };

        Self {
            left,
            right,
            score_deltas,
        }
    }
}
