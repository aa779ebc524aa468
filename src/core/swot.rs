//! SWOT analysis and strategic scores.

use serde::{Deserialize, Serialize};

/// Upper bound of every strategic score.
pub const MAX_SCORE: u8 = 100;

/// Model-estimated strategic scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicScores {
    /// How cutting-edge the technology is.
    pub innovation: u8,
    /// Estimated relative market strength.
    pub market_share: u8,
    /// Ability to command a premium.
    pub pricing_power: u8,
    /// Public sentiment.
    pub brand_reputation: u8,
    /// Speed of shipping updates.
    pub velocity: u8,
}

impl StrategicScores {
    /// Returns `(dimension, score)` pairs in display order.
    #[must_use]
    pub const fn dimensions(&self) -> [(&'static str, u8); 5] {
        [
            ("innovation", self.innovation),
            ("market_share", self.market_share),
            ("pricing_power", self.pricing_power),
            ("brand_reputation", self.brand_reputation),
            ("velocity", self.velocity),
        ]
    }

    /// Returns the first dimension whose score exceeds [`MAX_SCORE`].
    #[must_use]
    pub fn out_of_range(&self) -> Option<(&'static str, u8)> {
        self.dimensions()
            .into_iter()
            .find(|&(_, score)| score > MAX_SCORE)
    }
}

/// Strengths/weaknesses/opportunities/threats plus strategic scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swot {
    /// Internal advantages.
    pub strengths: Vec<String>,
    /// Internal disadvantages.
    pub weaknesses: Vec<String>,
    /// External openings.
    pub opportunities: Vec<String>,
    /// External risks.
    pub threats: Vec<String>,
    /// Strategic dimension scores.
    pub scores: StrategicScores,
}

impl Swot {
    /// Returns `(quadrant, items)` pairs in the conventional order.
    #[must_use]
    pub fn quadrants(&self) -> [(&'static str, &[String]); 4] {
        [
            ("strengths", self.strengths.as_slice()),
            ("weaknesses", self.weaknesses.as_slice()),
            ("opportunities", self.opportunities.as_slice()),
            ("threats", self.threats.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range() {
        let mut scores = StrategicScores {
            innovation: 90,
            market_share: 80,
            pricing_power: 70,
            brand_reputation: 60,
            velocity: 50,
        };
        assert!(scores.out_of_range().is_none());
        scores.velocity = 101;
        assert_eq!(scores.out_of_range(), Some(("velocity", 101)));
    }

    #[test]
    fn test_scores_reject_non_integers() {
        let json = r#"{"innovation": 85.5, "market_share": 1, "pricing_power": 1, "brand_reputation": 1, "velocity": 1}"#;
        assert!(serde_json::from_str::<StrategicScores>(json).is_err());
    }

    #[test]
    fn test_quadrant_order() {
        let swot = Swot::default();
        let names: Vec<&str> = swot.quadrants().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["strengths", "weaknesses", "opportunities", "threats"]);
    }
}
