//! Recommendation derived from a pair of fit scores

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a picture is a perfect fit
pub const PERFECT_THRESHOLD: f64 = 85.0;
/// Score at or above which a picture is a great fit
pub const GREAT_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
}

impl Winner {
    /// A only wins outright; ties go to B
    pub fn from_scores(image_a_score: f64, image_b_score: f64) -> Self {
        if image_a_score > image_b_score {
            Winner::A
        } else {
            Winner::B
        }
    }

    pub fn other(self) -> Self {
        match self {
            Winner::A => Winner::B,
            Winner::B => Winner::A,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::A => write!(f, "A"),
            Winner::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitTier {
    Perfect,
    Great,
    Workable,
}

impl FitTier {
    pub fn from_score(score: f64) -> Self {
        if score >= PERFECT_THRESHOLD {
            FitTier::Perfect
        } else if score >= GREAT_THRESHOLD {
            FitTier::Great
        } else {
            FitTier::Workable
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FitTier::Perfect => "Perfect match for your vibe! ✨",
            FitTier::Great => "A great match for your current aesthetic!",
            FitTier::Workable => "Not quite your style, but still workable.",
        }
    }
}

/// Everything the results view shows for one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub winner: Winner,
    pub winner_score: f64,
    pub runner_up_score: f64,
    pub winner_tier: FitTier,
    pub runner_up_tier: FitTier,
}

impl Verdict {
    pub fn new(image_a_score: f64, image_b_score: f64) -> Self {
        let winner = Winner::from_scores(image_a_score, image_b_score);
        let (winner_score, runner_up_score) = match winner {
            Winner::A => (image_a_score, image_b_score),
            Winner::B => (image_b_score, image_a_score),
        };

        Self {
            winner,
            winner_score,
            runner_up_score,
            winner_tier: FitTier::from_score(winner_score),
            runner_up_tier: FitTier::from_score(runner_up_score),
        }
    }

    pub fn recommendation(&self) -> String {
        format!(
            "Based on your feed's aesthetic, Picture {} would be the better choice for maintaining your visual consistency and style.",
            self.winner
        )
    }

    /// Extra praise shown only for a perfect winner
    pub fn highlight(&self) -> Option<&'static str> {
        (self.winner_tier == FitTier::Perfect)
            .then_some("🎉 Exceptional match! This will look amazing on your feed.")
    }
}
