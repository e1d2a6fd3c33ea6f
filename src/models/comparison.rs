//! Comparison wire model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Comparison;
use crate::verdict::Winner;

/// Multipart field holding the feed screenshot
pub const FEED_FIELD: &str = "feed_image";
/// Multipart field holding the first candidate
pub const IMAGE_A_FIELD: &str = "image_a";
/// Multipart field holding the second candidate
pub const IMAGE_B_FIELD: &str = "image_b";

pub const SUCCESS_MESSAGE: &str = "Analysis completed successfully";

/// Body of a successful `POST /compare`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub image_a_score: f64,
    pub image_b_score: f64,
    #[serde(default)]
    pub winner: Option<Winner>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub analysis_id: Option<Uuid>,
}

impl CompareResponse {
    pub fn new(comparison: Comparison, analysis_id: Uuid) -> Self {
        Self {
            image_a_score: comparison.image_a_score,
            image_b_score: comparison.image_b_score,
            winner: Some(Winner::from_scores(comparison.image_a_score, comparison.image_b_score)),
            message: Some(SUCCESS_MESSAGE.to_string()),
            analysis_id: Some(analysis_id),
        }
    }
}
