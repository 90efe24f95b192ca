use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::constants::FALLBACK_GENERATION_COST;

/// A rendered thumbnail as returned by the generation and detail endpoints.
///
/// The server historically emitted `_id`; newer responses use `id`. Both
/// are accepted on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Thumbnail {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub style: String,
    pub aspect_ratio: String,
    pub color_scheme: String,
    #[serde(default)]
    pub prompt_used: String,
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Which rendering model a generation request pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum GenerationModel {
    Premium,
    Basic,
}

impl GenerationModel {
    /// Fixed credit cost of a render on this model.
    pub fn credit_cost(self) -> u64 {
        match self {
            GenerationModel::Premium => 20,
            GenerationModel::Basic => 10,
        }
    }

    /// Cost charged when the request carries no recognizable model.
    pub fn fallback_cost() -> u64 {
        FALLBACK_GENERATION_COST
    }
}

/// Payload sent to the generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GenerateRequest {
    pub title: String,
    pub style: String,
    pub aspect_ratio: String,
    pub color_scheme: String,
    pub user_prompt: String,
    /// The prompt actually rendered — the optimized one when the user
    /// accepted an enhancement, otherwise the raw description.
    pub prompt_used: String,
    #[serde(rename = "priceModel")]
    pub price_model: GenerationModel,
}

impl GenerateRequest {
    /// Credit cost of this request.
    pub fn credit_cost(&self) -> u64 {
        self.price_model.credit_cost()
    }
}
