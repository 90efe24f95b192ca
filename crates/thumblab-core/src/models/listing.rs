use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A marketplace listing from the community ranking endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommunityListing {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    /// Id of the underlying thumbnail; the detail view chains a second
    /// fetch on this to retrieve the actual render.
    pub thumbnail_id: String,
    /// Market-potential score (0–10) assigned by the valuation model.
    #[serde(rename = "valuationByLLM")]
    pub valuation: f64,
    pub total_price: u64,
    pub creator_earnings: u64,
    pub platform_fee: u64,
    #[serde(default)]
    pub download_count: u64,
    pub status: String,
    #[serde(default)]
    pub reasoning: Option<String>,
}
