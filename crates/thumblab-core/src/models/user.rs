use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The authenticated user as reported by the session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserIdentity {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
}
