use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Server-side credit balance snapshot.
///
/// Always replaced wholesale by the ledger's response — never assembled or
/// adjusted locally. Absent whenever no user is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditBalance {
    pub credits: u64,
    #[serde(rename = "totalSpent")]
    pub total_spent: u64,
    pub username: String,
}
