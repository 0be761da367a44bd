use serde::{Deserialize, Serialize};

/// Static issuance metadata for one mint.
///
/// `final_market_cap` is only known for historical examples and is what
/// training labels are built from; it is never available for a still-live
/// token at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub mint: String,
    pub initial_buy_sol: f64,
    pub initial_buy_percent: f64,
    pub liquidity: f64,
    #[serde(rename = "marketCap", default, skip_serializing_if = "Option::is_none")]
    pub final_market_cap: Option<f64>,
}
