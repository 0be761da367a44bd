//! Trade events as delivered by the upstream launchpad feed.
//!
//! The feed reports running bonding-curve reserve balances, not per-trade
//! deltas; see `features::volume` for the reconstruction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn is_buy(&self) -> bool {
        matches!(self, TradeSide::Buy)
    }
}

/// One observed trade for a mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    /// Token identifier
    pub mint: String,
    /// Trader wallet
    pub trader_public_key: String,
    #[serde(rename = "txType")]
    pub side: TradeSide,
    pub token_amount: f64,
    /// Running SOL balance of the bonding curve (cumulative, not a delta)
    #[serde(rename = "vSolInBondingCurve")]
    pub sol_in_curve: f64,
    /// Running token balance of the bonding curve
    #[serde(rename = "vTokensInBondingCurve")]
    pub tokens_in_curve: f64,
    /// Unix milliseconds
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub market_cap_sol: f64,
    pub holders_count: u64,
}

/// Sort trades ascending by timestamp. The sort is stable so equal
/// timestamps keep their input order and repeated runs are reproducible.
pub fn sort_by_time(trades: &mut [TradeEvent]) {
    trades.sort_by_key(|t| t.timestamp_ms);
}

/// Group trades by mint, each group time-sorted. BTreeMap keeps mint
/// iteration order deterministic across runs.
pub fn group_by_mint(trades: &[TradeEvent]) -> BTreeMap<String, Vec<TradeEvent>> {
    let mut groups: BTreeMap<String, Vec<TradeEvent>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.mint.clone()).or_default().push(trade.clone());
    }
    for group in groups.values_mut() {
        sort_by_time(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(mint: &str, trader: &str, ts: i64) -> TradeEvent {
        TradeEvent {
            mint: mint.to_string(),
            trader_public_key: trader.to_string(),
            side: TradeSide::Buy,
            token_amount: 1.0,
            sol_in_curve: 1.0,
            tokens_in_curve: 1.0,
            timestamp_ms: ts,
            market_cap_sol: 10.0,
            holders_count: 1,
        }
    }

    #[test]
    fn sort_is_stable_on_equal_timestamps() {
        let mut trades = vec![
            trade("m", "c", 200),
            trade("m", "a", 100),
            trade("m", "b", 100),
        ];
        sort_by_time(&mut trades);
        let order: Vec<&str> = trades.iter().map(|t| t.trader_public_key.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn grouping_splits_and_sorts_per_mint() {
        let trades = vec![
            trade("m2", "x", 300),
            trade("m1", "y", 200),
            trade("m1", "z", 100),
        ];
        let groups = group_by_mint(&trades);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["m1"][0].timestamp_ms, 100);
        assert_eq!(groups["m1"][1].timestamp_ms, 200);
        assert_eq!(groups["m2"].len(), 1);
    }

    #[test]
    fn wire_format_matches_feed() {
        let json = r#"{
            "mint": "So11111111111111111111111111111111111111112",
            "traderPublicKey": "trader1",
            "txType": "buy",
            "tokenAmount": 1000.0,
            "vSolInBondingCurve": 30.5,
            "vTokensInBondingCurve": 950000.0,
            "timestamp": 1700000000000,
            "marketCapSol": 42.0,
            "holdersCount": 7
        }"#;
        let event: TradeEvent = serde_json::from_str(json).unwrap();
        assert!(event.side.is_buy());
        assert_eq!(event.sol_in_curve, 30.5);
        assert_eq!(event.holders_count, 7);
    }
}
