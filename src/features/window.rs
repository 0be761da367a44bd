//! Window-scoped aggregates over a mint's trade sequence.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::TradeEvent;
use crate::error::{MintscoreError, Result};

/// A fixed offset from the first observed trade defining a feature window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    /// Feature-name suffix, e.g. "30s"
    pub suffix: &'static str,
    pub ms: i64,
}

/// The horizons the feature schema is built from. Windows share the same
/// start, so each horizon's window is a superset of the previous one.
pub const HORIZONS: [Horizon; 4] = [
    Horizon { suffix: "30s", ms: 30_000 },
    Horizon { suffix: "1min", ms: 60_000 },
    Horizon { suffix: "2min", ms: 120_000 },
    Horizon { suffix: "5min", ms: 300_000 },
];

/// Aggregates over one horizon's window. All-zero when the window is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub trades: u32,
    pub unique_traders: u32,
    pub buy_ratio: f64,
    pub buy_pressure: f64,
    pub mcap_growth_pct: f64,
    pub holders: u64,
    pub holders_growth_pct: f64,
}

impl WindowMetrics {
    /// Compute metrics over the trades falling within `horizon` of the
    /// sequence's first trade (inclusive upper bound).
    ///
    /// `trades` must be time-sorted for one mint; `volumes` is the
    /// reconstructed per-trade volume, parallel to `trades`. Holder growth
    /// is anchored to the sequence's very first trade, not the window's.
    pub fn aggregate(trades: &[TradeEvent], volumes: &[f64], horizon: Horizon) -> Result<Self> {
        if trades.is_empty() {
            return Ok(Self::default());
        }
        debug_assert_eq!(trades.len(), volumes.len());

        let start = trades[0].timestamp_ms;
        let cutoff = start + horizon.ms;
        let end = trades.partition_point(|t| t.timestamp_ms <= cutoff);
        if end == 0 {
            return Ok(Self::default());
        }
        let window = &trades[..end];
        let window_volumes = &volumes[..end];
        let mint = window[0].mint.as_str();

        let traders: HashSet<&str> = window
            .iter()
            .map(|t| t.trader_public_key.as_str())
            .collect();

        let buys = window.iter().filter(|t| t.side.is_buy()).count();
        let buy_ratio = buys as f64 / window.len() as f64;

        let total_volume: f64 = window_volumes.iter().sum();
        let buy_volume: f64 = window
            .iter()
            .zip(window_volumes)
            .filter(|(t, _)| t.side.is_buy())
            .map(|(_, v)| *v)
            .sum();
        let buy_pressure = if total_volume > 0.0 {
            ensure_finite(buy_volume / total_volume, mint, "buy_pressure")?
        } else {
            0.0
        };

        // Growth needs two observations; a single trade has no trajectory.
        let mcap_growth_pct = if window.len() > 1 {
            let first = window[0].market_cap_sol;
            let last = window[window.len() - 1].market_cap_sol;
            if first > 0.0 {
                ensure_finite((last - first) / first * 100.0, mint, "mcap_growth_pct")?
            } else {
                0.0
            }
        } else {
            0.0
        };

        let holders = window[window.len() - 1].holders_count;
        let initial_holders = trades[0].holders_count;
        let holders_growth_pct = if initial_holders > 0 {
            ensure_finite(
                (holders as f64 - initial_holders as f64) / initial_holders as f64 * 100.0,
                mint,
                "holders_growth_pct",
            )?
        } else {
            0.0
        };

        Ok(Self {
            trades: window.len() as u32,
            unique_traders: traders.len() as u32,
            buy_ratio,
            buy_pressure,
            mcap_growth_pct,
            holders,
            holders_growth_pct,
        })
    }
}

/// Non-finite aggregates mean a malformed input record; surface the mint and
/// field instead of zeroing the value out.
fn ensure_finite(value: f64, mint: &str, field: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MintscoreError::FeatureExtraction {
            mint: mint.to_string(),
            field,
            detail: format!("produced non-finite value {value}"),
        })
    }
}
