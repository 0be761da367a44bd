//! The fixed-schema feature vector.
//!
//! The schema is a closed set of 31 named values: three static issuance
//! scalars plus seven window metrics across four horizons. Keeping it a
//! struct (rather than a loose name→value map) means a schema mismatch is a
//! construction error, not a silent runtime lookup miss; the name list only
//! appears at the model boundary, where inference vectors are re-aligned to
//! the order recorded at training time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{TokenMetadata, TradeEvent};
use crate::error::Result;
use crate::features::volume::reconstruct_volumes;
use crate::features::window::{WindowMetrics, HORIZONS};

const STATIC_NAMES: [&str; 3] = ["initial_buy_sol", "initial_buy_percent", "initial_liquidity"];

/// Window metric names, in schema order. Must stay in sync with
/// [`WindowMetrics::ordered_values`].
const METRIC_NAMES: [&str; 7] = [
    "trades",
    "buy_ratio",
    "mcap_growth",
    "unique_traders",
    "buy_pressure",
    "holders",
    "holders_growth",
];

impl WindowMetrics {
    /// Metric values in [`METRIC_NAMES`] order.
    fn ordered_values(&self) -> [f64; 7] {
        [
            self.trades as f64,
            self.buy_ratio,
            self.mcap_growth_pct,
            self.unique_traders as f64,
            self.buy_pressure,
            self.holders as f64,
            self.holders_growth_pct,
        ]
    }
}

/// One mint's extracted features: static issuance scalars plus per-horizon
/// window aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub initial_buy_sol: f64,
    pub initial_buy_percent: f64,
    pub initial_liquidity: f64,
    /// Indexed like [`HORIZONS`]
    pub windows: [WindowMetrics; 4],
}

impl FeatureVector {
    /// Extract the feature vector for one mint.
    ///
    /// `trades` must be the mint's time-sorted history. An empty history
    /// yields zeroed trade-derived fields with the statics still populated —
    /// the all-zero case only arises when the metadata is zero too.
    pub fn extract(trades: &[TradeEvent], token: &TokenMetadata) -> Result<Self> {
        let mut windows = [WindowMetrics::default(); 4];
        if !trades.is_empty() {
            let volumes = reconstruct_volumes(trades);
            for (slot, horizon) in windows.iter_mut().zip(HORIZONS) {
                *slot = WindowMetrics::aggregate(trades, &volumes, horizon)?;
            }
        }
        Ok(Self {
            initial_buy_sol: token.initial_buy_sol,
            initial_buy_percent: token.initial_buy_percent,
            initial_liquidity: token.liquidity,
            windows,
        })
    }

    /// The canonical feature-name list, in schema order.
    pub fn feature_names() -> Vec<String> {
        let mut names: Vec<String> = STATIC_NAMES.iter().map(|n| n.to_string()).collect();
        for metric in METRIC_NAMES {
            for horizon in HORIZONS {
                names.push(format!("{metric}_{}", horizon.suffix));
            }
        }
        names
    }

    /// Values in the same order as [`FeatureVector::feature_names`].
    pub fn values(&self) -> Vec<f64> {
        let mut values = vec![
            self.initial_buy_sol,
            self.initial_buy_percent,
            self.initial_liquidity,
        ];
        let per_window: Vec<[f64; 7]> = self.windows.iter().map(|w| w.ordered_values()).collect();
        for metric_idx in 0..METRIC_NAMES.len() {
            for window in &per_window {
                values.push(window[metric_idx]);
            }
        }
        values
    }

    /// Name/value pairs in schema order.
    pub fn named_values(&self) -> Vec<(String, f64)> {
        Self::feature_names().into_iter().zip(self.values()).collect()
    }

    /// The unusable-input signal: every value, statics included, is exactly
    /// zero. Excluded from training; valid at inference (means "no signal").
    pub fn is_all_zero(&self) -> bool {
        self.values().iter().all(|v| *v == 0.0)
    }

    /// Re-align to a training-time feature order: names missing here are
    /// zero-filled, names not in `feature_names` are dropped.
    pub fn align(&self, feature_names: &[String]) -> Vec<f64> {
        let by_name: HashMap<String, f64> = self.named_values().into_iter().collect();
        feature_names
            .iter()
            .map(|name| by_name.get(name).copied().unwrap_or(0.0))
            .collect()
    }

    /// The 1-minute window, used by the heuristic fallback and the
    /// early-signs section of the analysis payload.
    pub fn one_minute(&self) -> &WindowMetrics {
        &self.windows[1]
    }
}
