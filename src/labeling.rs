//! Training-time outcome classification.
//!
//! Labels are built with full hindsight over a mint's entire trade history,
//! including everything after the feature windows. A token is only a
//! success if it reached the market-cap bar without the failure modes that
//! make the bar meaningless: collapsing from its peak or shedding its
//! holders.

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::domain::TradeEvent;
use crate::error::{MintscoreError, Result};

/// Non-exclusive diagnostic tags. Reported for training diagnostics; only
/// the success formula gates the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    Rugpull,
    HolderDump,
    NoGrowth,
}

impl OutcomeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeTag::Rugpull => "rugpull",
            OutcomeTag::HolderDump => "holder_dump",
            OutcomeTag::NoGrowth => "no_growth",
        }
    }
}

/// Full-history evaluation of one training example.
#[derive(Debug, Clone, Serialize)]
pub struct TokenOutcome {
    pub success: bool,
    pub tags: Vec<OutcomeTag>,
    pub max_growth_pct: f64,
    pub drop_from_ath_pct: f64,
    pub holder_retention: f64,
}

impl TokenOutcome {
    /// Classify a mint's full, time-sorted trade history against its final
    /// market cap.
    pub fn classify(
        trades: &[TradeEvent],
        final_market_cap: f64,
        thresholds: &ScoringConfig,
    ) -> Result<Self> {
        let first = trades.first().ok_or_else(|| {
            MintscoreError::Input("cannot label a mint with no trade history".to_string())
        })?;
        let last = trades.last().unwrap_or(first);

        let initial_mcap = first.market_cap_sol;
        let final_mcap = last.market_cap_sol;
        let max_mcap = trades
            .iter()
            .map(|t| t.market_cap_sol)
            .fold(f64::NEG_INFINITY, f64::max);

        let max_growth_pct = if initial_mcap > 0.0 {
            (max_mcap - initial_mcap) / initial_mcap * 100.0
        } else {
            0.0
        };
        let drop_from_ath_pct = if max_mcap > 0.0 {
            (max_mcap - final_mcap) / max_mcap * 100.0
        } else {
            0.0
        };

        let holders_peak = trades.iter().map(|t| t.holders_count).max().unwrap_or(0);
        let holders_final = last.holders_count;
        let holder_retention = if holders_peak > 0 {
            holders_final as f64 / holders_peak as f64
        } else {
            0.0
        };

        let mut tags = Vec::new();
        if drop_from_ath_pct >= thresholds.rugpull_drawdown_pct {
            tags.push(OutcomeTag::Rugpull);
        }
        if holder_retention < thresholds.holder_retention_floor {
            tags.push(OutcomeTag::HolderDump);
        }
        if max_growth_pct < thresholds.min_growth_pct {
            tags.push(OutcomeTag::NoGrowth);
        }

        let success = final_market_cap >= thresholds.success_mcap
            && !tags.contains(&OutcomeTag::Rugpull)
            && !tags.contains(&OutcomeTag::HolderDump)
            && max_growth_pct >= thresholds.success_growth_pct;

        Ok(Self {
            success,
            tags,
            max_growth_pct,
            drop_from_ath_pct,
            holder_retention,
        })
    }

    /// Single reporting category: success beats tags, first tag otherwise.
    pub fn category(&self) -> &'static str {
        if self.success {
            "success"
        } else if let Some(tag) = self.tags.first() {
            tag.as_str()
        } else {
            "none"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeSide;

    fn trade(ts: i64, mcap: f64, holders: u64) -> TradeEvent {
        TradeEvent {
            mint: "m".to_string(),
            trader_public_key: "t".to_string(),
            side: TradeSide::Buy,
            token_amount: 1.0,
            sol_in_curve: 30.0,
            tokens_in_curve: 1.0,
            timestamp_ms: ts,
            market_cap_sol: mcap,
            holders_count: holders,
        }
    }

    fn thresholds() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn healthy_runner_is_a_success() {
        // Triples from launch, keeps holders, barely dips from its peak.
        let trades = vec![
            trade(0, 100.0, 10),
            trade(60_000, 250.0, 40),
            trade(120_000, 300.0, 50),
            trade(180_000, 280.0, 48),
        ];
        let outcome = TokenOutcome::classify(&trades, 450.0, &thresholds()).unwrap();
        assert!(outcome.success);
        assert!(outcome.tags.is_empty());
        assert_eq!(outcome.category(), "success");
    }

    #[test]
    fn rugpull_and_success_are_mutually_exclusive() {
        // Peaks at 500 then collapses to 50: a 90% drawdown.
        let trades = vec![
            trade(0, 100.0, 10),
            trade(60_000, 500.0, 60),
            trade(120_000, 50.0, 55),
        ];
        let outcome = TokenOutcome::classify(&trades, 450.0, &thresholds()).unwrap();
        assert!(outcome.tags.contains(&OutcomeTag::Rugpull));
        assert!(!outcome.success);
    }

    #[test]
    fn holder_dump_blocks_success() {
        let trades = vec![
            trade(0, 100.0, 100),
            trade(60_000, 300.0, 120),
            trade(120_000, 290.0, 40),
        ];
        let outcome = TokenOutcome::classify(&trades, 450.0, &thresholds()).unwrap();
        assert!(outcome.tags.contains(&OutcomeTag::HolderDump));
        assert!(!outcome.success);
    }

    #[test]
    fn mcap_bar_alone_is_not_enough() {
        // Final cap clears the bar but peak growth is only 50%.
        let trades = vec![
            trade(0, 300.0, 10),
            trade(60_000, 450.0, 20),
            trade(120_000, 440.0, 20),
        ];
        let outcome = TokenOutcome::classify(&trades, 450.0, &thresholds()).unwrap();
        assert!((outcome.max_growth_pct - 50.0).abs() < 1e-12);
        assert!(!outcome.success);
    }

    #[test]
    fn no_growth_tag_reports_independently() {
        let trades = vec![
            trade(0, 100.0, 10),
            trade(60_000, 110.0, 12),
            trade(120_000, 105.0, 12),
        ];
        let outcome = TokenOutcome::classify(&trades, 10.0, &thresholds()).unwrap();
        assert_eq!(outcome.tags, vec![OutcomeTag::NoGrowth]);
        assert_eq!(outcome.category(), "no_growth");
    }

    #[test]
    fn zero_holder_peak_means_zero_retention() {
        let trades = vec![trade(0, 100.0, 0), trade(60_000, 120.0, 0)];
        let outcome = TokenOutcome::classify(&trades, 10.0, &thresholds()).unwrap();
        assert_eq!(outcome.holder_retention, 0.0);
        assert!(outcome.tags.contains(&OutcomeTag::HolderDump));
    }

    #[test]
    fn empty_history_is_an_input_error() {
        let err = TokenOutcome::classify(&[], 10.0, &thresholds()).unwrap_err();
        assert!(matches!(err, MintscoreError::Input(_)));
    }
}
