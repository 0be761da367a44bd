//! Per-trade volume reconstruction.
//!
//! The feed exposes the bonding curve's running SOL balance on every trade,
//! not the amount that changed hands. Summing the raw balances across a
//! window would double count, so traded volume is recovered as the absolute
//! reserve delta between consecutive trades of the same mint.

use crate::domain::TradeEvent;

/// Returns the reconstructed traded volume for each trade, parallel to the
/// input. The input must already be time-sorted for one mint.
///
/// The first trade has no predecessor; its volume is the raw reserve
/// balance, i.e. the baseline at listing.
pub fn reconstruct_volumes(trades: &[TradeEvent]) -> Vec<f64> {
    let mut volumes = Vec::with_capacity(trades.len());
    let mut prev_reserve: Option<f64> = None;
    for trade in trades {
        let volume = match prev_reserve {
            Some(prev) => (trade.sol_in_curve - prev).abs(),
            None => trade.sol_in_curve,
        };
        volumes.push(volume);
        prev_reserve = Some(trade.sol_in_curve);
    }
    volumes
}
