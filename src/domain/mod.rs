pub mod token;
pub mod trade;

pub use token::TokenMetadata;
pub use trade::{group_by_mint, sort_by_time, TradeEvent, TradeSide};
