//! Temporal feature extraction over one mint's earliest trades.
//!
//! The pipeline runs in three steps:
//! 1. `volume` — recover per-trade traded volume from the cumulative
//!    bonding-curve reserve the feed reports.
//! 2. `window` — aggregate trades falling inside a time horizon from the
//!    first observed trade.
//! 3. `vector` — assemble the fixed-schema feature vector the classifier
//!    consumes.

pub mod vector;
pub mod volume;
pub mod window;

pub use vector::FeatureVector;
pub use volume::reconstruct_volumes;
pub use window::{Horizon, WindowMetrics, HORIZONS};
