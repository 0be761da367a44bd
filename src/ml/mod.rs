//! Lightweight ML utilities (deploy-safe training and inference).
//!
//! This module is intentionally dependency-light so the service can train
//! and serve on small instances without GPU/toolchain complexity: a
//! feature standardizer and a gradient-boosted-stump classifier, both
//! deterministic and serde-persistable.

pub mod gbdt;
pub mod scaler;

pub use gbdt::{GbdtClassifier, GbdtParams};
pub use scaler::StandardScaler;
