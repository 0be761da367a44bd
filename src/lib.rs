pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod labeling;
pub mod ml;
pub mod model;

pub use config::AppConfig;
pub use domain::{TokenMetadata, TradeEvent, TradeSide};
pub use error::{MintscoreError, Result};
pub use features::{FeatureVector, WindowMetrics, HORIZONS};
pub use labeling::{OutcomeTag, TokenOutcome};
pub use model::{ArtifactStore, ModelArtifact, Prediction, Scorer, TrainingReport};
