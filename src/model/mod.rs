pub mod artifact;
pub mod scorer;

pub use artifact::{ArtifactStore, ModelArtifact};
pub use scorer::{Analysis, EarlySigns, Prediction, Scorer, TrainingReport};
