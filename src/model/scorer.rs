//! Training and inference around the active model artifact.
//!
//! The scorer owns the process-wide model handle. Training builds a whole
//! new artifact and publishes it by swapping the `Arc` behind a lock;
//! concurrent predictions see either the previous artifact or the new one
//! in full, never a partially-updated mix.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::config::{AppConfig, ScoringConfig};
use crate::domain::{group_by_mint, sort_by_time, TokenMetadata, TradeEvent};
use crate::error::{MintscoreError, Result};
use crate::features::FeatureVector;
use crate::labeling::TokenOutcome;
use crate::ml::{GbdtClassifier, GbdtParams, StandardScaler};
use crate::model::artifact::{ArtifactStore, ModelArtifact, VERSION_FORMAT};

// Heuristic fallback weights for the 1-minute window, used until a model
// has been trained. The cutoff matches the trained path so behavior is
// continuous across the transition.
const FALLBACK_TRADES_HIGH: (u32, f64) = (5, 0.3);
const FALLBACK_TRADES_LOW: (u32, f64) = (3, 0.2);
const FALLBACK_BUY_RATIO_HIGH: (f64, f64) = (0.7, 0.3);
const FALLBACK_BUY_RATIO_LOW: (f64, f64) = (0.5, 0.2);
const FALLBACK_GROWTH_HIGH: (f64, f64) = (50.0, 0.4);
const FALLBACK_GROWTH_LOW: (f64, f64) = (20.0, 0.2);

pub struct Scorer {
    store: ArtifactStore,
    params: GbdtParams,
    thresholds: ScoringConfig,
    active: RwLock<Option<Arc<ModelArtifact>>>,
}

/// Outcome of one training run, reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub version: String,
    /// Examples that made it into the training matrix
    pub examples: usize,
    pub positives: usize,
    /// Mints skipped because their feature vector was all-zero
    pub skipped_all_zero: usize,
    /// Diagnostic category counts over labeled examples
    pub categories: BTreeMap<String, usize>,
    /// Highest-importance features, descending
    pub top_features: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// One scored candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub is_promising: bool,
    pub probability: f64,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub early_signs: EarlySigns,
    pub feature_values: BTreeMap<String, f64>,
    /// Percent of each success-pattern mean reached by this candidate;
    /// absent in fallback mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_match: Option<BTreeMap<String, f64>>,
    /// Version of the artifact that produced the probability, or None for
    /// the heuristic fallback
    pub model_version: Option<String>,
}

/// The 1-minute signals surfaced to callers alongside the verdict.
#[derive(Debug, Clone, Serialize)]
pub struct EarlySigns {
    pub buy_pressure: f64,
    pub growth_rate: f64,
    pub trader_interest: u32,
}

impl Scorer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: ArtifactStore::new(config.model.dir.clone()),
            params: GbdtParams {
                rounds: config.model.rounds,
                learning_rate: config.model.learning_rate,
            },
            thresholds: config.scoring.clone(),
            active: RwLock::new(None),
        }
    }

    /// Load the newest persisted artifact into the active slot. Returns
    /// whether a model is now active. A corrupt store is surfaced as an
    /// error; the caller may keep serving on the heuristic fallback.
    pub fn load_persisted(&self) -> Result<bool> {
        match self.store.load_latest()? {
            Some(artifact) => {
                info!(version = %artifact.version, "loaded persisted model artifact");
                self.publish(Arc::new(artifact));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The currently active artifact, if any.
    pub fn active_model(&self) -> Option<Arc<ModelArtifact>> {
        self.read_lock().clone()
    }

    /// Train a model over historical trades and token metadata, persist it,
    /// and make it the active artifact.
    pub fn train(
        &self,
        trades: &[TradeEvent],
        tokens: &[TokenMetadata],
    ) -> Result<TrainingReport> {
        if trades.is_empty() || tokens.is_empty() {
            return Err(MintscoreError::Input("empty training batch".to_string()));
        }

        let by_mint = group_by_mint(trades);
        let mut token_by_mint: BTreeMap<&str, &TokenMetadata> = BTreeMap::new();
        for token in tokens {
            token_by_mint.entry(token.mint.as_str()).or_insert(token);
        }

        info!(
            trade_mints = by_mint.len(),
            token_mints = token_by_mint.len(),
            "processing training data"
        );

        let mut matrix: Vec<Vec<f64>> = Vec::new();
        let mut labels: Vec<bool> = Vec::new();
        let mut success_rows: Vec<Vec<f64>> = Vec::new();
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut skipped_all_zero = 0usize;
        let mut overlap = 0usize;

        for (mint, mint_trades) in &by_mint {
            let Some(token) = token_by_mint.get(mint.as_str()) else {
                continue;
            };
            overlap += 1;

            let vector = FeatureVector::extract(mint_trades, token)?;
            if vector.is_all_zero() {
                debug!(mint = %mint, "skipping mint with all-zero feature vector");
                skipped_all_zero += 1;
                continue;
            }

            let final_mcap = token.final_market_cap.ok_or_else(|| {
                MintscoreError::Input(format!("token {mint} has no final market cap"))
            })?;
            let outcome = TokenOutcome::classify(mint_trades, final_mcap, &self.thresholds)?;
            // Tags are non-exclusive, so counts may sum past the example count.
            if outcome.success {
                *categories.entry("success".to_string()).or_default() += 1;
            } else if outcome.tags.is_empty() {
                *categories.entry("none".to_string()).or_default() += 1;
            }
            for tag in &outcome.tags {
                *categories.entry(tag.as_str().to_string()).or_default() += 1;
            }

            let row = vector.values();
            if outcome.success {
                success_rows.push(row.clone());
            }
            matrix.push(row);
            labels.push(outcome.success);
        }

        if overlap == 0 {
            return Err(MintscoreError::Input(
                "no overlapping mints between trades and token metadata".to_string(),
            ));
        }
        if matrix.is_empty() {
            return Err(MintscoreError::NoSignal);
        }

        let positives = labels.iter().filter(|l| **l).count();
        info!(
            examples = matrix.len(),
            positives,
            skipped_all_zero,
            "extracted training examples"
        );

        let feature_names = FeatureVector::feature_names();
        let scaler = StandardScaler::fit(&matrix)?;
        let standardized = scaler.transform(&matrix)?;
        let classifier = GbdtClassifier::fit(&standardized, &labels, self.params)?;

        let success_pattern_means = pattern_means(&feature_names, &success_rows);

        let trained_at = Utc::now();
        let artifact = ModelArtifact {
            version: trained_at.format(VERSION_FORMAT).to_string(),
            trained_at,
            feature_names,
            scaler,
            classifier,
            success_pattern_means,
        };

        let top_features = top_importances(&artifact, 10);
        for feature in &top_features {
            debug!(name = %feature.name, importance = feature.importance, "feature importance");
        }

        self.store.save(&artifact)?;
        let report = TrainingReport {
            version: artifact.version.clone(),
            examples: matrix.len(),
            positives,
            skipped_all_zero,
            categories,
            top_features,
        };
        self.publish(Arc::new(artifact));

        info!(version = %report.version, "training complete, artifact published");
        Ok(report)
    }

    /// Score one live candidate from its in-flight trade history and
    /// issuance metadata.
    pub fn predict(&self, trades: &[TradeEvent], token: &TokenMetadata) -> Result<Prediction> {
        let mut trades = trades.to_vec();
        sort_by_time(&mut trades);
        let vector = FeatureVector::extract(&trades, token)?;

        let (probability, pattern_match, model_version) = match self.active_model() {
            Some(artifact) => {
                let aligned = vector.align(&artifact.feature_names);
                let standardized = artifact.scaler.transform_row(&aligned)?;
                let probability = artifact.classifier.predict_probability(&standardized)?;
                let matches = pattern_match_pct(&vector, &artifact.success_pattern_means);
                (probability, Some(matches), Some(artifact.version.clone()))
            }
            None => {
                debug!(mint = %token.mint, "no trained model, scoring with heuristic fallback");
                (heuristic_probability(&vector), None, None)
            }
        };

        let minute = vector.one_minute();
        Ok(Prediction {
            is_promising: probability > self.thresholds.probability_threshold,
            probability,
            analysis: Analysis {
                early_signs: EarlySigns {
                    buy_pressure: minute.buy_pressure,
                    growth_rate: minute.mcap_growth_pct,
                    trader_interest: minute.unique_traders,
                },
                feature_values: vector.named_values().into_iter().collect(),
                pattern_match,
                model_version,
            },
        })
    }

    fn publish(&self, artifact: Arc<ModelArtifact>) {
        *self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(artifact);
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<ModelArtifact>>> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Deterministic pre-training score from raw 1-minute features.
fn heuristic_probability(vector: &FeatureVector) -> f64 {
    let minute = vector.one_minute();
    let mut score = 0.0;

    if minute.trades >= FALLBACK_TRADES_HIGH.0 {
        score += FALLBACK_TRADES_HIGH.1;
    } else if minute.trades >= FALLBACK_TRADES_LOW.0 {
        score += FALLBACK_TRADES_LOW.1;
    }

    if minute.buy_ratio >= FALLBACK_BUY_RATIO_HIGH.0 {
        score += FALLBACK_BUY_RATIO_HIGH.1;
    } else if minute.buy_ratio >= FALLBACK_BUY_RATIO_LOW.0 {
        score += FALLBACK_BUY_RATIO_LOW.1;
    }

    if minute.mcap_growth_pct >= FALLBACK_GROWTH_HIGH.0 {
        score += FALLBACK_GROWTH_HIGH.1;
    } else if minute.mcap_growth_pct >= FALLBACK_GROWTH_LOW.0 {
        score += FALLBACK_GROWTH_LOW.1;
    }

    score
}

fn pattern_means(feature_names: &[String], success_rows: &[Vec<f64>]) -> BTreeMap<String, f64> {
    let mut means = BTreeMap::new();
    if success_rows.is_empty() {
        return means;
    }
    let n = success_rows.len() as f64;
    for (idx, name) in feature_names.iter().enumerate() {
        let sum: f64 = success_rows.iter().map(|row| row[idx]).sum();
        means.insert(name.clone(), sum / n);
    }
    means
}

/// Percent of each non-zero success-pattern mean reached by the candidate.
fn pattern_match_pct(
    vector: &FeatureVector,
    success_pattern_means: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    let values: BTreeMap<String, f64> = vector.named_values().into_iter().collect();
    let mut matches = BTreeMap::new();
    for (name, mean) in success_pattern_means {
        if *mean != 0.0 {
            let value = values.get(name).copied().unwrap_or(0.0);
            matches.insert(name.clone(), value / mean * 100.0);
        }
    }
    matches
}

fn top_importances(artifact: &ModelArtifact, limit: usize) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = artifact
        .feature_names
        .iter()
        .zip(artifact.classifier.feature_importances())
        .map(|(name, importance)| FeatureImportance {
            name: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}
