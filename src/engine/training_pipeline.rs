//! Offline pipeline: history -> CSV -> features -> fit -> ONNX artifact.

use {
    crate::{
        analysis::{FeatureBuilder, TargetBuilder},
        config::{FEATURES, PERSISTENCE, SYMBOLS, TRAINING},
        data::{CandleSource, CandleStore, SymbolResolver},
        domain::PriceSeries,
        engine::trainer::{Trainer, TrainingReport},
        errors::{VolError, VolResult},
        models::{Mlp, ModelArtifact},
    },
    std::path::PathBuf,
};

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    /// Base-leg symbols, first usable wins
    pub candidates: Vec<String>,
    pub quote: String,
    pub days_back: i64,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub seed: u64,
    pub hidden_layers: Vec<usize>,
    pub stages: Vec<usize>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            candidates: SYMBOLS
                .training_candidates
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quote: SYMBOLS.quote.to_string(),
            days_back: TRAINING.history_days,
            data_dir: PathBuf::from(PERSISTENCE.candles.directory),
            output: PathBuf::from(PERSISTENCE.model.artifact_path),
            seed: TRAINING.seed,
            hidden_layers: TRAINING.hidden_layers.to_vec(),
            stages: TRAINING.epoch_schedule.epochs(),
        }
    }
}

/// The two legs a model is trained on.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub symbol: String,
    pub base: PriceSeries,
    pub quote: PriceSeries,
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub symbol: String,
    pub quote: String,
    pub feature_rows: usize,
    pub report: TrainingReport,
    pub network: Mlp,
    pub artifact_path: PathBuf,
}

pub struct TrainingPipeline {
    options: TrainingOptions,
    store: CandleStore,
}

impl TrainingPipeline {
    pub fn new(options: TrainingOptions) -> Self {
        let store = CandleStore::new(options.data_dir.clone());
        Self { options, store }
    }

    /// Resolve the base leg, fetch the quote leg, and save both as CSV.
    pub async fn download(&self, source: &CandleSource) -> VolResult<TrainingData> {
        log::info!(
            "📥 Downloading {} days of history (candidates {:?}, quote {})",
            self.options.days_back,
            self.options.candidates,
            self.options.quote
        );
        let resolved = SymbolResolver::new(source)
            .resolve(&self.options.candidates, self.options.days_back)
            .await?;
        let quote = source
            .fetch_days(&self.options.quote, self.options.days_back)
            .await?;

        self.store.save(&resolved.series)?;
        self.store.save(&quote)?;

        Ok(TrainingData {
            symbol: resolved.symbol,
            base: resolved.series,
            quote,
        })
    }

    /// Read previously saved CSVs. The first candidate with a file on disk wins.
    pub fn load_saved(&self, interval_ms: i64) -> VolResult<TrainingData> {
        let symbol = self
            .options
            .candidates
            .iter()
            .find(|s| self.store.exists(s))
            .ok_or_else(|| VolError::AllCandidatesExhausted {
                tried: self.options.candidates.clone(),
            })?;
        log::info!(
            "📂 Loading saved candles for {} and {} from {}",
            symbol,
            self.options.quote,
            self.options.data_dir.display()
        );

        Ok(TrainingData {
            symbol: symbol.clone(),
            base: self.store.load(symbol, interval_ms)?,
            quote: self.store.load(&self.options.quote, interval_ms)?,
        })
    }

    /// Features, targets, fit, export.
    pub fn train(&self, data: TrainingData) -> VolResult<TrainingOutcome> {
        let rows = FeatureBuilder::build_series(&data.base, &data.quote)?;
        let set = TargetBuilder::build(&rows, FEATURES.horizon)?;

        let (network, report) = Trainer::new(self.options.seed)
            .with_hidden_layers(self.options.hidden_layers.clone())
            .with_stages(self.options.stages.clone())
            .fit(&set)?;

        ModelArtifact::export(&network, FEATURES.width)?.save(&self.options.output)?;

        Ok(TrainingOutcome {
            symbol: data.symbol,
            quote: self.options.quote.clone(),
            feature_rows: rows.len(),
            report,
            network,
            artifact_path: self.options.output.clone(),
        })
    }
}
