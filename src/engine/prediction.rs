use {
    crate::{
        analysis::FeatureBuilder,
        config::BINANCE,
        data::{CandleSource, SymbolResolver},
        errors::{VolError, VolResult},
        models::{ModelHandle, PredictionResult, VolatilityModel},
    },
    std::path::Path,
};

/// Online pipeline: resolve a tradable symbol, fetch the quote leg, build
/// features, ask the model, classify.
pub struct PredictionService {
    source: CandleSource,
    model: ModelHandle,
    data_source: String,
}

impl PredictionService {
    pub fn new(source: CandleSource, model: ModelHandle) -> Self {
        Self {
            source,
            model,
            data_source: BINANCE.data_source.to_string(),
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// The first candidate with data becomes the denominator leg; `quote` has
    /// no fallback. Errors propagate unchanged.
    pub async fn predict_live<S: AsRef<str>>(
        &self,
        candidates: &[S],
        quote: &str,
        days: i64,
    ) -> VolResult<PredictionResult> {
        let resolved = SymbolResolver::new(&self.source)
            .resolve(candidates, days)
            .await?;
        let quote_series = self.source.fetch_days(quote, days).await?;

        let features = FeatureBuilder::build(&resolved.series, &quote_series)?;
        let predicted = self.model.read().await.predict(&features)?;
        if !predicted.is_finite() {
            return Err(VolError::NonFiniteOutput { value: predicted });
        }

        let result = PredictionResult::new(
            predicted,
            &resolved.symbol,
            quote,
            features,
            &self.data_source,
        );
        log::info!(
            "📈 {} predicted 5d vol {:.4}% ({})",
            result.trading_pair,
            result.predicted_volatility_5d,
            result.volatility_level
        );
        Ok(result)
    }

    /// Swap in a freshly exported artifact. In-flight predictions finish on
    /// the old model first.
    pub async fn reload_model(&self, path: &Path) -> VolResult<()> {
        let model = VolatilityModel::load(path)?;
        self.model.replace(model).await;
        log::info!("🔄 Reloaded model from {}", path.display());
        Ok(())
    }
}
