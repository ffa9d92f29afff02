// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod models;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types outside of crate (for the binaries)
pub use config::{PERSISTENCE, SYMBOLS, TRAINING};
pub use data::{BinanceTransport, CandleSource, RequestThrottle};
pub use domain::VolatilityLevel;
pub use engine::{PredictionService, TrainingOptions, TrainingPipeline};
pub use errors::{VolError, VolResult};
pub use models::{ModelHandle, PredictionResult};

// CLI argument parsing
use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Forecast 5-day volatility of a crypto price ratio", long_about = None)]
pub struct Cli {
    /// Portable model artifact produced by `train`
    #[arg(long, default_value = PERSISTENCE.model.artifact_path)]
    pub model: PathBuf,

    /// Days of daily candles to pull for each leg
    #[arg(long, default_value_t = SYMBOLS.live_days)]
    pub days: i64,

    /// Quote leg (no fallback)
    #[arg(long, default_value = SYMBOLS.quote)]
    pub quote: String,

    /// Base-leg candidate, tried in order. Repeat to override the default list
    #[arg(long = "candidate")]
    pub candidates: Vec<String>,
}

impl Cli {
    pub fn candidates(&self) -> Vec<String> {
        if self.candidates.is_empty() {
            SYMBOLS
                .prediction_candidates
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.candidates.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["ratio-vol"]);
        assert_eq!(cli.model, PathBuf::from("models/crypto_vol_model.onnx"));
        assert_eq!(cli.days, 30);
        assert_eq!(cli.quote, "ETHUSDT");
        assert_eq!(cli.candidates()[0], "LINKUSDT");
        assert_eq!(cli.candidates().len(), 5);
    }

    #[test]
    fn repeated_candidates_override_defaults() {
        let cli = Cli::parse_from(["ratio-vol", "--candidate", "UNIUSDT", "--candidate", "AAVEUSDT"]);
        assert_eq!(cli.candidates(), vec!["UNIUSDT", "AAVEUSDT"]);
    }
}
