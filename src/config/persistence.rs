//! File persistence configuration
use std::path::{Path, PathBuf};

/// Configuration for downloaded candle CSVs
pub struct CandlePersistenceConfig {
    /// Directory path for storing one CSV per symbol
    pub directory: &'static str,
    /// Suffix appended to the lower-cased symbol
    pub filename_suffix: &'static str,
}

/// Configuration for the exported model artifact
pub struct ModelPersistenceConfig {
    /// Default path the exporter writes to and the prediction binary loads from
    pub artifact_path: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub candles: CandlePersistenceConfig,
    pub model: ModelPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    candles: CandlePersistenceConfig {
        directory: "candle_data",
        filename_suffix: "_data.csv",
    },
    model: ModelPersistenceConfig {
        artifact_path: "models/crypto_vol_model.onnx",
    },
};

/// Example: "LINKUSDT" -> "linkusdt_data.csv"
pub fn candle_csv_filename(symbol: &str) -> String {
    format!(
        "{}{}",
        symbol.to_lowercase(),
        PERSISTENCE.candles.filename_suffix
    )
}

pub fn candle_csv_path(directory: &Path, symbol: &str) -> PathBuf {
    directory.join(candle_csv_filename(symbol))
}
