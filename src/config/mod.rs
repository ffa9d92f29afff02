//! Configuration module for the volatility pipelines.

// Can all be private now because we have a public re-export.
mod binance;
mod debug;
mod features;
mod persistence;
mod symbols;
mod training;

// Re-export commonly used items
pub use binance::{BINANCE, BinanceApiConfig};
pub use debug::DF;
pub use features::{FEATURES, FeatureConfig};
pub use persistence::{PERSISTENCE, candle_csv_filename, candle_csv_path};
pub use symbols::SYMBOLS;
pub use training::{EpochSchedule, RmsPropConfig, TRAINING, TrainingConfig};
