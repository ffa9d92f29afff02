// Domain types and value objects
mod candle;
mod pair_interval;
mod price_series;
mod volatility_level;

// Re-export commonly used types to the world
pub use candle::Candle;
pub use pair_interval::PairInterval;
pub use price_series::PriceSeries;
pub use volatility_level::VolatilityLevel;
