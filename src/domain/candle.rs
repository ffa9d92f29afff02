use {
    crate::utils::epoch_ms_to_datetime,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// One OHLCV bar, keyed by its open time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub base_asset_volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            base_asset_volume: volume,
        }
    }

    /// Open time as a UTC instant.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        epoch_ms_to_datetime(self.timestamp_ms)
    }

    pub fn is_finite(&self) -> bool {
        [
            self.open_price,
            self.high_price,
            self.low_price,
            self.close_price,
            self.base_asset_volume,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
