//! Which pairs the pipelines look at. Order matters: first usable wins.

pub struct SymbolConfig {
    /// Denominator leg for prediction, tried in order
    pub prediction_candidates: &'static [&'static str],
    /// Denominator leg for training, tried in order
    pub training_candidates: &'static [&'static str],
    /// Numerator leg; no fallback
    pub quote: &'static str,
    /// Days of history the live prediction pulls
    pub live_days: i64,
}

pub const SYMBOLS: SymbolConfig = SymbolConfig {
    prediction_candidates: &["LINKUSDT", "UNIUSDT", "AAVEUSDT", "SUSHIUSDT", "1INCHUSDT"],
    training_candidates: &["LINKUSDT", "UNIUSDT", "AAVEUSDT", "SUSHIUSDT"],
    quote: "ETHUSDT",
    live_days: 30,
};
