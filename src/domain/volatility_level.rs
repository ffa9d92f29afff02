use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

/// Risk tier for a 5-period volatility forecast (percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityLevel {
    pub const MODERATE_FROM: f64 = 2.0;
    pub const HIGH_FROM: f64 = 5.0;
    pub const EXTREME_FROM: f64 = 10.0;

    /// Non-finite input never gets here (features reject it), but NaN lands in `Extreme`.
    pub fn classify(predicted_vol_pct: f64) -> Self {
        if predicted_vol_pct < Self::MODERATE_FROM {
            Self::Low
        } else if predicted_vol_pct < Self::HIGH_FROM {
            Self::Moderate
        } else if predicted_vol_pct < Self::EXTREME_FROM {
            Self::High
        } else {
            Self::Extreme
        }
    }
}
