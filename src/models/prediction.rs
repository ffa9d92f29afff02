use {
    crate::{analysis::FeatureVector, config::FEATURES, domain::VolatilityLevel},
    chrono::{DateTime, Utc},
    serde::Serialize,
};

/// One live forecast, ready to hand to whatever serves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Forecast realized volatility over the next 5 periods, in percent
    pub predicted_volatility_5d: f64,
    pub annualized_volatility: f64,
    pub volatility_level: VolatilityLevel,
    /// "{symbol}/{quote}"
    pub trading_pair: String,
    pub features: FeatureVector,
    pub timestamp: DateTime<Utc>,
    pub data_source: String,
}

impl PredictionResult {
    pub fn new(
        predicted: f64,
        symbol: &str,
        quote: &str,
        features: FeatureVector,
        data_source: &str,
    ) -> Self {
        Self {
            predicted_volatility_5d: predicted,
            annualized_volatility: annualize(predicted),
            volatility_level: VolatilityLevel::classify(predicted),
            trading_pair: format!("{}/{}", symbol, quote),
            features,
            timestamp: Utc::now(),
            data_source: data_source.to_string(),
        }
    }
}

pub fn annualize(volatility: f64) -> f64 {
    volatility * FEATURES.trading_days_per_year.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_tier_pair_and_annualized_value() {
        let result = PredictionResult::new(
            3.0,
            "LINKUSDT",
            "ETHUSDT",
            FeatureVector::new(2.0, 1.5),
            "Binance API",
        );
        assert_eq!(result.trading_pair, "LINKUSDT/ETHUSDT");
        assert_eq!(result.volatility_level, VolatilityLevel::Moderate);
        assert!((result.annualized_volatility - 3.0 * 252f64.sqrt()).abs() < 1e-12);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["volatility_level"], "MODERATE");
        assert_eq!(json["features"]["returns_squared"], 1.5);
        assert_eq!(json["data_source"], "Binance API");
    }
}
