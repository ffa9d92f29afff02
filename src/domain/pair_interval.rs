use {
    crate::utils::TimeUtils,
    serde::{Deserialize, Serialize},
};

/// A symbol at a candle resolution. Mostly used to label log lines.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            name: name.into(),
            interval_ms,
        }
    }

    pub fn daily(name: impl Into<String>) -> Self {
        Self::new(name, TimeUtils::MS_IN_D)
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub(crate) fn bn_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.name,
            TimeUtils::interval_to_string(self.interval_ms)
        )
    }
}
