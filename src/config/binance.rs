pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// REST constraints: 1000 klines per call, weight budget, call cost and the pause between batches.
pub struct RestLimits {
    pub klines_limit: i32,
    /// How many intervals one paginated batch spans (one less than the limit so `end` stays inside it).
    pub batch_span_intervals: i64,
    pub weight_limit_minute: u32,
    pub kline_call_weight: u32,
    pub batch_pause_ms: u64,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    /// Zero: a failed request must surface so the resolver can move to the next symbol.
    pub retries: u32,
    pub backoff_ms: u64,
}

pub struct BinanceConfig {
    pub limits: RestLimits,
    pub client: ClientDefaults,
    /// Label stamped on every prediction built from this upstream.
    pub data_source: &'static str,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    limits: RestLimits {
        klines_limit: 1000,
        batch_span_intervals: 999,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
        batch_pause_ms: 100,
    },
    client: ClientDefaults {
        timeout_ms: 10_000,
        retries: 0,
        backoff_ms: 1000,
    },
    data_source: "Binance API",
};
