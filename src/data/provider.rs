use std::sync::Arc;

use async_trait::async_trait;

#[cfg(debug_assertions)]
use crate::config::DF;
use crate::{
    config::BINANCE,
    data::RequestThrottle,
    domain::{Candle, PairInterval, PriceSeries},
    errors::{VolError, VolResult},
    utils::{TimeUtils, now_timestamp_ms},
};

/// One upstream kline call.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineRequest {
    pub pair_interval: PairInterval,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub limit: i32,
}

/// Abstract interface for the raw kline endpoint. Production uses
/// [`BinanceTransport`](crate::data::BinanceTransport); tests inject a fake.
#[async_trait]
pub trait KlineTransport: Send + Sync {
    /// Candles whose open time falls inside `[start_time_ms, end_time_ms]`, at most `limit`.
    async fn klines(&self, request: &KlineRequest) -> VolResult<Vec<Candle>>;
}

/// Fetches candle series, one request or paginated.
#[derive(Clone)]
pub struct CandleSource {
    transport: Arc<dyn KlineTransport>,
    limiter: RequestThrottle,
    interval_ms: i64,
}

impl CandleSource {
    pub fn new(transport: Arc<dyn KlineTransport>, limiter: RequestThrottle) -> Self {
        Self {
            transport,
            limiter,
            interval_ms: TimeUtils::MS_IN_D,
        }
    }

    /// Single request. `EmptyResult` when the range holds no candles.
    pub async fn fetch(
        &self,
        symbol: &str,
        interval_ms: i64,
        start_ms: i64,
        end_ms: i64,
        limit: i32,
    ) -> VolResult<PriceSeries> {
        let pair_interval = PairInterval::new(symbol, interval_ms);
        let candles = self
            .fetch_batch(&pair_interval, start_ms, end_ms, limit)
            .await?;
        Ok(PriceSeries::new(pair_interval, candles))
    }

    /// Paginated download of `[start_ms, end_ms]`. Each batch spans at most
    /// `batch_span_intervals` candles; the next batch starts 1ms after the
    /// previous batch's end. Any failing batch aborts the whole download.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        interval_ms: i64,
        start_ms: i64,
        end_ms: i64,
    ) -> VolResult<PriceSeries> {
        let pair_interval = PairInterval::new(symbol, interval_ms);
        let batch_span_ms = BINANCE.limits.batch_span_intervals * interval_ms;

        let mut batches: Vec<Vec<Candle>> = Vec::new();
        let mut current_start = start_ms;

        while current_start < end_ms {
            let current_end = (current_start + batch_span_ms).min(end_ms);
            let batch = self
                .fetch_batch(
                    &pair_interval,
                    current_start,
                    current_end,
                    BINANCE.limits.klines_limit,
                )
                .await?;
            batches.push(batch);
            current_start = current_end + 1;
        }

        if batches.is_empty() {
            return Err(VolError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }

        let series = PriceSeries::from_batches(pair_interval, batches);
        log::info!(
            "Total {} candles for {}",
            series.len(),
            series.pair_interval
        );
        Ok(series)
    }

    /// The last `days` days up to now at this source's interval.
    pub async fn fetch_days(&self, symbol: &str, days: i64) -> VolResult<PriceSeries> {
        let end_ms = now_timestamp_ms();
        let start_ms = end_ms - days * TimeUtils::MS_IN_D;
        self.fetch_range(symbol, self.interval_ms, start_ms, end_ms)
            .await
    }

    async fn fetch_batch(
        &self,
        pair_interval: &PairInterval,
        start_ms: i64,
        end_ms: i64,
        limit: i32,
    ) -> VolResult<Vec<Candle>> {
        self.limiter
            .acquire(BINANCE.limits.kline_call_weight, pair_interval.name())
            .await;

        let request = KlineRequest {
            pair_interval: pair_interval.clone(),
            start_time_ms: start_ms,
            end_time_ms: end_ms,
            limit,
        };
        let candles = self.transport.klines(&request).await?;

        #[cfg(debug_assertions)]
        if DF.log_kline_batches {
            log::info!(
                "{}: {} candles in [{}, {}]",
                pair_interval,
                candles.len(),
                start_ms,
                end_ms
            );
        }

        if candles.is_empty() {
            return Err(VolError::EmptyResult {
                symbol: pair_interval.name().to_string(),
            });
        }
        Ok(candles)
    }
}
