//! Fakes and synthetic data shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    data::{KlineRequest, KlineTransport},
    domain::{Candle, PairInterval, PriceSeries},
    errors::{VolError, VolResult},
    utils::{TimeUtils, now_timestamp_ms},
};

const DAY: i64 = TimeUtils::MS_IN_D;

/// `count` daily candles starting at `first_day` (days since epoch), open = `open(i)`.
pub fn daily_series(first_day: i64, count: usize, open: impl Fn(usize) -> f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let price = open(i);
            Candle::new((first_day + i as i64) * DAY, price, price * 1.01, price * 0.99, price, 10.0)
        })
        .collect()
}

/// `count` daily candles whose last open time is today's UTC midnight.
pub fn recent_daily_series(count: usize, open: impl Fn(usize) -> f64) -> Vec<Candle> {
    let today = now_timestamp_ms() / DAY;
    daily_series(today - count as i64 + 1, count, open)
}

pub fn series(symbol: &str, candles: Vec<Candle>) -> PriceSeries {
    PriceSeries::new(PairInterval::daily(symbol), candles)
}

/// Deterministic wiggle so returns are not constant.
pub fn wavy_price(base: f64, i: usize) -> f64 {
    let t = i as f64;
    base * (1.0 + 0.03 * (t * 0.7).sin() + 0.01 * (t * 1.9).cos())
}

#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    Empty,
    Unavailable,
}

/// In-memory kline endpoint. Serves candles whose open time lies in the
/// requested range, capped at `limit`, and records every request.
#[derive(Default)]
pub struct FakeTransport {
    series: HashMap<String, Vec<Candle>>,
    failures: HashMap<String, FakeFailure>,
    fail_on_requests: HashSet<usize>,
    overlap: usize,
    requests: Mutex<Vec<KlineRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.series.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_failure(mut self, symbol: &str, failure: FakeFailure) -> Self {
        self.failures.insert(symbol.to_string(), failure);
        self
    }

    /// Also return this many candles from before the requested start.
    pub fn with_overlap(mut self, candles: usize) -> Self {
        self.overlap = candles;
        self
    }

    /// Fail the n-th request (0-based) with `UpstreamUnavailable`.
    pub fn fail_on_request(mut self, index: usize) -> Self {
        self.fail_on_requests.insert(index);
        self
    }

    pub fn requests(&self) -> Vec<KlineRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.pair_interval.name)
            .collect()
    }
}

#[async_trait]
impl KlineTransport for FakeTransport {
    async fn klines(&self, request: &KlineRequest) -> VolResult<Vec<Candle>> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        let symbol = request.pair_interval.name();

        if self.fail_on_requests.contains(&index) {
            return Err(VolError::upstream(symbol, "injected failure"));
        }
        match self.failures.get(symbol) {
            Some(FakeFailure::Empty) => return Ok(Vec::new()),
            Some(FakeFailure::Unavailable) => {
                return Err(VolError::upstream(symbol, "HTTP 503"));
            }
            None => {}
        }

        let Some(candles) = self.series.get(symbol) else {
            return Ok(Vec::new());
        };

        let first_in_range = candles
            .iter()
            .position(|c| c.timestamp_ms >= request.start_time_ms)
            .unwrap_or(candles.len());
        let from = first_in_range.saturating_sub(self.overlap);

        Ok(candles[from..]
            .iter()
            .filter(|c| c.timestamp_ms <= request.end_time_ms)
            .take(request.limit.max(0) as usize)
            .copied()
            .collect())
    }
}
