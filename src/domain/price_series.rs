use {
    crate::domain::{Candle, PairInterval},
    itertools::Itertools,
    serde::{Deserialize, Serialize},
};

/// Candles for one symbol, ascending by open time, unique timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub pair_interval: PairInterval,
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Sorts and drops repeated timestamps (first occurrence wins).
    pub fn new(pair_interval: PairInterval, candles: Vec<Candle>) -> Self {
        let candles = candles
            .into_iter()
            .sorted_by_key(|c| c.timestamp_ms)
            .dedup_by(|a, b| a.timestamp_ms == b.timestamp_ms)
            .collect();
        Self {
            pair_interval,
            candles,
        }
    }

    /// Merge paginated batches. Overlapping batch boundaries collapse to one candle.
    pub fn from_batches(pair_interval: PairInterval, batches: Vec<Vec<Candle>>) -> Self {
        Self::new(pair_interval, batches.into_iter().flatten().collect())
    }

    pub fn symbol(&self) -> &str {
        self.pair_interval.name()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn first_timestamp_ms(&self) -> Option<i64> {
        self.candles.first().map(|c| c.timestamp_ms)
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.candles.last().map(|c| c.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: i64, open: f64) -> Candle {
        Candle::new(ts, open, open, open, open, 1.0)
    }

    #[test]
    fn batches_merge_sorted_and_unique() {
        let pair = PairInterval::daily("ETHUSDT");
        let batches = vec![
            vec![candle(3, 3.0), candle(4, 4.0), candle(5, 5.0)],
            vec![candle(1, 1.0), candle(2, 2.0), candle(3, 30.0)],
            vec![candle(5, 50.0), candle(6, 6.0)],
        ];
        let series = PriceSeries::from_batches(pair, batches);
        let stamps: Vec<i64> = series.candles().iter().map(|c| c.timestamp_ms).collect();
        assert_eq!(stamps, vec![1, 2, 3, 4, 5, 6]);
        // Stable sort keeps the earlier batch's candle for a repeated timestamp.
        assert_eq!(series.candles()[2].open_price, 3.0);
        assert_eq!(series.candles()[4].open_price, 5.0);
    }
}
