use {
    crate::{
        config::candle_csv_path,
        domain::{Candle, PairInterval, PriceSeries},
        errors::{VolError, VolResult},
        utils::{format_csv_date, parse_csv_date},
    },
    serde::{Deserialize, Serialize},
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// One CSV row. Column names match what the training scripts have always written.
#[derive(Debug, Serialize, Deserialize)]
struct CandleRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

impl From<&Candle> for CandleRecord {
    fn from(c: &Candle) -> Self {
        Self {
            date: format_csv_date(c.timestamp_ms),
            open: c.open_price,
            high: c.high_price,
            low: c.low_price,
            close: c.close_price,
            volume: c.base_asset_volume,
        }
    }
}

/// One CSV file per symbol under a directory.
pub struct CandleStore {
    directory: PathBuf,
}

impl CandleStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        candle_csv_path(&self.directory, symbol)
    }

    /// Writes (or overwrites) the symbol's CSV, creating the directory if needed.
    pub fn save(&self, series: &PriceSeries) -> VolResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(series.symbol());

        let mut writer = csv::Writer::from_path(&path)?;
        for candle in series.candles() {
            writer.serialize(CandleRecord::from(candle))?;
        }
        writer.flush()?;

        log::info!(
            "💾 Saved {} candles for {} to {}",
            series.len(),
            series.symbol(),
            path.display()
        );
        Ok(path)
    }

    pub fn load(&self, symbol: &str, interval_ms: i64) -> VolResult<PriceSeries> {
        let path = self.path_for(symbol);
        let candles = read_candles(&path)?;
        if candles.is_empty() {
            return Err(VolError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }
        Ok(PriceSeries::new(PairInterval::new(symbol, interval_ms), candles))
    }

    pub fn exists(&self, symbol: &str) -> bool {
        self.path_for(symbol).is_file()
    }
}

fn read_candles(path: &Path) -> VolResult<Vec<Candle>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut candles = Vec::new();

    for (idx, record) in reader.deserialize::<CandleRecord>().enumerate() {
        // Header is line 1
        let row = idx + 2;
        let record = record?;
        let timestamp_ms = parse_csv_date(&record.date).ok_or_else(|| VolError::InvalidCsvRow {
            row,
            reason: format!("unparsable Date `{}`", record.date),
        })?;
        let candle = Candle::new(
            timestamp_ms,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );
        if !candle.is_finite() {
            return Err(VolError::InvalidCsvRow {
                row,
                reason: "non-finite price or volume".to_string(),
            });
        }
        candles.push(candle);
    }
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{daily_series, series};
    use crate::utils::TimeUtils;

    #[test]
    fn save_then_load_preserves_candles() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path().join("nested"));
        let original = series("LINKUSDT", daily_series(19_000, 40, |i| 12.0 + i as f64 * 0.25));

        let path = store.save(&original).unwrap();
        assert!(path.ends_with("linkusdt_data.csv"));
        assert!(store.exists("LINKUSDT"));

        let loaded = store.load("LINKUSDT", TimeUtils::MS_IN_D).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn header_uses_capitalised_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path());
        store
            .save(&series("ETHUSDT", daily_series(19_000, 2, |_| 2000.0)))
            .unwrap();

        let text = fs::read_to_string(store.path_for("ETHUSDT")).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "Date,Open,High,Low,Close,Volume");
    }

    #[test]
    fn bad_date_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path());
        fs::write(
            store.path_for("UNIUSDT"),
            "Date,Open,High,Low,Close,Volume\n2024-01-01 00:00:00,1,1,1,1,1\nyesterday,1,1,1,1,1\n",
        )
        .unwrap();

        let err = store.load("UNIUSDT", TimeUtils::MS_IN_D).unwrap_err();
        assert!(matches!(err, VolError::InvalidCsvRow { row: 3, .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandleStore::new(dir.path());
        assert!(store.load("NOPE", TimeUtils::MS_IN_D).is_err());
    }
}
