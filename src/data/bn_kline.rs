use {
    async_trait::async_trait,
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    std::fmt,
};

use crate::{
    config::BinanceApiConfig,
    data::{KlineRequest, KlineTransport},
    domain::{Candle, PairInterval},
    errors::{VolError, VolResult},
    utils::TimeUtils,
};

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    use TimeUtils as T;
    match ms {
        T::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        T::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        T::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        T::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        T::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        T::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        T::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        T::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        T::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        T::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        T::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        T::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        T::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        T::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        T::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        T::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

/// One decoded kline row. Only the first six of the twelve columns are kept.
#[derive(Debug, PartialOrd, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub base_asset_volume: Option<f64>,
}

#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    MissingField { open_time: i64, field: &'static str },
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BNKlineError::MissingField { open_time, field } => {
                write!(f, "Kline at {} has no parsable {}", open_time, field)
            }
        }
    }
}

impl std::error::Error for BNKlineError {}

fn convert_kline_item_inner_enum_string_to_float(kline: Option<KlinesItemInner>) -> Option<f64> {
    kline.and_then(|inner| {
        if let KlinesItemInner::String(s) = inner {
            s.parse::<f64>().ok()
        } else {
            None
        }
    })
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };

        Ok(BNKline {
            open_timestamp_ms,
            open_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            high_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            low_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            close_price: convert_kline_item_inner_enum_string_to_float(items.next()),
            base_asset_volume: convert_kline_item_inner_enum_string_to_float(items.next()),
        })
    }
}

impl TryFrom<BNKline> for Candle {
    type Error = BNKlineError;

    fn try_from(bn: BNKline) -> Result<Self, Self::Error> {
        let require = |value: Option<f64>, field: &'static str| {
            value
                .filter(|v| v.is_finite())
                .ok_or(BNKlineError::MissingField {
                    open_time: bn.open_timestamp_ms,
                    field,
                })
        };
        Ok(Candle::new(
            bn.open_timestamp_ms,
            require(bn.open_price, "open")?,
            require(bn.high_price, "high")?,
            require(bn.low_price, "low")?,
            require(bn.close_price, "close")?,
            require(bn.base_asset_volume, "volume")?,
        ))
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<Candle>, BNKlineError> {
    data.into_iter()
        .map(|row| BNKline::try_from(row).and_then(Candle::try_from))
        .collect()
}

fn configure_binance_client() -> Result<RestApi, anyhow::Error> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    // Create the Spot REST API client
    let rest_client = SpotRestApi::production(rest_conf);
    Ok(rest_client)
}

/// Production [`KlineTransport`]: Binance Spot `GET /api/v3/klines`.
pub struct BinanceTransport {
    rest_client: RestApi,
}

impl BinanceTransport {
    pub fn new() -> VolResult<Self> {
        let rest_client = configure_binance_client()
            .map_err(|e| VolError::upstream("binance", format!("client setup failed: {:#}", e)))?;
        Ok(Self { rest_client })
    }
}

fn log_connector_error(e: &anyhow::Error, pair_interval: &PairInterval) {
    if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
        match conn_err {
            connection_error::ConnectorClientError(msg) => {
                log::error!(
                    "{} Client error: Check your request parameters. {}",
                    pair_interval,
                    msg
                );
            }
            connection_error::TooManyRequestsError(msg) => {
                log::warn!(
                    "{} Rate limit exceeded. Please wait and try again. {}",
                    pair_interval,
                    msg
                );
            }
            connection_error::RateLimitBanError(msg) => {
                log::error!(
                    "{} IP address banned due to excessive rate limits. {}",
                    pair_interval,
                    msg
                );
            }
            errors::ConnectorError::ServerError { msg, status_code } => {
                log::error!(
                    "{} Server error: {} (status code: {:?})",
                    pair_interval,
                    msg,
                    status_code
                );
            }
            errors::ConnectorError::NetworkError(msg) => {
                log::error!(
                    "{} Network error: Check your internet connection. {}",
                    pair_interval,
                    msg
                );
            }
            errors::ConnectorError::NotFoundError(msg) => {
                log::error!("{} Resource not found. {}", pair_interval, msg);
            }
            connection_error::BadRequestError(msg) => {
                log::warn!(
                    "{} Bad request (unknown or delisted symbol?). {}",
                    pair_interval,
                    msg
                );
            }
            other => {
                log::error!("Unexpected ConnectionError variant: {:?}", other);
            }
        }
    } else {
        log::error!(
            "An unexpected error occurred for {}: {:#}",
            pair_interval,
            e
        );
    }
}

#[async_trait]
impl KlineTransport for BinanceTransport {
    async fn klines(&self, request: &KlineRequest) -> VolResult<Vec<Candle>> {
        let pair_interval = &request.pair_interval;
        let symbol = pair_interval.bn_name();

        let interval = try_interval_from_ms(pair_interval.interval_ms)
            .map_err(|reason| VolError::upstream(symbol, reason))?;

        let params = KlinesParams::builder(symbol.to_string(), interval)
            .limit(request.limit)
            .start_time(Some(request.start_time_ms))
            .end_time(Some(request.end_time_ms))
            .build()
            .map_err(|e| VolError::upstream(symbol, format!("bad request params: {}", e)))?;

        let data = match self.rest_client.klines(params).await {
            Ok(response) => response.data().await.map_err(|e| {
                log::error!("{} Failed to read kline response body: {}", pair_interval, e);
                VolError::upstream(symbol, e.to_string())
            })?,
            Err(e) => {
                log_connector_error(&e, pair_interval);
                return Err(VolError::upstream(symbol, format!("{:#}", e)));
            }
        };

        convert_klines(data).map_err(|e| {
            VolError::upstream(symbol, format!("{} convert_klines failed: {}", pair_interval, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(open: &str) -> Vec<KlinesItemInner> {
        vec![
            KlinesItemInner::Integer(1_700_006_400_000),
            KlinesItemInner::String(open.to_string()),
            KlinesItemInner::String("12.5".to_string()),
            KlinesItemInner::String("11.0".to_string()),
            KlinesItemInner::String("12.0".to_string()),
            KlinesItemInner::String("1500.25".to_string()),
            KlinesItemInner::Integer(1_700_092_799_999),
            KlinesItemInner::String("18000.0".to_string()),
            KlinesItemInner::Integer(321),
            KlinesItemInner::String("700.0".to_string()),
            KlinesItemInner::String("8400.0".to_string()),
            KlinesItemInner::String("0".to_string()),
        ]
    }

    #[test]
    fn decodes_first_six_columns() {
        let candles = convert_klines(vec![row("11.75")]).unwrap();
        assert_eq!(candles.len(), 1);
        let c = candles[0];
        assert_eq!(c.timestamp_ms, 1_700_006_400_000);
        assert_eq!(c.open_price, 11.75);
        assert_eq!(c.high_price, 12.5);
        assert_eq!(c.low_price, 11.0);
        assert_eq!(c.close_price, 12.0);
        assert_eq!(c.base_asset_volume, 1500.25);
    }

    #[test]
    fn unparsable_price_is_rejected() {
        let err = convert_klines(vec![row("n/a")]).unwrap_err();
        assert!(matches!(
            err,
            BNKlineError::MissingField { field: "open", .. }
        ));
    }

    #[test]
    fn daily_interval_maps_to_1d() {
        assert!(matches!(
            try_interval_from_ms(TimeUtils::MS_IN_D),
            Ok(KlinesIntervalEnum::Interval1d)
        ));
        assert!(try_interval_from_ms(42).is_err());
    }
}
