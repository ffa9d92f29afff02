mod bn_kline;
mod csv_store;
mod provider;
mod rate_limiter;
mod resolver;

pub use {
    bn_kline::BinanceTransport,
    csv_store::CandleStore,
    provider::{CandleSource, KlineRequest, KlineTransport},
    rate_limiter::RequestThrottle,
    resolver::{ResolvedSeries, SymbolResolver},
};
