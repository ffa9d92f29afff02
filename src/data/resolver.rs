use crate::{
    data::CandleSource,
    domain::PriceSeries,
    errors::{VolError, VolResult},
};

/// Outcome of a fallback walk over candidate symbols.
#[derive(Debug)]
pub struct ResolvedSeries {
    pub series: PriceSeries,
    pub symbol: String,
    /// Candidates tried before `symbol`, with the failure that ruled each out.
    pub skipped: Vec<(String, VolError)>,
}

/// Tries candidate symbols in order until one yields data.
///
/// A single illiquid or delisted pair must not sink the pipeline when a
/// substitute exists, so every per-candidate failure is logged and the walk
/// moves on. Only when all candidates fail does the caller see an error.
pub struct SymbolResolver<'a> {
    source: &'a CandleSource,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(source: &'a CandleSource) -> Self {
        Self { source }
    }

    pub async fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
        days: i64,
    ) -> VolResult<ResolvedSeries> {
        let mut skipped = Vec::new();

        for candidate in candidates {
            let symbol = candidate.as_ref();
            match self.source.fetch_days(symbol, days).await {
                Ok(series) => {
                    if !skipped.is_empty() {
                        log::info!(
                            "Using {} after skipping {} candidate(s)",
                            symbol,
                            skipped.len()
                        );
                    }
                    return Ok(ResolvedSeries {
                        series,
                        symbol: symbol.to_string(),
                        skipped,
                    });
                }
                Err(e) => {
                    log::warn!("⚠ {} failed: {}. Trying next candidate...", symbol, e);
                    skipped.push((symbol.to_string(), e));
                }
            }
        }

        Err(VolError::AllCandidatesExhausted {
            tried: skipped.into_iter().map(|(symbol, _)| symbol).collect(),
        })
    }
}
