use thiserror::Error;

/// Typed failures for the volatility pipelines.
///
/// Library code returns these directly; the binaries wrap them with
/// `anyhow::Context` at the boundary.
#[derive(Error, Debug)]
pub enum VolError {
    // -- Upstream -----------------------------------------------------------
    #[error("upstream unavailable for {symbol}: {reason}")]
    UpstreamUnavailable { symbol: String, reason: String },

    #[error("upstream returned no candles for {symbol}")]
    EmptyResult { symbol: String },

    #[error("all candidate symbols failed: {tried:?}")]
    AllCandidatesExhausted { tried: Vec<String> },

    // -- Features -----------------------------------------------------------
    #[error("insufficient data: {available} rows (need at least {required})")]
    InsufficientData { available: usize, required: usize },

    #[error("non-finite value in feature `{feature}`")]
    NaNFeature { feature: &'static str },

    // -- Model --------------------------------------------------------------
    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced a non-finite forecast: {value}")]
    NonFiniteOutput { value: f64 },

    #[error("model export failed: {0}")]
    ModelExport(String),

    #[error(
        "model shape mismatch: expected {expected_inputs} inputs / {expected_outputs} outputs, found {found_inputs} / {found_outputs}"
    )]
    ModelShapeMismatch {
        expected_inputs: usize,
        expected_outputs: usize,
        found_inputs: usize,
        found_outputs: usize,
    },

    // -- Storage ------------------------------------------------------------
    #[error("invalid CSV row {row}: {reason}")]
    InvalidCsvRow { row: usize, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VolError {
    pub(crate) fn upstream(symbol: &str, reason: impl ToString) -> Self {
        Self::UpstreamUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type VolResult<T> = std::result::Result<T, VolError>;
