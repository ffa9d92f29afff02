//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Log every kline batch request and its returned row count.
    pub log_kline_batches: bool,

    /// Log each training epoch loss (very noisy).
    pub log_epoch_loss: bool,

    /// Log computed feature vectors before they reach the model.
    pub log_features: bool,
}

pub const DF: LogFlags = LogFlags {
    log_kline_batches: true,
    log_epoch_loss: false,
    log_features: true,
};
