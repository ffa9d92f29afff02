mod maths_utils;
mod time_utils;

pub use time_utils::{
    TimeUtils, epoch_ms_to_datetime, format_csv_date, now_timestamp_ms, parse_csv_date,
};

pub(crate) use maths_utils::{pct_returns, rolling_sample_std_dev, sample_std_dev, scaled_rmse};
