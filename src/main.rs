use {
    anyhow::{Context, Result},
    clap::Parser,
    ratio_vol::{BinanceTransport, CandleSource, Cli, ModelHandle, PredictionService, RequestThrottle},
    std::{panic, sync::Arc},
};

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Info)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some("ratio_vol"), my_code_level)
        .init();

    let args = Cli::parse();

    let model = ModelHandle::load(&args.model)
        .with_context(|| format!("Failed to load model from {}", args.model.display()))?;
    let transport = BinanceTransport::new().context("Failed to configure Binance client")?;
    let source = CandleSource::new(Arc::new(transport), RequestThrottle::default());
    let service = PredictionService::new(source, model);

    let candidates = args.candidates();
    let result = service
        .predict_live(&candidates, &args.quote, args.days)
        .await
        .with_context(|| format!("Prediction failed for candidates {:?}", candidates))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Failed to serialize prediction")?
    );
    Ok(())
}
