use {
    anyhow::{Context, Result},
    clap::Parser,
    ratio_vol::{
        BinanceTransport, CandleSource, PERSISTENCE, RequestThrottle, TRAINING, TrainingOptions,
        TrainingPipeline, utils::TimeUtils,
    },
    std::{path::PathBuf, sync::Arc},
    tabled::{Table, Tabled},
};

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train the pair-ratio volatility model and export it")]
struct Args {
    /// Days of daily history to download
    #[arg(long, default_value_t = TRAINING.history_days)]
    days_back: i64,

    /// Where the exported model artifact is written
    #[arg(long, default_value = PERSISTENCE.model.artifact_path)]
    output: PathBuf,

    /// Directory for the per-symbol candle CSVs
    #[arg(long, default_value = PERSISTENCE.candles.directory)]
    data_dir: PathBuf,

    /// Skip the download and train from CSVs saved by an earlier run
    #[arg(long, default_value_t = false)]
    from_csv: bool,

    /// Weight-initialisation seed
    #[arg(long, default_value_t = TRAINING.seed)]
    seed: u64,
}

#[derive(Tabled)]
struct StageRow {
    #[tabled(rename = "Stage")]
    stage: usize,
    #[tabled(rename = "Epochs")]
    epochs: usize,
    #[tabled(rename = "Total")]
    cumulative: usize,
    #[tabled(rename = "Train loss")]
    train_loss: String,
    #[tabled(rename = "Test RMSE")]
    test_rmse: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let pipeline = TrainingPipeline::new(TrainingOptions {
        days_back: args.days_back,
        output: args.output,
        data_dir: args.data_dir,
        seed: args.seed,
        ..TrainingOptions::default()
    });

    let data = if args.from_csv {
        pipeline
            .load_saved(TimeUtils::MS_IN_D)
            .context("Failed to load saved candles. Run once without --from-csv first")?
    } else {
        let transport = BinanceTransport::new().context("Failed to configure Binance client")?;
        let source = CandleSource::new(Arc::new(transport), RequestThrottle::default());
        pipeline
            .download(&source)
            .await
            .context("Failed to download training history")?
    };

    let outcome = pipeline.train(data).context("Training failed")?;

    let rows: Vec<StageRow> = outcome
        .report
        .stages
        .iter()
        .map(|s| StageRow {
            stage: s.stage,
            epochs: s.epochs,
            cumulative: s.cumulative_epochs,
            train_loss: format!("{:.6}", s.train_loss),
            test_rmse: format!("{:.6}", s.test_rmse),
        })
        .collect();

    println!("\nPair: {}/{}", outcome.symbol, outcome.quote);
    println!(
        "Feature rows: {} ({} train / {} test)",
        outcome.feature_rows, outcome.report.train_examples, outcome.report.test_examples
    );
    println!("{}", Table::new(rows));
    println!("Model saved to {}", outcome.artifact_path.display());
    Ok(())
}
