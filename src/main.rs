use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use label_scraper::apis::bandcamp::BandcampClient;
use label_scraper::apis::beatport::BeatportClient;
use label_scraper::apis::beatstats::BeatstatsClient;
use label_scraper::apis::songstats::SongstatsClient;
use label_scraper::apis::soundcloud::SoundcloudClient;
use label_scraper::app::label_use_case::LabelUseCase;
use label_scraper::app::top_use_case::TopUseCase;
use label_scraper::config::Config;
use label_scraper::error::{Result, ScraperError};
use label_scraper::infra::http_client::FetchClient;
use label_scraper::infra::sheets::{RestSheetsApi, SheetsGateway};
use label_scraper::logging::init_logging;
use label_scraper::menu::{main_menu, MenuSelection};
use label_scraper::pipeline::orchestrator::WorkerPool;
use label_scraper::types::LabelAction;

#[derive(Parser)]
#[command(name = "label_scraper")]
#[command(about = "Music-label metadata scraper and spreadsheet reconciler")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one of the label enrichment passes
    Labels {
        /// Pass to run: songstats, links or vinyls
        #[arg(long, default_value = "songstats")]
        mode: String,
    },
    /// Scrape the top-100 genre charts and reconcile them into the sheet
    Top100,
}

fn parse_action(mode: &str) -> Result<LabelAction> {
    match mode {
        "songstats" => Ok(LabelAction::Songstats),
        "links" => Ok(LabelAction::Links),
        "vinyls" => Ok(LabelAction::Vinyls),
        other => Err(ScraperError::Config(format!(
            "unknown labels mode: {other} (expected songstats, links or vinyls)"
        ))),
    }
}

async fn run_labels(config: &Config, action: LabelAction) -> Result<()> {
    info!(?action, "###START LABELS PROCESSING###");
    let gateway = Arc::new(SheetsGateway::new(Arc::new(RestSheetsApi::new(
        config.spreadsheet_id.clone(),
        config.sheets_token.clone(),
    ))));
    let fetcher = FetchClient::new();
    let use_case = LabelUseCase::new(
        gateway,
        Arc::new(SongstatsClient::new(fetcher.clone())),
        Arc::new(BeatportClient::new(fetcher.clone())),
        Arc::new(SoundcloudClient::new(fetcher.clone())),
        Arc::new(BandcampClient::new(fetcher)),
        WorkerPool::new(config.worker_count),
    );

    let report = use_case.run(action).await?;
    println!("\n📊 Labels run results:");
    println!("   Selected: {}", report.total);
    println!("   Processed: {}", report.successes.len());
    println!("   Failed: {}", report.failures.len());
    if report.has_activity() {
        let path = report.write("output")?;
        println!("   Report: {path}");
    }
    Ok(())
}

async fn run_top100(config: &Config) -> Result<()> {
    info!("###START TOP100 PROCESSING###");
    let gateway = Arc::new(SheetsGateway::new(Arc::new(RestSheetsApi::new(
        config.spreadsheet_id.clone(),
        config.sheets_token.clone(),
    ))));
    let use_case = TopUseCase::new(
        gateway,
        Arc::new(BeatstatsClient::new(FetchClient::new())),
        WorkerPool::new(config.worker_count),
    );

    let summary = use_case.run().await?;
    println!("\n📊 Top-100 run results:");
    println!("   Genres fetched: {}", summary.genres_fetched);
    println!("   Genres failed: {}", summary.failures.len());
    println!("   Update ops: {}", summary.update_ops);
    for failure in &summary.failures {
        println!("   ⚠️  {}: {}", failure.name, failure.reason);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Some(Commands::Labels { mode }) => run_labels(&config, parse_action(&mode)?).await?,
        Some(Commands::Top100) => run_top100(&config).await?,
        None => match main_menu() {
            Some(MenuSelection::Labels(action)) => run_labels(&config, action).await?,
            Some(MenuSelection::Top100) => run_top100(&config).await?,
            None => println!("👋 Bye"),
        },
    }

    Ok(())
}
