pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use homescout_core::ListingType;

#[derive(Debug, Parser)]
#[command(
    name = "homescout",
    about = "Conversational real-estate search assistant",
    long_about = "Chat with an LLM-backed assistant that searches property listings, \
or drive the listing search pipeline directly without a model.",
    after_help = "Examples:\n  homescout chat\n  homescout search \"San Jose, CA\" --min-price 1000000 --max-price 2000000 --min-beds 3\n  homescout config"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Start an interactive chat session with the assistant")]
    Chat(GlobalArgs),
    #[command(about = "Run one structured listing search without the LLM")]
    Search(SearchArgs),
    #[command(about = "Print the effective configuration with secrets redacted")]
    Config(GlobalArgs),
}

#[derive(Clone, Debug, Default, Args)]
pub struct GlobalArgs {
    #[arg(long, help = "Path to a homescout.toml config file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Override the logging level (trace|debug|info|warn|error)")]
    pub log_level: Option<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[arg(help = "Location to search: city, neighborhood, address, or zip code")]
    pub location: String,
    #[arg(long, help = "Listing type: for_sale|sold|for_rent|pending")]
    pub listing_type: Option<ListingType>,
    #[arg(long, help = "Search radius in miles")]
    pub radius: Option<f64>,
    #[arg(long, help = "Lowest acceptable list price in dollars")]
    pub min_price: Option<i64>,
    #[arg(long, help = "Highest acceptable list price in dollars")]
    pub max_price: Option<i64>,
    #[arg(long, help = "Minimum number of bedrooms")]
    pub min_beds: Option<u32>,
    #[arg(long, help = "Minimum number of bathrooms; half baths count as 0.5")]
    pub min_baths: Option<f64>,
    #[arg(long, help = "Cap on rendered listings for this search")]
    pub limit: Option<usize>,
    #[arg(long, help = "Export the raw result collection to the data directory as CSV")]
    pub export: bool,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat(args) => commands::chat::run(args).await,
        Command::Search(args) => commands::search::run(args).await,
        Command::Config(args) => commands::config::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
