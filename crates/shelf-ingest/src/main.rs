//! Shelf Ingest - best-seller listing loader

use clap::{Args, Parser, Subcommand};
use shelf_common::logging::{init_logging, LogConfig, LogLevel};
use shelf_ingest::config::{
    ApiConfig, Config, ListingRequest, DEFAULT_CATEGORY, DEFAULT_COUNTRY, DEFAULT_LISTING_TYPE,
};
use shelf_ingest::pipeline::{self, Pipeline, RunOptions, RunOutcome};
use shelf_ingest::PipelineError;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "shelf-ingest")]
#[command(author, version, about = "Load the best-sellers listing into the products table")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, normalize and upsert the listing
    Run {
        #[command(flatten)]
        listing: ListingArgs,

        /// Stage and print the listing without touching the database
        #[arg(long)]
        dry_run: bool,
    },

    /// Report the API quota headers and exit
    RateLimits {
        #[command(flatten)]
        listing: ListingArgs,
    },
}

#[derive(Args, Debug)]
struct ListingArgs {
    /// Listing category
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    category: String,

    /// Listing type
    #[arg(long, default_value = DEFAULT_LISTING_TYPE)]
    listing_type: String,

    /// Page number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// ISO country code
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,
}

impl From<ListingArgs> for ListingRequest {
    fn from(args: ListingArgs) -> Self {
        Self {
            category: args.category,
            listing_type: args.listing_type,
            page: args.page,
            country: args.country,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .log_file_prefix("shelf-ingest")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    if let Err(e) = execute(cli.command).await {
        error!(error = %e, exit_code = e.exit_code(), "[{}] run failed", e.tag());
        process::exit(e.exit_code());
    }
}

async fn execute(command: Command) -> Result<(), PipelineError> {
    match command {
        Command::Run { listing, dry_run } => {
            let config = Config::load()?;
            let options = RunOptions {
                dry_run,
                print_table: true,
            };
            let mut run = Pipeline::new(&config, listing.into(), options)?;

            match run.run().await? {
                RunOutcome::Empty => info!("Nothing written"),
                RunOutcome::DryRun { rows } => info!(rows, "Dry run complete"),
                RunOutcome::Persisted { rows } => info!(rows, "Ingestion complete"),
            }
        },
        Command::RateLimits { listing } => {
            let api = ApiConfig::load()?;
            let status = pipeline::check_rate_limits(&api, &listing.into()).await?;
            println!("{}", status);
        },
    }

    Ok(())
}
