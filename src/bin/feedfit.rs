//! # FeedFit CLI
//!
//! Upload a feed screenshot and two candidate pictures, then print which one
//! fits the feed better.
//!
//! - `feedfit compare --feed feed.png --a one.jpg --b two.jpg`
//! - `feedfit health`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use feedfit_server::client::{FeedFitClient, Slot, UploadImage, DEFAULT_API_URL};
use feedfit_server::verdict::{FitTier, Verdict, Winner};

/// FeedFit - find the picture that fits your feed
#[derive(Parser)]
#[command(name = "feedfit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the FeedFit API
    #[arg(long, global = true, env = "FEEDFIT_API_URL", default_value = DEFAULT_API_URL)]
    api: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FEEDFIT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two candidate pictures against a feed screenshot
    Compare {
        /// Screenshot of your Instagram feed
        #[arg(long, value_name = "FILE")]
        feed: PathBuf,

        /// First candidate picture
        #[arg(long = "a", value_name = "FILE")]
        image_a: PathBuf,

        /// Second candidate picture
        #[arg(long = "b", value_name = "FILE")]
        image_b: PathBuf,
    },

    /// Check that the API is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let client = FeedFitClient::new(&cli.api).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Compare { feed, image_a, image_b } => {
            let feed = UploadImage::from_path(Slot::Feed, &feed).await?;
            let image_a = UploadImage::from_path(Slot::ImageA, &image_a).await?;
            let image_b = UploadImage::from_path(Slot::ImageB, &image_b).await?;

            let result = client
                .compare(feed, image_a, image_b)
                .await
                .with_context(|| format!("Analysis failed against {}", client.compare_url()))?;

            print_verdict(&Verdict::new(result.image_a_score, result.image_b_score));
        }
        Commands::Health => {
            let health = client
                .health()
                .await
                .with_context(|| format!("Health check failed against {}", client.health_url()))?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }

    Ok(())
}

fn print_line(picture: Winner, score: f64, tier: FitTier) {
    println!("Picture {}: {:>6.2}%  {}", picture, score, tier.message());
}

fn print_verdict(verdict: &Verdict) {
    println!("Your Results");
    println!();
    print_line(verdict.winner, verdict.winner_score, verdict.winner_tier);
    print_line(verdict.winner.other(), verdict.runner_up_score, verdict.runner_up_tier);
    println!();
    println!("{}", verdict.recommendation());
    if let Some(highlight) = verdict.highlight() {
        println!("{}", highlight);
    }
}
