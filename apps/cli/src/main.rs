use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use resumen_core::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "resumen")]
#[command(
    about = "Turn YouTube playlists into AI-generated summaries saved to your read-later queue"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the configured playlist: fetch transcripts, summarize every
    /// video and save one digest document
    Batch,
    /// Process a single video and reply with progress to a chat conversation
    Single {
        /// Video URL (watch/short-link form) or a bare video id
        url: String,

        /// Chat conversation id to send progress replies to
        #[arg(short, long)]
        chat: String,
    },
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pipeline = Pipeline::new(config)?;

    println!(
        "\n{}  {}\n",
        style("resumen").cyan().bold(),
        style("Video Digest").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let started = Instant::now();
    let confirmation = match cli.command {
        Commands::Batch => {
            let spinner = create_spinner("Processing playlist...");
            let confirmation = pipeline.run_batch().await;
            spinner.finish_and_clear();
            confirmation?
        }
        Commands::Single { url, chat } => {
            let spinner = create_spinner("Processing video...");
            let confirmation = pipeline.run_single(&url, &chat).await;
            spinner.finish_and_clear();
            confirmation?
        }
    };

    println!(
        "{} Digest saved {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    );
    if let Some(url) = confirmation.url {
        println!("  {}", style(url).dim());
    }

    Ok(())
}
