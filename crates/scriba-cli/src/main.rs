mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scriba",
    version,
    about = "Transcribe audio and video files to text"
)]
struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe a media file via the remote API
    Transcribe(commands::transcribe::TranscribeArgs),
    /// Transcribe live microphone audio with streaming recognition
    Live(commands::live::LiveArgs),
    /// Show or change configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    scriba_core::set_verbose(cli.verbose);

    match cli.command {
        Command::Transcribe(args) => commands::transcribe::run(args).await,
        Command::Live(args) => commands::live::run(args).await,
        Command::Config(args) => commands::config::run(args),
    }
}
