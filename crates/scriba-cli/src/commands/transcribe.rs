//! File transcription via the remote API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use scriba_core::provider::remote::{RemoteApiProvider, UploadRequest};
use scriba_core::{SelectedFile, Session, Settings, format_file_size};

use super::OutputArgs;
use crate::app;

#[derive(clap::Args)]
pub struct TranscribeArgs {
    /// Path to the audio or video file
    pub file: PathBuf,

    /// Language hint, e.g. "en" or "pt" (default: auto-detect)
    #[arg(short, long)]
    pub language: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn run(args: TranscribeArgs) -> Result<()> {
    let settings = Settings::load();
    let notifier = app::notifier(&settings);
    let mut session = Session::new();

    let selected = session.select(SelectedFile::from_path(&args.file)?)?.clone();
    eprintln!(
        "{} ({})",
        selected.name,
        format_file_size(selected.size)
    );

    if let Some(title) = args.output.title.clone() {
        session.store().set_title(title);
    }

    let config = app::resolve_remote_config(&settings, args.language.clone())?;
    let upload = UploadRequest::from_selection(&selected)?;
    let provider = Arc::new(RemoteApiProvider::new(config, upload));

    app::print_status("Transcribing...");
    match session.run(provider, &notifier).await {
        Ok(text) => {
            notifier.success("Transcription complete");
            println!("{text}");
        }
        Err(e) => {
            notifier.error(format!("Transcription failed: {e}"));
            app::render_notifications(&notifier);
            anyhow::bail!("transcription failed");
        }
    }

    super::deliver(&session, &args.output, &notifier)?;
    app::render_notifications(&notifier);
    Ok(())
}
