pub mod config;
pub mod live;
pub mod transcribe;

use std::path::PathBuf;

use anyhow::{Context, Result};
use scriba_core::{ExportFormat, Notifier, Session, write_export};

/// Export and delivery options shared by `transcribe` and `live`.
#[derive(clap::Args)]
pub struct OutputArgs {
    /// Document title used in export headers (defaults to the file name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Write a plain text (.txt) export to this path
    #[arg(long, value_name = "PATH")]
    pub txt: Option<PathBuf>,

    /// Write a rich text (.rtf) export to this path
    #[arg(long, value_name = "PATH")]
    pub rtf: Option<PathBuf>,

    /// Copy the transcript to the clipboard
    #[arg(long)]
    pub copy: bool,
}

/// Write requested exports and copy to the clipboard.
///
/// Export failures are hard errors; a clipboard failure is surfaced through
/// the notifier but does not abort (the transcript is already on screen).
pub fn deliver(session: &Session, args: &OutputArgs, notifier: &Notifier) -> Result<()> {
    let transcript = session.store().snapshot();

    let targets = [
        (ExportFormat::PlainText, args.txt.as_ref()),
        (ExportFormat::RichText, args.rtf.as_ref()),
    ];
    for (format, path) in targets {
        let Some(path) = path else { continue };
        write_export(format, &transcript, path)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        notifier.success(format!("Saved {}", path.display()));
    }

    if args.copy {
        match scriba_core::copy_to_clipboard(&transcript.text) {
            Ok(()) => notifier.success("Copied to clipboard"),
            Err(e) => notifier.error(e.to_string()),
        }
    }

    Ok(())
}
