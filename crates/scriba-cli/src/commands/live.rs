//! Live microphone transcription with streaming recognition.
//!
//! Interim text redraws in place; Ctrl-C stops the capture loop and the
//! accumulated transcript is then previewed, exported, and/or copied like a
//! file transcription.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::Term;
use scriba_core::provider::live::LiveRecognitionProvider;
use scriba_core::{Session, Settings, TranscriptionBackend, WsRecognizer};

use super::OutputArgs;
use crate::app;

#[derive(clap::Args)]
pub struct LiveArgs {
    /// Language tag for the recognizer, e.g. "en" (default: auto-detect)
    #[arg(short, long)]
    pub language: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Single-line preview of the transcript tail while recognition runs.
fn redraw_tail(term: &Term, text: &str) {
    let width = term.size().1 as usize;
    let tail: String = if text.chars().count() > width.saturating_sub(1) {
        let skip = text.chars().count() - width.saturating_sub(4);
        format!("...{}", text.chars().skip(skip).collect::<String>())
    } else {
        text.to_string()
    };
    let _ = term.clear_line();
    let _ = term.write_str(&tail.replace('\n', " "));
}

pub async fn run(args: LiveArgs) -> Result<()> {
    let settings = Settings::load();
    let notifier = Arc::new(app::notifier(&settings));
    let mut session = Session::new();

    if let Some(title) = args.output.title.clone() {
        session.store().set_title(title);
    }

    let recognizer = Arc::new(WsRecognizer::new(app::resolve_live_config(&settings)?));
    let language = args.language.clone().or_else(|| settings.language.clone());
    let provider = Arc::new(LiveRecognitionProvider::new(recognizer, language));

    eprintln!("Listening... press Ctrl-C to stop.");

    let stopper = Arc::clone(&provider);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stopper.stop();
    });

    // Redraw the store's latest snapshot while the provider runs, and print
    // warnings on each tick; they auto-dismiss, so reading them only after
    // the run would lose any posted earlier than the dismiss timer.
    let preview = {
        let store = Arc::clone(session.store());
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            let term = Term::stderr();
            loop {
                tokio::time::sleep(Duration::from_millis(300)).await;
                if !notifier.visible().is_empty() {
                    let _ = term.clear_line();
                    app::render_notifications(&notifier);
                }
                redraw_tail(&term, &store.snapshot().text);
            }
        })
    };

    let outcome = session.run(provider, &notifier).await;
    preview.abort();
    let _ = Term::stderr().clear_line();

    match outcome {
        Ok(text) if !text.trim().is_empty() => {
            notifier.success("Recognition stopped");
            println!("{text}");
        }
        Ok(_) => notifier.error("No speech was transcribed"),
        Err(e) => {
            notifier.error(format!("Recognition failed: {e}"));
            app::render_notifications(&notifier);
            anyhow::bail!("live recognition failed");
        }
    }

    super::deliver(&session, &args.output, &notifier)?;
    app::render_notifications(&notifier);
    Ok(())
}
