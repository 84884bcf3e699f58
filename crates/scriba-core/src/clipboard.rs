//! Clipboard access with a command-line fallback chain.
//!
//! arboard is tried first. When it cannot reach a clipboard (headless
//! sessions, GNOME without wlr-data-control), the text is piped through
//! `wl-copy` and then `xclip`. Only when every method fails does the caller
//! see `ClipboardUnavailable`.

use std::io::Write;
use std::process::{Command, Stdio};

use arboard::Clipboard;

use crate::error::{Error, Result};

/// Pipe text into an external clipboard helper.
fn copy_via_command(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    Ok(child.wait()?.success())
}

/// Copy text to the system clipboard.
///
/// Fatal only when arboard and both fallback helpers fail.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let arboard_err = match Clipboard::new().and_then(|mut c| c.set_text(text)) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    crate::verbose!("arboard unavailable ({arboard_err}), trying command fallbacks");

    for (program, args) in [
        ("wl-copy", &[][..]),
        ("xclip", &["-selection", "clipboard"][..]),
    ] {
        match copy_via_command(program, args, text) {
            Ok(true) => return Ok(()),
            Ok(false) => crate::verbose!("{program} exited with non-zero status"),
            Err(e) => crate::verbose!("{program} not usable: {e}"),
        }
    }

    Err(Error::ClipboardUnavailable(format!(
        "no clipboard method succeeded (arboard: {arboard_err})"
    )))
}
