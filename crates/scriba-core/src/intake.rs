//! File intake: media-type validation and file metadata.
//!
//! Only files whose declared media type begins with `audio/` or `video/` are
//! accepted. The declared type comes from the file extension, matching the
//! extensions the transcription endpoint understands.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A validated user selection.
///
/// Immutable once created; replaced wholesale when a new file is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Build a selection from a path on disk.
    ///
    /// Resolves the file size from filesystem metadata and the declared media
    /// type from the extension. Fails with `UnsupportedType` for anything that
    /// is not a known audio or video container.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let mime_type = media_type_for_extension(&extension)
            .ok_or_else(|| Error::UnsupportedType(describe_extension(&extension)))?;

        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::io(format!("Failed to read '{}'", path.display()), e))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("selection")
            .to_string();

        Ok(SelectedFile {
            name,
            size: metadata.len(),
            mime_type: mime_type.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// Filename without its final extension, used as the default title stem.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }

    /// Read the full file contents for upload.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path)
            .map_err(|e| Error::io(format!("Failed to read '{}'", self.path.display()), e))
    }
}

/// Gate applied to every candidate selection, whatever produced it.
pub fn is_supported_media_type(mime_type: &str) -> bool {
    mime_type.starts_with("audio/") || mime_type.starts_with("video/")
}

/// Declared media type for a known container extension.
pub fn media_type_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "opus" => "audio/opus",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

fn describe_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{extension}")
    }
}

/// Format a byte count the way the result panel displays it.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    const GB: u64 = 1024 * 1024 * 1024;

    if bytes < KB {
        format!("{bytes} bytes")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}
