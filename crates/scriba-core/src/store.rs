//! Result store: the single consistent snapshot consumed by preview and export.

use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Current transcription output.
///
/// Written once by the remote provider or incrementally by the live provider;
/// readers always get a cloned snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub title: String,
    pub generated_at: DateTime<Local>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Holds the latest transcript for the session.
///
/// Single logical writer (the active provider, via the session); any number of
/// snapshot readers. `generated_at` refreshes on every text write so exports
/// always carry the time the content was produced.
#[derive(Debug)]
pub struct ResultStore {
    inner: Mutex<Transcript>,
}

impl ResultStore {
    pub fn new() -> Self {
        ResultStore {
            inner: Mutex::new(Transcript {
                text: String::new(),
                title: "Transcription".to_string(),
                generated_at: Local::now(),
            }),
        }
    }

    /// Replace the transcript text.
    pub fn set(&self, text: impl Into<String>) {
        let mut guard = self.inner.lock().unwrap();
        guard.text = text.into();
        guard.generated_at = Local::now();
    }

    /// Append to the transcript text.
    pub fn append(&self, text: &str) {
        let mut guard = self.inner.lock().unwrap();
        guard.text.push_str(text);
        guard.generated_at = Local::now();
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.lock().unwrap().title = title.into();
    }

    /// Latest consistent snapshot.
    pub fn snapshot(&self) -> Transcript {
        self.inner.lock().unwrap().clone()
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_and_append_extends() {
        let store = ResultStore::new();
        store.set("hello");
        assert_eq!(store.snapshot().text, "hello");

        store.append(" world");
        assert_eq!(store.snapshot().text, "hello world");

        store.set("fresh");
        assert_eq!(store.snapshot().text, "fresh");
    }

    #[test]
    fn title_defaults_and_updates() {
        let store = ResultStore::new();
        assert_eq!(store.snapshot().title, "Transcription");
        store.set_title("Standup notes");
        assert_eq!(store.snapshot().title, "Standup notes");
    }
}
