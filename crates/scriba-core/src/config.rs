use serde::{Deserialize, Serialize};
use std::fmt;

/// Available transcription strategies.
///
/// Selected once per session; the two variants share the provider capability
/// contract but differ in where the audio comes from (uploaded file bytes vs
/// live microphone capture).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Remote,
    Live,
}

impl ProviderKind {
    /// Get the string identifier for this provider kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Remote => "remote",
            ProviderKind::Live => "live",
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Remote => "Remote API",
            ProviderKind::Live => "Live Recognition",
        }
    }

    /// Environment variable consulted for this kind's credential
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::Remote => "SCRIBA_API_KEY",
            ProviderKind::Live => "SCRIBA_LIVE_API_KEY",
        }
    }

    /// List all available provider kinds
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Remote, ProviderKind::Live]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" | "api" => Ok(ProviderKind::Remote),
            "live" | "streaming" => Ok(ProviderKind::Live),
            _ => Err(format!("Unknown provider: {}. Available: remote, live", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_identifiers() {
        for kind in ProviderKind::all() {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("whisperx".parse::<ProviderKind>().is_err());
    }
}
