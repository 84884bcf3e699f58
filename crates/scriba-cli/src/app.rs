//! Shared CLI plumbing: settings resolution and notification rendering.

use std::time::Duration;

use anyhow::{Result, bail};
use console::style;
use scriba_core::provider::remote::RemoteApiConfig;
use scriba_core::{Notifier, ProviderKind, Settings, Severity, WsRecognizerConfig};

/// Build the notification surface with the configured durations.
pub fn notifier(settings: &Settings) -> Notifier {
    Notifier::with_durations(
        Duration::from_secs(settings.notifications.error_secs),
        Duration::from_secs(settings.notifications.success_secs),
    )
}

/// Resolve remote endpoint configuration, failing with remediation steps when
/// no credential is available.
pub fn resolve_remote_config(
    settings: &Settings,
    language: Option<String>,
) -> Result<RemoteApiConfig> {
    let Some(api_key) = settings.api_key_for(ProviderKind::Remote) else {
        bail!(
            "No API key configured.\n\n\
             Set your key with:\n  scriba config --api-key\n\n\
             Or set the {} environment variable.",
            ProviderKind::Remote.api_key_env_var()
        );
    };

    Ok(RemoteApiConfig {
        endpoint: settings.remote.endpoint.clone(),
        model: settings.remote.model.clone(),
        api_key,
        language: language.or_else(|| settings.language.clone()),
    })
}

/// Resolve the streaming recognizer configuration.
pub fn resolve_live_config(settings: &Settings) -> Result<WsRecognizerConfig> {
    let Some(api_key) = settings.api_key_for(ProviderKind::Live) else {
        bail!(
            "No streaming API key configured.\n\n\
             Set your key with:\n  scriba config --live-api-key\n\n\
             Or set the {} environment variable.",
            ProviderKind::Live.api_key_env_var()
        );
    };

    Ok(WsRecognizerConfig {
        endpoint: settings.live.endpoint.clone(),
        model: settings.live.model.clone(),
        api_key,
    })
}

pub fn print_status(message: &str) {
    eprintln!("{}", style(message).dim());
}

/// Print everything still visible on the notification surface.
pub fn render_notifications(notifier: &Notifier) {
    for notification in notifier.drain() {
        match notification.severity {
            Severity::Error => {
                eprintln!("{} {}", style("✗").red().bold(), notification.message)
            }
            Severity::Success => {
                eprintln!("{} {}", style("✓").green().bold(), notification.message)
            }
        }
    }
}
