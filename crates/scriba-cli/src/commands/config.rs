//! Configuration command: show current settings or change them.
//!
//! Credentials are entered through a hidden prompt rather than taken on the
//! command line, so they stay out of shell history.

use anyhow::{Result, anyhow};
use console::style;
use scriba_core::{ProviderKind, Settings};

#[derive(clap::Args)]
pub struct ConfigArgs {
    /// Show the current configuration
    #[arg(long)]
    pub show: bool,

    /// Default provider: "remote" or "live"
    #[arg(long, value_name = "KIND")]
    pub provider: Option<String>,

    /// Language hint, e.g. "en" ("auto" clears it)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Remote transcription endpoint URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Remote model identifier
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Prompt for and store the remote API key
    #[arg(long)]
    pub api_key: bool,

    /// Streaming recognizer endpoint URL
    #[arg(long, value_name = "URL")]
    pub live_endpoint: Option<String>,

    /// Streaming recognizer model
    #[arg(long, value_name = "MODEL")]
    pub live_model: Option<String>,

    /// Prompt for and store the streaming API key
    #[arg(long)]
    pub live_api_key: bool,
}

impl ConfigArgs {
    fn changes_anything(&self) -> bool {
        self.provider.is_some()
            || self.language.is_some()
            || self.endpoint.is_some()
            || self.model.is_some()
            || self.api_key
            || self.live_endpoint.is_some()
            || self.live_model.is_some()
            || self.live_api_key
    }
}

fn prompt_api_key(label: &str) -> Result<String> {
    let key: String = dialoguer::Password::new()
        .with_prompt(format!("{label} API key"))
        .interact()?;
    if key.trim().is_empty() {
        return Err(anyhow!("API key cannot be empty"));
    }
    Ok(key)
}

fn masked(key: &Option<String>) -> String {
    match key {
        Some(k) => {
            // Count characters, not bytes: keys can contain multibyte text.
            let chars = k.chars().count();
            if chars > 8 {
                let head: String = k.chars().take(4).collect();
                let tail: String = k.chars().skip(chars - 4).collect();
                format!("{head}...{tail}")
            } else {
                "(set)".to_string()
            }
        }
        None => "(not set)".to_string(),
    }
}

fn show(settings: &Settings) {
    let path = Settings::path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unknown)".to_string());

    println!("{}", style("scriba configuration").bold());
    println!("  file:           {path}");
    println!("  provider:       {}", settings.provider);
    println!(
        "  language:       {}",
        settings.language.as_deref().unwrap_or("auto")
    );
    println!("  remote");
    println!("    endpoint:     {}", settings.remote.endpoint);
    println!("    model:        {}", settings.remote.model);
    println!("    api key:      {}", masked(&settings.remote.api_key));
    println!("  live");
    println!("    endpoint:     {}", settings.live.endpoint);
    println!("    model:        {}", settings.live.model);
    println!("    api key:      {}", masked(&settings.live.api_key));
    println!(
        "  notifications:  errors {}s, success {}s",
        settings.notifications.error_secs, settings.notifications.success_secs
    );
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let mut settings = Settings::load();

    if !args.changes_anything() {
        show(&settings);
        return Ok(());
    }

    if let Some(provider) = &args.provider {
        settings.provider = provider
            .parse::<ProviderKind>()
            .map_err(|e| anyhow!(e))?;
    }
    if let Some(language) = &args.language {
        settings.language = match language.as_str() {
            "auto" | "" => None,
            lang => Some(lang.to_string()),
        };
    }
    if let Some(endpoint) = args.endpoint {
        settings.remote.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        settings.remote.model = model;
    }
    if args.api_key {
        settings.remote.api_key = Some(prompt_api_key("Remote")?);
    }
    if let Some(endpoint) = args.live_endpoint {
        settings.live.endpoint = endpoint;
    }
    if let Some(model) = args.live_model {
        settings.live.model = model;
    }
    if args.live_api_key {
        settings.live.api_key = Some(prompt_api_key("Streaming")?);
    }

    settings.save()?;
    println!("{} configuration saved", style("✓").green().bold());

    if args.show {
        show(&settings);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::masked;

    #[test]
    fn masked_keeps_only_the_edges() {
        assert_eq!(masked(&Some("sk-abcdef123456".to_string())), "sk-a...3456");
        assert_eq!(masked(&Some("short".to_string())), "(set)");
        assert_eq!(masked(&None), "(not set)");
    }

    #[test]
    fn masked_handles_multibyte_keys() {
        assert_eq!(masked(&Some("ééé€€€".to_string())), "(set)");
        assert_eq!(
            masked(&Some("clé-секрет-0042".to_string())),
            "clé-...0042"
        );
    }
}
