use std::path::Path;
use serde::{Deserialize, Serialize};
use log::LevelFilter;
use tokio::fs;

const CONFIG_FILE: &str = "config.json";
const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

// Each card on a feed page gets its own row of reaction buttons; Discord allows
// five rows and the feed controls take two of them.
pub const MAX_PAGE_SIZE: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub discord_token: String,
    // Where confessions are persisted
    #[serde(default = "default_store_path")]
    pub store_path: String,
    // Number of confession cards per feed page (1 to 3)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    // Seconds of inactivity before a composer or feed panel stops responding
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,
    // One of off, error, warn, info, debug, trace
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_path() -> String {
    "confessions.json".to_string()
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_session_timeout() -> u64 {
    900
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: TOKEN_PLACEHOLDER.to_string(),
            store_path: default_store_path(),
            page_size: default_page_size(),
            session_timeout_secs: default_session_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads the configuration from `config.json`. If the file doesn't exist,
    /// it creates a default one and prompts the user to fill it.
    pub async fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let path = Path::new(CONFIG_FILE);

        if !path.exists() {
            Config::default().save().await?;

            eprintln!("Created default {}. Please fill in your bot token.", CONFIG_FILE);
            return Err("Configuration file created. Please update it and restart.".into());
        }

        let content = fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;

        if config.discord_token == TOKEN_PLACEHOLDER {
            return Err("Please replace YOUR_BOT_TOKEN_HERE in config.json with your actual bot token.".into());
        }

        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Saves the current configuration state to `config.json`.
    pub async fn save(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(CONFIG_FILE, content).await?;
        Ok(())
    }

    /// Cards per feed page, clamped to what fits in one message.
    pub fn page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Falls back to `Warn` when the configured level is not recognised.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}
