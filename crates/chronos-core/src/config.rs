use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub regional: RegionalConfig,
    pub reminders: ReminderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours.
    pub ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionalConfig {
    /// Upstream holiday feed API key. When absent the regional overlay is
    /// silently disabled rather than treated as a hard error.
    pub api_key: Option<String>,
    /// Base URL of the upstream feed, overridable for tests.
    pub base_url: String,
    /// Cache lifetime in hours for synthesized regional calendars.
    pub cache_ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Poll interval in seconds for the due-event scan.
    pub poll_interval_secs: u64,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "debug")?
            .set_default("session.ttl_hours", 24)?
            .set_default(
                "regional.base_url",
                "https://www.googleapis.com/calendar/v3/calendars",
            )?
            .set_default("regional.cache_ttl_hours", 24)?
            .set_default("reminders.enabled", true)?
            .set_default("reminders.poll_interval_secs", 60)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
