use chrono_tz::Tz;
use std::collections::HashMap;

pub const DEFAULT_SURVEY_BASE_URL: &str = "https://api.tracksale.co/v2";
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_CHECKPOINT_TABLE: &str = "nps_checkpoint";
pub const MAX_LOOKBACK_DAYS: i64 = 366;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub survey_base_url: String,
    pub survey_token: String,
    pub webhook_url: String,
    pub webhook_headers: HashMap<String, String>,
    pub timezone: String,
    pub checkpoint_table: String,
    pub checkpoint_id: i32,
    pub dispatch_delay_ms: u64,
    pub fetch_limit: Option<i64>,
    pub lookback_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            survey_base_url: std::env::var("SURVEY_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SURVEY_BASE_URL.to_string())
                .pipe_url("SURVEY_BASE_URL")?,
            survey_token: std::env::var("TRACKSALE_TOKEN")
                .map_err(|_| anyhow::anyhow!("TRACKSALE_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("TRACKSALE_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            webhook_url: std::env::var("SLACK_WEBHOOK_URL")
                .map_err(|_| anyhow::anyhow!("SLACK_WEBHOOK_URL environment variable required"))?
                .pipe_url("SLACK_WEBHOOK_URL")?,
            webhook_headers: match std::env::var("WEBHOOK_HEADERS") {
                Ok(raw) if !raw.trim().is_empty() => parse_headers(&raw)?,
                _ => default_headers(),
            },
            timezone: std::env::var("TIMEZONE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            checkpoint_table: std::env::var("CHECKPOINT_TABLE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHECKPOINT_TABLE.to_string()),
            checkpoint_id: std::env::var("CHECKPOINT_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CHECKPOINT_ID must be an integer"))?,
            dispatch_delay_ms: std::env::var("DISPATCH_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_DELAY_MS must be a non-negative integer"))?,
            fetch_limit: std::env::var("FETCH_LIMIT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().parse::<i64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("FETCH_LIMIT must be an integer"))?
                .filter(|limit| *limit > 0),
            lookback_days: std::env::var("LOOKBACK_DAYS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LOOKBACK_DAYS must be an integer"))
                .and_then(validate_lookback_days)?,
        };

        config.time_zone()?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Survey Base URL: {}", config.survey_base_url);
        tracing::debug!("Time zone: {}", config.timezone);
        tracing::debug!(
            "Checkpoint: table={} id={}",
            config.checkpoint_table,
            config.checkpoint_id
        );
        tracing::debug!("Dispatch delay: {}ms", config.dispatch_delay_ms);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Resolves the configured IANA zone name.
    pub fn time_zone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("TIMEZONE '{}' is not a valid zone: {}", self.timezone, e))
    }
}

fn validate_lookback_days(days: i64) -> anyhow::Result<i64> {
    if !(0..=MAX_LOOKBACK_DAYS).contains(&days) {
        anyhow::bail!("LOOKBACK_DAYS must be between 0 and {}", MAX_LOOKBACK_DAYS);
    }
    Ok(days)
}

fn default_headers() -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

/// Parses `WEBHOOK_HEADERS`, a JSON object of header name to value.
pub fn parse_headers(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("WEBHOOK_HEADERS must be a JSON object of strings: {}", e))
}

trait UrlVar: Sized {
    fn pipe_url(self, name: &str) -> anyhow::Result<Self>;
}

impl UrlVar for String {
    fn pipe_url(self, name: &str) -> anyhow::Result<Self> {
        if self.trim().is_empty() {
            anyhow::bail!("{} cannot be empty", name);
        }
        if !self.starts_with("http://") && !self.starts_with("https://") {
            anyhow::bail!("{} must start with http:// or https://", name);
        }
        Ok(self.trim_end_matches('/').to_string())
    }
}
