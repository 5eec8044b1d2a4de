/// Configuration management
use crate::error::{GramError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:9000/api";
const DEFAULT_IMAGE_BASE_URL: &str = "http://localhost:9000";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// REST API root, e.g. `http://localhost:9000/api`
    pub api_base_url: String,

    /// Prefix for relative image paths returned by the API
    pub image_base_url: String,

    /// Time each story stays on screen
    pub story_duration: Duration,

    /// Progress sampling interval for the story timer
    pub story_tick: Duration,

    /// Delay before a mention search is sent (zero = every keystroke)
    pub search_debounce: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Max entries kept in the recent-search list
    pub recent_search_limit: usize,

    /// Directory for the session database (defaults to `.gram`)
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            story_duration: Duration::from_millis(5000),
            story_tick: Duration::from_millis(50),
            search_debounce: Duration::ZERO,
            request_timeout: Duration::from_secs(10),
            recent_search_limit: 10,
            data_dir: None,
        }
    }
}

impl Config {
    /// Parse flags out of the command line; returns the config and the
    /// remaining positional arguments (the command and its operands).
    pub fn from_args(args: &[String]) -> Result<(Self, Vec<String>)> {
        let mut config = Self::default();
        let mut rest = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--api-url" => {
                    config.api_base_url = flag_value(args, i, "--api-url")?.to_string();
                    i += 2;
                }
                "--image-url" => {
                    config.image_base_url = flag_value(args, i, "--image-url")?.to_string();
                    i += 2;
                }
                "--data-dir" => {
                    config.data_dir = Some(PathBuf::from(flag_value(args, i, "--data-dir")?));
                    i += 2;
                }
                "--story-ms" => {
                    let ms = parse_millis(flag_value(args, i, "--story-ms")?, "--story-ms")?;
                    config.story_duration = Duration::from_millis(ms);
                    i += 2;
                }
                "--debounce-ms" => {
                    let ms = parse_millis(flag_value(args, i, "--debounce-ms")?, "--debounce-ms")?;
                    config.search_debounce = Duration::from_millis(ms);
                    i += 2;
                }
                other => {
                    rest.push(other.to_string());
                    i += 1;
                }
            }
        }

        // Env overrides (nice for scripts)
        if let Ok(url) = std::env::var("GRAM_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var("GRAM_IMAGE_URL") {
            config.image_base_url = url;
        }
        if let Ok(dir) = std::env::var("GRAM_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok((config, rest))
    }

    pub fn validate(&self) -> Result<()> {
        if self.story_tick.is_zero() {
            return Err(GramError::Config("story tick must be non-zero".to_string()));
        }
        if self.story_tick > self.story_duration {
            return Err(GramError::Config(
                "story tick must not exceed the story duration".to_string(),
            ));
        }
        if !self.api_base_url.starts_with("http://") {
            return Err(GramError::Config(format!(
                "API url must be plain http://, got {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Session database directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from(".gram"))
    }
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| GramError::Config(format!("{} requires an argument", flag)))
}

fn parse_millis(raw: &str, flag: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| GramError::Config(format!("{} must be a number of milliseconds", flag)))
}
