//! Runtime settings read from the environment.
//!
//! ```bash
//! ROSTER_MATCH_DEADLINE_MS=5000                     # match group lookup deadline
//! ROSTER_MAX_PAGE_SIZE=100                          # cap on `list --limit`
//! ROSTER_MAIL_ALLOWED_CHARS=popy0123456789@example.com
//! ```

use std::env;
use std::time::Duration;

use roster_core::directory::DEFAULT_MAX_PAGE_SIZE;
use roster_core::validation::{MailKeywordRule, DEFAULT_MAIL_ALLOWED_CHARS};
use roster_core::DEFAULT_DEADLINE;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub match_deadline: Duration,
    pub max_page_size: u32,
    pub mail_rule: MailKeywordRule,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("ROSTER_MAIL_ALLOWED_CHARS does not form a valid character set: {0}")]
    InvalidMailChars(#[from] regex::Error),
}

fn parse_positive(var: &'static str) -> Result<Option<u64>, ConfigError> {
    let Ok(value) = env::var(var) else {
        return Ok(None);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { var, value })?;
    if parsed == 0 {
        return Err(ConfigError::Zero(var));
    }
    Ok(Some(parsed))
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let match_deadline = parse_positive("ROSTER_MATCH_DEADLINE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEADLINE);

        let max_page_size = match parse_positive("ROSTER_MAX_PAGE_SIZE")? {
            Some(size) => u32::try_from(size).map_err(|_| ConfigError::InvalidNumber {
                var: "ROSTER_MAX_PAGE_SIZE",
                value: size.to_string(),
            })?,
            None => DEFAULT_MAX_PAGE_SIZE,
        };

        let mail_chars = env::var("ROSTER_MAIL_ALLOWED_CHARS")
            .unwrap_or_else(|_| DEFAULT_MAIL_ALLOWED_CHARS.to_string());
        let mail_rule = MailKeywordRule::new(&mail_chars)?;

        Ok(Self {
            match_deadline,
            max_page_size,
            mail_rule,
        })
    }
}
