//! Telegram bot configuration parsing from environment variables.
//!
//! Both values are mandatory: a missing token or owner id aborts startup.

use super::EnvLookup;
use crate::domain::access::RequesterId;
use anyhow::{Context, Result, anyhow};
use std::fmt;

/// Telegram credentials and the single authorized user
#[derive(Clone)]
pub struct BotEnvConfig {
    pub token: String,
    pub owner_id: RequesterId,
}

// Keep the token out of logs
impl fmt::Debug for BotEnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotEnvConfig")
            .field("token", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

impl BotEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let token = lookup("TELEGRAM_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("TELEGRAM_TOKEN must be set"))?;

        let owner_raw = lookup("OWNER_ID").ok_or_else(|| anyhow!("OWNER_ID must be set"))?;
        let owner_id = owner_raw
            .trim()
            .parse::<u64>()
            .context(format!("Failed to parse OWNER_ID '{}'", owner_raw))?;

        Ok(Self {
            token,
            owner_id: RequesterId(owner_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_bot_config_reads_token_and_owner() {
        let lookup = lookup_from(&[("TELEGRAM_TOKEN", " 123:abc "), ("OWNER_ID", "987654321")]);
        let config = BotEnvConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.owner_id, RequesterId(987654321));
    }

    #[test]
    fn test_missing_token_fails() {
        let lookup = lookup_from(&[("OWNER_ID", "1")]);
        assert!(BotEnvConfig::from_lookup(&lookup).is_err());

        let blank = lookup_from(&[("TELEGRAM_TOKEN", "   "), ("OWNER_ID", "1")]);
        assert!(BotEnvConfig::from_lookup(&blank).is_err());
    }

    #[test]
    fn test_invalid_owner_fails() {
        let missing = lookup_from(&[("TELEGRAM_TOKEN", "t")]);
        assert!(BotEnvConfig::from_lookup(&missing).is_err());

        let negative = lookup_from(&[("TELEGRAM_TOKEN", "t"), ("OWNER_ID", "-5")]);
        assert!(BotEnvConfig::from_lookup(&negative).is_err());

        let text = lookup_from(&[("TELEGRAM_TOKEN", "t"), ("OWNER_ID", "me")]);
        assert!(BotEnvConfig::from_lookup(&text).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let lookup = lookup_from(&[("TELEGRAM_TOKEN", "secret-token"), ("OWNER_ID", "1")]);
        let config = BotEnvConfig::from_lookup(&lookup).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("redacted"));
    }
}
