//! Process configuration.
//!
//! Built once at startup from the environment and threaded explicitly into
//! the components; no ambient globals. Missing credentials are warnings, not
//! errors — the corresponding capability degrades to `Unavailable`. Only a
//! value that cannot be interpreted at all (listen address, tracked pattern)
//! is fatal.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::processor::{PatternError, TrackedPattern};
use crate::summarizer::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Default bind address for the webhook server.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Default directory for archived payloads.
pub const DEFAULT_PAYLOAD_DIR: &str = "webhooks";

/// A startup-time configuration fault.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` did not parse as a socket address.
    #[error("invalid LISTEN_ADDR `{value}`: {source}")]
    ListenAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    /// `TRACKED_PREFIX`/`TRACKED_EXTENSION` form a malformed pattern.
    #[error("invalid tracked pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Process-wide configuration.
pub struct Config {
    /// GitHub personal token for file listings.
    pub github_token: Option<String>,

    /// Credential for the summarization service.
    pub openai_api_key: Option<String>,

    /// Summarization model name.
    pub openai_model: String,

    /// Versioned API base of the summarization service.
    pub openai_api_base: String,

    /// Supabase project URL.
    pub supabase_url: Option<String>,

    /// Supabase service key.
    pub supabase_key: Option<String>,

    /// Webhook shared secret; verification is skipped when unset.
    pub webhook_secret: Option<String>,

    /// Whether to archive qualifying payloads to disk.
    pub save_payloads: bool,

    /// Directory for archived payloads.
    pub payload_dir: PathBuf,

    /// Bind address for the webhook server.
    pub listen_addr: SocketAddr,

    /// Tracked-file naming convention.
    pub tracked: TrackedPattern,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary lookup.
    ///
    /// Tests pass a map-backed closure; production passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let github_token = non_empty(lookup("GITHUB_TOKEN"));
        if github_token.is_none() {
            warn!("GITHUB_TOKEN not set; changed-file listing disabled");
        }

        let openai_api_key = non_empty(lookup("OPENAI_API_KEY"));
        if openai_api_key.is_none() {
            warn!("OPENAI_API_KEY not set; summarization disabled");
        }

        let supabase_url = non_empty(lookup("SUPABASE_URL"));
        let supabase_key = non_empty(lookup("SUPABASE_KEY"));
        if supabase_url.is_none() || supabase_key.is_none() {
            warn!("SUPABASE_URL or SUPABASE_KEY not set; persistence disabled");
        }

        let webhook_secret = non_empty(lookup("WEBHOOK_SECRET"));
        if webhook_secret.is_none() {
            warn!("WEBHOOK_SECRET not set; webhook signature verification disabled");
        }

        let listen_addr_raw =
            non_empty(lookup("LISTEN_ADDR")).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr_raw
            .parse()
            .map_err(|source| ConfigError::ListenAddr {
                value: listen_addr_raw,
                source,
            })?;

        let tracked = TrackedPattern::new(
            non_empty(lookup("TRACKED_PREFIX")).unwrap_or_else(|| "models/".to_string()),
            non_empty(lookup("TRACKED_EXTENSION")).unwrap_or_else(|| ".sql".to_string()),
        )?;

        Ok(Config {
            github_token,
            openai_api_key,
            openai_model: non_empty(lookup("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_api_base: non_empty(lookup("OPENAI_API_BASE"))
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            supabase_url,
            supabase_key,
            webhook_secret,
            save_payloads: is_truthy(lookup("SAVE_PAYLOADS").as_deref()),
            payload_dir: PathBuf::from(
                non_empty(lookup("PAYLOAD_DIR")).unwrap_or_else(|| DEFAULT_PAYLOAD_DIR.to_string()),
            ),
            listen_addr,
            tracked,
        })
    }
}

impl std::fmt::Debug for Config {
    // Credentials stay out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_model", &self.openai_model)
            .field("openai_api_base", &self.openai_api_base)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "***"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("save_payloads", &self.save_payloads)
            .field("payload_dir", &self.payload_dir)
            .field("listen_addr", &self.listen_addr)
            .field("tracked", &self.tracked)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(str::to_ascii_lowercase).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_degraded_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.github_token.is_none());
        assert!(config.openai_api_key.is_none());
        assert!(config.supabase_url.is_none());
        assert!(config.webhook_secret.is_none());
        assert!(!config.save_payloads);
        assert_eq!(config.payload_dir, PathBuf::from("webhooks"));
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(config.openai_model, DEFAULT_MODEL);
        assert_eq!(config.tracked, TrackedPattern::dbt_models());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config_from(&[("GITHUB_TOKEN", ""), ("OPENAI_API_KEY", "")]).unwrap();
        assert!(config.github_token.is_none());
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn credentials_are_picked_up() {
        let config = config_from(&[
            ("GITHUB_TOKEN", "ghp_abc"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("SUPABASE_URL", "https://proj.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
            ("WEBHOOK_SECRET", "hunter2"),
        ])
        .unwrap();

        assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-abc"));
        assert_eq!(config.supabase_url.as_deref(), Some("https://proj.supabase.co"));
        assert_eq!(config.supabase_key.as_deref(), Some("service-key"));
        assert_eq!(config.webhook_secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn save_payloads_flag_parsing() {
        for value in ["1", "true", "TRUE", "yes"] {
            let config = config_from(&[("SAVE_PAYLOADS", value)]).unwrap();
            assert!(config.save_payloads, "'{}' should enable archiving", value);
        }
        for value in ["0", "false", "no", "off", ""] {
            let config = config_from(&[("SAVE_PAYLOADS", value)]).unwrap();
            assert!(!config.save_payloads, "'{}' should not enable archiving", value);
        }
    }

    #[test]
    fn custom_tracked_pattern() {
        let config = config_from(&[
            ("TRACKED_PREFIX", "dags/"),
            ("TRACKED_EXTENSION", ".py"),
        ])
        .unwrap();
        assert_eq!(config.tracked, TrackedPattern::new("dags/", ".py").unwrap());
    }

    #[test]
    fn malformed_tracked_pattern_is_fatal() {
        let result = config_from(&[("TRACKED_EXTENSION", "sql")]);
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    #[test]
    fn malformed_listen_addr_is_fatal() {
        let result = config_from(&[("LISTEN_ADDR", "not-an-address")]);
        assert!(matches!(result, Err(ConfigError::ListenAddr { .. })));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = config_from(&[
            ("GITHUB_TOKEN", "ghp_secret"),
            ("OPENAI_API_KEY", "sk-secret"),
            ("SUPABASE_KEY", "sb-secret"),
            ("WEBHOOK_SECRET", "hook-secret"),
        ])
        .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("ghp_secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("sb-secret"));
        assert!(!rendered.contains("hook-secret"));
    }
}
