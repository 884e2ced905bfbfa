//! Notifier and proxy configuration.
//!
//! One canonical config struct, owned by the embedding orchestrator and
//! passed in read-only. Trigger flags are evaluated independently; only one
//! status kind is ever chosen per event.

use serde::{Deserialize, Serialize};

/// Notification trigger and routing configuration for one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Raw recipient list, comma or semicolon delimited.
    pub recipients: String,
    /// Credential id resolved through the host's credential store.
    pub credentials_id: String,
    /// Public root URL of the build system; its host prefixes every message.
    pub root_url: Option<String>,
    /// Notify when a build starts.
    pub on_start: bool,
    pub on_success: bool,
    pub on_aborted: bool,
    pub on_not_built: bool,
    pub on_unstable: bool,
    pub on_failure: bool,
    pub on_back_to_normal: bool,
    pub on_repeated_failure: bool,
}

impl NotifierConfig {
    /// Parsed, deduplicated recipient identifiers.
    pub fn recipient_list(&self) -> Vec<String> {
        parse_recipients(&self.recipients)
    }
}

/// Split a raw recipient string on `,`/`;`, trim, and drop duplicates while
/// preserving first-seen order.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .filter(|r| seen.insert(r.to_string()))
        .map(str::to_string)
        .collect()
}

/// Outbound proxy settings supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Glob patterns for hosts that must bypass the proxy.
    #[serde(default)]
    pub no_proxy_hosts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipients_mixed_delimiters() {
        assert_eq!(
            parse_recipients("AAAA1111,BBBB2222; CCCC3333"),
            vec!["AAAA1111", "BBBB2222", "CCCC3333"]
        );
    }

    #[test]
    fn test_parse_recipients_dedup_and_empty_segments() {
        assert_eq!(
            parse_recipients("AAAA1111,,AAAA1111;;BBBB2222"),
            vec!["AAAA1111", "BBBB2222"]
        );
        assert!(parse_recipients("").is_empty());
        assert!(parse_recipients(" ; , ").is_empty());
    }

    #[test]
    fn test_default_config_fires_nothing() {
        let config = NotifierConfig::default();
        assert!(!config.on_start);
        assert!(!config.on_failure);
        assert!(config.recipient_list().is_empty());
    }
}
