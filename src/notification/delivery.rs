//! Message delivery.
//!
//! Fans one composed message out to every recipient over authenticated HTTP
//! POST. Each recipient gets exactly one attempt per invocation; a failing
//! recipient never suppresses the attempts to the others, and the aggregate
//! outcome is the AND over all of them.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ProxyConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{Error, Result};

/// Fixed messaging API endpoint.
pub const MESSAGE_API_URL: &str = "https://msgapi.threema.ch/send_simple";

/// Connect and request timeout applied to every delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one per-recipient delivery attempt.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub recipient: String,
    pub success: bool,
    pub http_status: Option<u16>,
    pub error_detail: Option<String>,
}

/// Aggregated outcome of one fan-out.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub results: Vec<DeliveryResult>,
}

impl DeliveryReport {
    /// True only when every recipient attempt succeeded.
    pub fn all_delivered(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn failed_recipients(&self) -> impl Iterator<Item = &DeliveryResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Transport seam for one-recipient sends.
///
/// The production implementation is [`DirectMessageGateway`]; tests substitute
/// scripted doubles.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send(
        &self,
        credentials: &Credentials,
        recipient: &str,
        text: &str,
    ) -> DeliveryResult;
}

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Translate a no-proxy host glob into an anchored regular expression.
///
/// `*` matches any run, `?` a single character, `.` is taken literally.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '.' => out.push_str("\\."),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('$');
    out
}

/// Whether requests to `host` must route through the proxy.
///
/// False as soon as one no-proxy glob matches the full host string; invalid
/// patterns are logged and skipped.
fn proxy_required(host: &str, no_proxy_hosts: &[String]) -> bool {
    for glob in no_proxy_hosts {
        match Regex::new(&glob_to_regex(glob)) {
            Ok(pattern) => {
                if pattern.is_match(host) {
                    return false;
                }
            }
            Err(e) => warn!(glob = %glob, error = %e, "Ignoring invalid no-proxy pattern"),
        }
    }
    true
}

/// Build a `reqwest::Proxy` from the host-supplied proxy settings. A username
/// implies proxy authentication.
fn build_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy> {
    let mut proxy = reqwest::Proxy::all(format!("http://{}:{}", config.host, config.port))?;
    if let Some(username) = config.username.as_deref().filter(|u| !u.is_empty()) {
        info!(user = %username, "Using proxy authentication");
        proxy = proxy.basic_auth(username, config.password.as_deref().unwrap_or_default());
    }
    Ok(proxy)
}

/// Production gateway posting to the fixed messaging endpoint.
pub struct DirectMessageGateway {
    client: reqwest::Client,
    endpoint: Url,
}

impl DirectMessageGateway {
    /// Build the gateway, routing through `proxy` unless the endpoint host
    /// matches one of its no-proxy globs.
    pub fn new(proxy: Option<&ProxyConfig>) -> Result<Self> {
        install_rustls_provider();

        let endpoint = Url::parse(MESSAGE_API_URL)?;
        let host = endpoint.host_str().unwrap_or_default().to_string();

        let mut builder = reqwest::Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);

        if let Some(proxy) = proxy {
            if proxy_required(&host, &proxy.no_proxy_hosts) {
                builder = builder.proxy(build_proxy(proxy)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl MessageGateway for DirectMessageGateway {
    async fn send(
        &self,
        credentials: &Credentials,
        recipient: &str,
        text: &str,
    ) -> DeliveryResult {
        let form = [
            ("from", credentials.username.as_str()),
            ("to", recipient),
            ("text", text),
            ("secret", credentials.secret.as_str()),
        ];

        let response = match self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "Error posting message");
                return DeliveryResult {
                    recipient: recipient.to_string(),
                    success: false,
                    http_status: e.status().map(|s| s.as_u16()),
                    error_detail: Some(e.to_string()),
                };
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            info!(status = status.as_u16(), recipient = %recipient, "Message delivered");
            return DeliveryResult {
                recipient: recipient.to_string(),
                success: true,
                http_status: Some(status.as_u16()),
                error_detail: None,
            };
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            recipient = %recipient,
            body = %body,
            "Message rejected by endpoint"
        );
        DeliveryResult {
            recipient: recipient.to_string(),
            success: false,
            http_status: Some(status.as_u16()),
            error_detail: Some(body),
        }
    }
}

/// Fan-out of one message to every configured recipient.
pub struct DeliveryPipeline {
    gateway: Arc<dyn MessageGateway>,
    store: Arc<dyn CredentialStore>,
}

impl DeliveryPipeline {
    pub fn new(gateway: Arc<dyn MessageGateway>, store: Arc<dyn CredentialStore>) -> Self {
        Self { gateway, store }
    }

    /// Deliver `text` to every recipient, one attempt each.
    ///
    /// Unresolvable credentials fail the whole send before any attempt is
    /// made. Per-recipient failures are recorded in the report and never
    /// short-circuit the remaining recipients.
    pub async fn deliver(
        &self,
        credentials_id: &str,
        recipients: &[String],
        text: &str,
    ) -> Result<DeliveryReport> {
        let credentials = self
            .store
            .find(credentials_id)
            .ok_or_else(|| Error::CredentialsNotFound(credentials_id.to_string()))?;

        let mut results = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            results.push(self.gateway.send(&credentials, recipient, text).await);
        }
        Ok(DeliveryReport { results })
    }
}
