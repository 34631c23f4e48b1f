//! Checkout configuration.
//!
//! The project id and backend host are explicit configuration passed into a
//! [`CheckoutContext`](crate::CheckoutContext), never process-wide globals,
//! so several projects can be served from the same process.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BITSNAP_PROJECT_ID` - Bitsnap project (integration) identifier
//!
//! ## Optional
//! - `BITSNAP_HOST` - Backend base URL (default: <https://bitsnap.pl>)
//! - `BITSNAP_API_KEY` - Bearer token for the automatic payment-link endpoint
//! - `BITSNAP_TEST_MODE` - Use the test payment-link endpoint (default: false)
//! - `BITSNAP_DEFAULT_COUNTRY` - Country persisted when none is selected (default: PL)
//! - `BITSNAP_STORAGE_PATH` - Directory for file-backed checkout storage (default: .bitsnap)
//! - `BITSNAP_REDIRECT_DELAY_MS` - Delay before redirecting after Apple Pay success (default: 2000)
//! - `BITSNAP_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use bitsnap_core::{CountryCode, ProjectId};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default backend host.
pub const DEFAULT_HOST: &str = "https://bitsnap.pl";

/// Default delay between a successful Apple Pay payment and the redirect.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout configuration for a single Bitsnap project.
#[derive(Clone)]
pub struct CheckoutConfig {
    /// Project the cart belongs to
    pub project_id: ProjectId,
    /// Backend base URL without trailing slash
    pub host: String,
    /// Bearer token for the automatic payment-link endpoint
    pub api_key: Option<SecretString>,
    /// Whether payment links are created in test mode
    pub test_mode: bool,
    /// Country persisted when the buyer has not chosen one
    pub default_country: CountryCode,
    /// Directory used by file-backed storage
    pub storage_path: PathBuf,
    /// Delay before following the redirect after an Apple Pay success
    pub redirect_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for CheckoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutConfig")
            .field("project_id", &self.project_id)
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("test_mode", &self.test_mode)
            .field("default_country", &self.default_country)
            .field("storage_path", &self.storage_path)
            .field("redirect_delay", &self.redirect_delay)
            .field("request_timeout", &self.request_timeout)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

impl CheckoutConfig {
    /// Build a configuration with defaults for everything but the project.
    #[must_use]
    pub fn new(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: project_id.into(),
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            test_mode: false,
            default_country: CountryCode::default(),
            storage_path: PathBuf::from(".bitsnap"),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            request_timeout: Duration::from_secs(15),
            sentry_dsn: None,
        }
    }

    /// Override the backend host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the host is not an http(s) URL.
    pub fn with_host(mut self, host: &str) -> Result<Self, ConfigError> {
        self.host = normalize_host(host, "host")?;
        Ok(self)
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let project_id = get_required_env("BITSNAP_PROJECT_ID")?;
        let host = normalize_host(
            &get_env_or_default("BITSNAP_HOST", DEFAULT_HOST),
            "BITSNAP_HOST",
        )?;
        let api_key = get_optional_env("BITSNAP_API_KEY").and_then(|key| parse_api_key(&key));
        let test_mode = parse_bool("BITSNAP_TEST_MODE", &get_env_or_default("BITSNAP_TEST_MODE", "false"))?;
        let default_country = CountryCode::parse(&get_env_or_default("BITSNAP_DEFAULT_COUNTRY", "PL"))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BITSNAP_DEFAULT_COUNTRY".to_string(), e.to_string())
            })?;
        let storage_path = PathBuf::from(get_env_or_default("BITSNAP_STORAGE_PATH", ".bitsnap"));
        let redirect_delay = get_env_or_default("BITSNAP_REDIRECT_DELAY_MS", "2000")
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BITSNAP_REDIRECT_DELAY_MS".to_string(), e.to_string())
            })?;
        let request_timeout = get_env_or_default("BITSNAP_REQUEST_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BITSNAP_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            project_id: ProjectId::new(project_id),
            host,
            api_key,
            test_mode,
            default_country,
            storage_path,
            redirect_delay,
            request_timeout,
            sentry_dsn,
        })
    }

    /// Public-commerce JSON endpoint for this project.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL cannot be parsed.
    pub fn commerce_url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/api/integrations/{}/public-commerce{path}",
            self.host, self.project_id
        ))
    }

    /// Binary RPC endpoint for a `PublicApiService` method.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL cannot be parsed.
    pub fn rpc_url(&self, method: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/api/rpc/public.v1.PublicApiService/{method}",
            self.host
        ))
    }

    /// Automatic payment-link endpoint, honouring test mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL cannot be parsed.
    pub fn automatic_link_url(&self, test_mode: bool) -> Result<Url, url::ParseError> {
        let suffix = if test_mode { "/test" } else { "" };
        Url::parse(&format!(
            "{}/api/payment/link/auto/{}{suffix}",
            self.host, self.project_id
        ))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Validate an http(s) host and strip any trailing slash.
fn normalize_host(host: &str, var_name: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(host.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(host.trim().trim_end_matches('/').to_string())
}

/// The API key as given, surrounding whitespace removed; blank means none.
fn parse_api_key(value: &str) -> Option<SecretString> {
    let key = value.trim();
    (!key.is_empty()).then(|| SecretString::from(key.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = CheckoutConfig::new("proj_1");
        assert_eq!(config.project_id.as_str(), "proj_1");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.default_country.as_str(), "PL");
        assert_eq!(config.redirect_delay, Duration::from_millis(2000));
        assert!(!config.test_mode);
    }

    #[test]
    fn test_commerce_url() {
        let config = CheckoutConfig::new("proj_1")
            .with_host("https://api.example.test/")
            .unwrap();
        assert_eq!(
            config.commerce_url("/products").unwrap().as_str(),
            "https://api.example.test/api/integrations/proj_1/public-commerce/products"
        );
    }

    #[test]
    fn test_rpc_url() {
        let config = CheckoutConfig::new("proj_1");
        assert_eq!(
            config.rpc_url("GetPreOrderDetails").unwrap().as_str(),
            "https://bitsnap.pl/api/rpc/public.v1.PublicApiService/GetPreOrderDetails"
        );
    }

    #[test]
    fn test_automatic_link_url_test_mode() {
        let config = CheckoutConfig::new("proj_1");
        assert!(config.automatic_link_url(false).unwrap().as_str().ends_with("/auto/proj_1"));
        assert!(config.automatic_link_url(true).unwrap().as_str().ends_with("/auto/proj_1/test"));
    }

    #[test]
    fn test_with_host_rejects_non_http() {
        let result = CheckoutConfig::new("p").with_host("ftp://bitsnap.pl");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
        let result = CheckoutConfig::new("p").with_host("not a url");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_api_key_keeps_key_verbatim() {
        let key = parse_api_key("  bs_todo_xxx_0000  ").unwrap();
        assert_eq!(key.expose_secret(), "bs_todo_xxx_0000");
        assert!(parse_api_key("   ").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = CheckoutConfig::new("proj_1");
        config.api_key = Some(SecretString::from("bs_live_super_secret_value".to_string()));

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("proj_1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("bs_live_super_secret_value"));
        assert_eq!(
            config.api_key.as_ref().unwrap().expose_secret(),
            "bs_live_super_secret_value"
        );
    }
}
