//! Runtime configuration.
//!
//! Defaults match the standard deployment; each value can be overridden with
//! an environment variable read once at start-up.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Namespace holding mirror resources and ManagedCluster registrations
pub const DEFAULT_MULTICLUSTER_NAMESPACE: &str = "mc-system";
/// Namespace holding the registration marker Secret
pub const DEFAULT_SYSTEM_NAMESPACE: &str = "placement-system";
/// Name of the Secret whose presence marks a managed cluster
pub const DEFAULT_REGISTRATION_SECRET: &str = "cluster-registration";
/// Per-request budget for role and registry lookups
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;
/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health server port
pub const HEALTH_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub multicluster_namespace: String,
    pub system_namespace: String,
    pub registration_secret: String,
    pub lookup_timeout: Duration,
    pub webhook_port: u16,
    pub health_port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            multicluster_namespace: DEFAULT_MULTICLUSTER_NAMESPACE.to_string(),
            system_namespace: DEFAULT_SYSTEM_NAMESPACE.to_string(),
            registration_secret: DEFAULT_REGISTRATION_SECRET.to_string(),
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            cert_path: PathBuf::from(WEBHOOK_CERT_PATH),
            key_path: PathBuf::from(WEBHOOK_KEY_PATH),
        }
    }
}

impl WebhookConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_source<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup_timeout_secs: u64 =
            parse_or(&var, "LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;
        if lookup_timeout_secs == 0 {
            return Err(Error::Config(
                "LOOKUP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            multicluster_namespace: var("MULTICLUSTER_NAMESPACE")
                .unwrap_or(defaults.multicluster_namespace),
            system_namespace: var("SYSTEM_NAMESPACE").unwrap_or(defaults.system_namespace),
            registration_secret: var("REGISTRATION_SECRET_NAME")
                .unwrap_or(defaults.registration_secret),
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            webhook_port: parse_or(&var, "WEBHOOK_PORT", defaults.webhook_port)?,
            health_port: parse_or(&var, "HEALTH_PORT", defaults.health_port)?,
            cert_path: var("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: var("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
        })
    }

    /// Whether both TLS files needed by the webhook server are present.
    pub fn tls_available(&self) -> bool {
        self.cert_path.exists() && self.key_path.exists()
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {key} value {raw:?}: {e}"))),
        None => Ok(default),
    }
}
