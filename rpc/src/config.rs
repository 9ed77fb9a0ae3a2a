//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use yam_verification::DisclosureRequirements;

use crate::RpcError;

/// Configuration for the verification service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Backing file for the verification record store, relative to the
    /// process working directory unless absolute.
    #[serde(default = "default_storage_file")]
    pub storage_file: PathBuf,

    /// Display name shown in the external proof application.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Proof scope; must match the backend verifier's configuration.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Publicly reachable URL of this service's `/verify` endpoint, handed
    /// to the proof provider as the callback target.
    #[serde(default = "default_callback_endpoint")]
    pub callback_endpoint: String,

    /// The external proof backend that performs cryptographic verification.
    #[serde(default = "default_verifier_endpoint")]
    pub verifier_endpoint: String,

    /// Base URL for deep links into the external proof application.
    #[serde(default = "default_deep_link_base")]
    pub deep_link_base: String,

    /// Minimum age the proof must establish.
    #[serde(default = "default_minimum_age")]
    pub minimum_age: u8,

    /// Whether the proof must disclose nationality.
    #[serde(default = "default_true")]
    pub require_nationality: bool,

    /// Whether the proof must disclose gender.
    #[serde(default = "default_true")]
    pub require_gender: bool,

    /// OFAC screening on/off depending on deployment.
    #[serde(default)]
    pub ofac: bool,

    /// Nationalities the deployment excludes outright.
    #[serde(default = "default_excluded_countries")]
    pub excluded_countries: Vec<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_port() -> u16 {
    7080
}

fn default_storage_file() -> PathBuf {
    PathBuf::from("verification-results.json")
}

fn default_app_name() -> String {
    "Yam Marketplace".to_string()
}

fn default_scope() -> String {
    "yam-marketplace".to_string()
}

fn default_callback_endpoint() -> String {
    "http://127.0.0.1:7080/verify".to_string()
}

fn default_verifier_endpoint() -> String {
    "https://playground.self.xyz/api/verify".to_string()
}

fn default_deep_link_base() -> String {
    "https://redirect.self.xyz".to_string()
}

fn default_minimum_age() -> u8 {
    18
}

fn default_true() -> bool {
    true
}

fn default_excluded_countries() -> Vec<String> {
    ["IRN", "PRK", "RUS", "SYR"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, RpcError> {
        let content = std::fs::read_to_string(path).map_err(|e| RpcError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServiceConfig is always serializable to TOML")
    }

    /// The disclosure requirements this deployment demands of every proof.
    pub fn disclosures(&self) -> DisclosureRequirements {
        DisclosureRequirements {
            minimum_age: self.minimum_age,
            nationality: self.require_nationality,
            gender: self.require_gender,
            ofac: self.ofac,
            excluded_countries: self.excluded_countries.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            storage_file: default_storage_file(),
            app_name: default_app_name(),
            scope: default_scope(),
            callback_endpoint: default_callback_endpoint(),
            verifier_endpoint: default_verifier_endpoint(),
            deep_link_base: default_deep_link_base(),
            minimum_age: default_minimum_age(),
            require_nationality: default_true(),
            require_gender: default_true(),
            ofac: false,
            excluded_countries: default_excluded_countries(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
