//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `GOMATE_*` environment variables and the optional
//! configuration file; every field has a default.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{SettlementPolicy, UnknownSettlementPolicy};
use crate::outbound::dummyjson::DEFAULT_BASE_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const STORAGE_DIR_NAME: &str = ".gomate";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The API base URL did not parse.
    #[error("invalid api_base_url `{value}`: {source}")]
    BaseUrl {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The settlement policy name was not recognised.
    #[error(transparent)]
    Policy(#[from] UnknownSettlementPolicy),
}

/// Settings consumed by the composition root.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GOMATE")]
pub struct ClientSettings {
    /// Base URL of the DummyJSON-compatible API.
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Directory holding persisted client state.
    pub storage_dir: Option<String>,
    /// `last-settled-wins` or `latest-issued-wins`.
    pub settlement_policy: Option<String>,
    /// Emit JSON log lines instead of human-readable ones.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl ClientSettings {
    /// Parsed API base URL, falling back to the public deployment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BaseUrl`] when the configured value is not a
    /// URL.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|source| SettingsError::BaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Request timeout. Zero is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .max(1),
        )
    }

    /// Storage directory, defaulting to `~/.gomate`.
    pub fn storage_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = self.storage_dir.as_deref() {
            return Utf8PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|home| Utf8PathBuf::from(home).join(STORAGE_DIR_NAME))
            .unwrap_or_else(|_| Utf8PathBuf::from(STORAGE_DIR_NAME))
    }

    /// Settlement policy for overlapping requests.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Policy`] for unknown names.
    pub fn settlement_policy(&self) -> Result<SettlementPolicy, SettingsError> {
        self.settlement_policy
            .as_deref()
            .map_or(Ok(SettlementPolicy::default()), str::parse)
            .map_err(SettingsError::from)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("gomate")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("GOMATE_API_BASE_URL", None::<String>),
            ("GOMATE_REQUEST_TIMEOUT_SECS", None::<String>),
            ("GOMATE_STORAGE_DIR", None::<String>),
            ("GOMATE_SETTLEMENT_POLICY", None::<String>),
            ("GOMATE_LOG_JSON", None::<String>),
            ("HOME", Some("/home/traveller".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("default url").as_str(),
            "https://dummyjson.com/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(
            settings.storage_dir(),
            Utf8PathBuf::from("/home/traveller/.gomate")
        );
        assert_eq!(
            settings.settlement_policy().expect("default policy"),
            SettlementPolicy::LastSettledWins
        );
        assert!(!settings.log_json);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("GOMATE_API_BASE_URL", Some("http://localhost:8080".to_owned())),
            ("GOMATE_REQUEST_TIMEOUT_SECS", Some("0".to_owned())),
            ("GOMATE_STORAGE_DIR", Some("/tmp/gomate-state".to_owned())),
            (
                "GOMATE_SETTLEMENT_POLICY",
                Some("latest-issued-wins".to_owned()),
            ),
            ("GOMATE_LOG_JSON", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
        assert_eq!(settings.storage_dir(), Utf8PathBuf::from("/tmp/gomate-state"));
        assert_eq!(
            settings.settlement_policy().expect("policy"),
            SettlementPolicy::LatestIssuedWins
        );
        assert!(settings.log_json);
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let _guard = lock_env([
            ("GOMATE_API_BASE_URL", Some("not a url".to_owned())),
            ("GOMATE_SETTLEMENT_POLICY", Some("newest".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.api_base_url(),
            Err(SettingsError::BaseUrl { .. })
        ));
        assert!(matches!(
            settings.settlement_policy(),
            Err(SettingsError::Policy(_))
        ));
    }
}
