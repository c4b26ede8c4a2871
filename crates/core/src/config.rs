use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Environment variables consulted when the settings table is incomplete.
pub const TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";
pub const REPO_VAR: &str = "GITHUB_REPO";

/// Storage settings as a host application declares them.
///
/// Every key is optional at this stage; [`StorageConfig::resolve`] applies
/// the environment fallback and validates. Embed the table in the host's
/// own configuration, or read a standalone TOML file with
/// [`Settings::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Access token with read/write permission on repository contents.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Target repository as `owner/name`. A bare name is qualified with
    /// the authenticated login when the adapter connects.
    #[serde(default)]
    pub repository: Option<String>,
    /// API root override for GitHub Enterprise hosts.
    #[serde(default)]
    pub api_base: Option<String>,
}

impl Settings {
    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Configuration(format!(
                "cannot read settings at {}: {e}",
                path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            StorageError::Configuration(format!(
                "cannot parse settings at {}: {e}",
                path.display()
            ))
        })
    }
}

/// Validated adapter configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_token: String,
    pub repository: String,
    pub api_base: Option<String>,
}

impl StorageConfig {
    /// Build a configuration from explicit values. Both must be non-empty.
    pub fn new(access_token: impl Into<String>, repository: impl Into<String>) -> Result<Self> {
        let config = Self {
            access_token: access_token.into(),
            repository: repository.into(),
            api_base: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Point the adapter at a GitHub Enterprise API root.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Resolve a settings table into a usable configuration.
    ///
    /// When the table does not provide both required values, the
    /// `GITHUB_ACCESS_TOKEN` / `GITHUB_REPO` environment pair is consulted
    /// instead. The fallback is all-or-nothing: values are never mixed
    /// across the two sources.
    pub fn resolve(settings: &Settings) -> Result<Self> {
        let configured = match (
            non_empty(settings.access_token.as_deref()),
            non_empty(settings.repository.as_deref()),
        ) {
            (Some(token), Some(repo)) => Some((token, repo)),
            _ => None,
        };

        let (access_token, repository) = match configured {
            Some(pair) => pair,
            None => match (env_non_empty(TOKEN_VAR), env_non_empty(REPO_VAR)) {
                (Some(token), Some(repo)) => (token, repo),
                _ => {
                    return Err(StorageError::Configuration(format!(
                        "set access_token and repository in the storage settings, \
                         or export {TOKEN_VAR} and {REPO_VAR}"
                    )));
                }
            },
        };

        Ok(Self {
            access_token,
            repository,
            api_base: settings.api_base.clone().filter(|b| !b.is_empty()),
        })
    }

    /// Resolve from the environment pair alone.
    pub fn from_env() -> Result<Self> {
        Self::resolve(&Settings::default())
    }

    fn validate(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(StorageError::Configuration(
                "access token must not be empty".to_string(),
            ));
        }
        if self.repository.is_empty() {
            return Err(StorageError::Configuration(
                "repository identifier must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serial_test::serial;

    use super::*;

    fn set_env_pair(token: Option<&str>, repo: Option<&str>) {
        // Safety: every test touching the environment runs under #[serial].
        unsafe {
            match token {
                Some(v) => env::set_var(TOKEN_VAR, v),
                None => env::remove_var(TOKEN_VAR),
            }
            match repo {
                Some(v) => env::set_var(REPO_VAR, v),
                None => env::remove_var(REPO_VAR),
            }
        }
    }

    #[test]
    fn new_rejects_empty_values() {
        assert!(StorageConfig::new("", "owner/repo").is_err());
        assert!(StorageConfig::new("token", "").is_err());
        assert!(StorageConfig::new("token", "owner/repo").is_ok());
    }

    #[test]
    #[serial]
    fn resolve_prefers_complete_settings() {
        set_env_pair(Some("env-token"), Some("env/repo"));
        let settings = Settings {
            access_token: Some("settings-token".to_string()),
            repository: Some("owner/repo".to_string()),
            api_base: None,
        };

        let config = StorageConfig::resolve(&settings).unwrap();
        assert_eq!(config.access_token, "settings-token");
        assert_eq!(config.repository, "owner/repo");

        set_env_pair(None, None);
    }

    #[test]
    #[serial]
    fn resolve_falls_back_to_environment_pair() {
        set_env_pair(Some("env-token"), Some("env/repo"));

        let config = StorageConfig::resolve(&Settings::default()).unwrap();
        assert_eq!(config.access_token, "env-token");
        assert_eq!(config.repository, "env/repo");

        set_env_pair(None, None);
    }

    #[test]
    #[serial]
    fn resolve_never_mixes_sources() {
        // Token in settings, repository only in the environment: the
        // incomplete settings table is discarded wholesale, and the
        // environment pair is itself incomplete.
        set_env_pair(None, Some("env/repo"));
        let settings = Settings {
            access_token: Some("settings-token".to_string()),
            repository: None,
            api_base: None,
        };

        let err = StorageConfig::resolve(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));

        set_env_pair(None, None);
    }

    #[test]
    #[serial]
    fn resolve_treats_empty_strings_as_absent() {
        set_env_pair(Some("env-token"), Some("env/repo"));
        let settings = Settings {
            access_token: Some(String::new()),
            repository: Some("owner/repo".to_string()),
            api_base: None,
        };

        let config = StorageConfig::resolve(&settings).unwrap();
        assert_eq!(config.access_token, "env-token");
        assert_eq!(config.repository, "env/repo");

        set_env_pair(None, None);
    }

    #[test]
    #[serial]
    fn resolve_reports_missing_configuration() {
        set_env_pair(None, None);

        let err = StorageConfig::resolve(&Settings::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(TOKEN_VAR));
        assert!(message.contains(REPO_VAR));
    }

    #[test]
    fn settings_keep_api_base() {
        let settings = Settings {
            access_token: Some("token".to_string()),
            repository: Some("owner/repo".to_string()),
            api_base: Some("https://github.example.com/api/v3".to_string()),
        };

        let config = StorageConfig::resolve(&settings).unwrap();
        assert_eq!(
            config.api_base.as_deref(),
            Some("https://github.example.com/api/v3")
        );
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "access_token = \"token\"").unwrap();
        writeln!(file, "repository = \"owner/repo\"").unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.access_token.as_deref(), Some("token"));
        assert_eq!(settings.repository.as_deref(), Some("owner/repo"));
        assert!(settings.api_base.is_none());
    }

    #[test]
    fn load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "access_token = [not toml").unwrap();

        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Settings::load("/nonexistent/hubstore.toml").unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }
}
