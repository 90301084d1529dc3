//! Configuration loading for the content tree.
//!
//! Reads `~/.content-tree/config.toml`. Raw TOML structs keep `Option`
//! fields; [`ContentTreeConfig::tree_settings`] and friends resolve them into
//! validated `content-tree-types` values.
//!
//! ```toml
//! [tree]
//! root_location_id = 2
//! current_location_path = "/1/2/43/"
//! subitems_load_limit = 10
//!
//! [rest]
//! base_url = "https://cms.example.com"
//! siteaccess = "admin"
//! token = "${CONTENT_TREE_CSRF_TOKEN}"
//!
//! [storage]
//! dir = "/var/lib/content-tree"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use content_tree_types::{LocationId, LocationPath, PageSize, RestInfo, TreeSettings};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_DIR_NAME: &str = ".content-tree";

#[derive(Debug, Default, Deserialize)]
pub struct ContentTreeConfig {
    pub tree: Option<TreeConfig>,
    pub rest: Option<RestConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TreeConfig {
    /// Root of the managed subtree. Default: 2.
    pub root_location_id: Option<u64>,
    /// Slash-delimited path of the viewed location, e.g. `/1/2/43/`.
    pub current_location_path: Option<String>,
    /// Children fetched per request. Default: 10.
    pub subitems_load_limit: Option<u32>,
}

#[derive(Default, Deserialize)]
pub struct RestConfig {
    pub base_url: Option<String>,
    pub siteaccess: Option<String>,
    /// CSRF token; `${ENV_VAR}` references are expanded.
    pub token: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("siteaccess", &self.siteaccess)
            .field(
                "token",
                &if self.token.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ContentTreeConfig {
    /// Load the config from its default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    pub fn tree_settings(&self) -> Result<TreeSettings, ConfigError> {
        let Some(tree) = self.tree.as_ref() else {
            return Ok(TreeSettings::default());
        };

        let root_location_id = tree
            .root_location_id
            .map_or(LocationId::SYSTEM_ROOT, LocationId::new);
        let current_location_path = match tree.current_location_path.as_deref() {
            Some(raw) => {
                LocationPath::from_slashed(raw).map_err(|e| ConfigError::Invalid {
                    field: "tree.current_location_path",
                    reason: e.to_string(),
                })?
            }
            None => LocationPath::default(),
        };
        let subitems_load_limit = match tree.subitems_load_limit {
            Some(raw) => PageSize::new(raw).map_err(|e| ConfigError::Invalid {
                field: "tree.subitems_load_limit",
                reason: e.to_string(),
            })?,
            None => PageSize::default(),
        };

        Ok(TreeSettings {
            root_location_id,
            current_location_path,
            subitems_load_limit,
        })
    }

    #[must_use]
    pub fn rest_info(&self) -> RestInfo {
        let rest = self.rest.as_ref();
        RestInfo::new(
            rest.and_then(|r| r.token.as_deref())
                .map(expand_env_vars)
                .unwrap_or_default(),
            rest.and_then(|r| r.siteaccess.as_deref())
                .map(expand_env_vars)
                .unwrap_or_default(),
        )
    }

    pub fn base_url(&self) -> Result<String, ConfigError> {
        self.rest
            .as_ref()
            .and_then(|r| r.base_url.as_deref())
            .map(expand_env_vars)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Invalid {
                field: "rest.base_url",
                reason: "must be set".to_string(),
            })
    }

    /// Directory for persisted tree state. Defaults to `~/.content-tree/state`.
    #[must_use]
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage
            .as_ref()
            .and_then(|s| s.dir.as_deref())
            .map(|dir| PathBuf::from(expand_env_vars(dir)))
            .or_else(|| config_dir().map(|dir| dir.join("state")))
    }
}

/// Replace `${VAR}` references with the variable's value (empty when unset).
///
/// An unterminated `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = ContentTreeConfig::parse("").unwrap();
        let settings = config.tree_settings().unwrap();
        assert_eq!(settings, TreeSettings::default());
        assert_eq!(config.rest_info(), RestInfo::default());
    }

    #[test]
    fn parse_tree_section() {
        let config = ContentTreeConfig::parse(
            r#"
            [tree]
            root_location_id = 5
            current_location_path = "/1/5/60/"
            subitems_load_limit = 25
            "#,
        )
        .unwrap();

        let settings = config.tree_settings().unwrap();
        assert_eq!(settings.root_location_id, LocationId::new(5));
        assert_eq!(settings.current_location_id(), Some(LocationId::new(60)));
        assert_eq!(settings.subitems_load_limit.get(), 25);
    }

    #[test]
    fn zero_load_limit_is_invalid() {
        let config = ContentTreeConfig::parse("[tree]\nsubitems_load_limit = 0\n").unwrap();
        let err = config.tree_settings().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "tree.subitems_load_limit",
                ..
            }
        ));
    }

    #[test]
    fn malformed_current_path_is_invalid() {
        let config =
            ContentTreeConfig::parse("[tree]\ncurrent_location_path = \"/1/two/\"\n").unwrap();
        assert!(config.tree_settings().is_err());
    }

    #[test]
    fn rest_section_expands_token() {
        // SAFETY: test-only env var with a unique name.
        unsafe { env::set_var("CONTENT_TREE_TEST_TOKEN", "from-env") };
        let config = ContentTreeConfig::parse(
            r#"
            [rest]
            base_url = "https://cms.test/"
            siteaccess = "admin"
            token = "${CONTENT_TREE_TEST_TOKEN}"
            "#,
        )
        .unwrap();

        assert_eq!(config.rest_info(), RestInfo::new("from-env", "admin"));
        assert_eq!(config.base_url().unwrap(), "https://cms.test/");
    }

    #[test]
    fn missing_base_url_is_invalid() {
        let config = ContentTreeConfig::parse("[rest]\nsiteaccess = \"admin\"\n").unwrap();
        assert!(config.base_url().is_err());
    }

    #[test]
    fn rest_config_debug_redacts_token() {
        let config = ContentTreeConfig::parse("[rest]\ntoken = \"secret-value\"\n").unwrap();
        let debug = format!("{:?}", config.rest);
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn storage_dir_from_config() {
        let config = ContentTreeConfig::parse("[storage]\ndir = \"/tmp/tree-state\"\n").unwrap();
        assert_eq!(config.storage_dir(), Some(PathBuf::from("/tmp/tree-state")));
    }

    #[test]
    fn expand_env_vars_cases() {
        // SAFETY: test-only env vars with unique names.
        unsafe {
            env::set_var("CT_EXPAND_A", "alpha");
            env::set_var("CT_EXPAND_B", "beta");
        }
        assert_eq!(expand_env_vars("plain"), "plain");
        assert_eq!(expand_env_vars("${CT_EXPAND_A}-${CT_EXPAND_B}"), "alpha-beta");
        assert_eq!(expand_env_vars("x ${CT_EXPAND_MISSING} y"), "x  y");
        assert_eq!(expand_env_vars("keep ${} this"), "keep  this");
        assert_eq!(expand_env_vars("open ${CT_EXPAND_A"), "open ${CT_EXPAND_A");
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tree\n").unwrap();

        let err = ContentTreeConfig::load_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
