//! Configuration module for the companion tool.
//!
//! Provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `EVE_` and use double
//! underscores to separate nested levels:
//! - `EVE_CACHE__ENABLED=false` sets `cache.enabled`
//! - `EVE_SDE__ARCHIVE_URL=...` sets `sde.archive_url`
//! - `EVE_ROUTE__SECURITY_PREFERENCE=shortest` sets `route.security_preference`

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Static data cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Bulk dataset (SDE) source configuration
    #[serde(default)]
    pub sde: SdeConfig,

    /// ESI endpoint configuration
    #[serde(default)]
    pub esi: EsiConfig,

    /// Route-planning preferences
    #[serde(default)]
    pub route: RouteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Directory holding the cache data file, manifest, installation id,
    /// and the unpacked dataset working copy
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Whether the static data cache subsystem is enabled. When disabled,
    /// every lookup goes straight to ESI and nothing is persisted.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SdeConfig {
    /// Where to fetch the compressed dataset archive from
    #[serde(default = "default_archive_url")]
    pub archive_url: String,

    /// Dataset-specific directory spelling divergences, applied to
    /// whitespace-stripped name components when deriving per-system detail
    /// file paths. Keyed by indexed name fragment.
    #[serde(default = "default_path_exceptions")]
    pub path_exceptions: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EsiConfig {
    /// ESI root, including version segment
    #[serde(default = "default_esi_root")]
    pub root: String,

    /// User-Agent sent with every request, as ESI etiquette requires
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Route security preference, mirroring the ESI `flag` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SecurityPreference {
    Secure,
    Insecure,
    Shortest,
}

impl SecurityPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Insecure => "insecure",
            Self::Shortest => "shortest",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouteConfig {
    #[serde(default = "default_security_preference")]
    pub security_preference: SecurityPreference,

    /// Pod-kill count at which a system is flagged as super-dangerous
    #[serde(default = "default_super_danger_threshold")]
    pub super_danger_threshold: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".evepal"))
        .join("evepal")
}
fn default_archive_url() -> String {
    "https://eve-static-data-export.s3-eu-west-1.amazonaws.com/tranquility/sde.tar.gz".to_string()
}
fn default_path_exceptions() -> HashMap<String, String> {
    // Known dataset quirk: one constellation's directory is spelled with the
    // British double-l while its indexed name is not.
    HashMap::from([("Tranquility".to_string(), "Tranquillity".to_string())])
}
fn default_esi_root() -> String {
    "https://esi.evetech.net/latest".to_string()
}
fn default_user_agent() -> String {
    format!("evepal/{}", env!("CARGO_PKG_VERSION"))
}
fn default_security_preference() -> SecurityPreference {
    SecurityPreference::Secure
}
fn default_super_danger_threshold() -> u32 {
    5
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            cache: CacheConfig::default(),
            sde: SdeConfig::default(),
            esi: EsiConfig::default(),
            route: RouteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            enabled: true,
        }
    }
}

impl Default for SdeConfig {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            path_exceptions: default_path_exceptions(),
        }
    }
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            root: default_esi_root(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            security_preference: default_security_preference(),
            super_danger_threshold: default_super_danger_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path =
            Self::find_config_file().unwrap_or_else(|| PathBuf::from(".evepal/settings.toml"));

        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with EVE_ prefix;
            // double underscore separates nested levels
            .merge(
                Env::prefixed("EVE_")
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(Box::new)
    }

    /// Find the settings file by walking from the current directory up to
    /// the filesystem root, falling back to the user config directory.
    fn find_config_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let candidate = ancestor.join(".evepal").join("settings.toml");
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let user = dirs::config_dir()?.join("evepal").join("settings.toml");
        user.is_file().then_some(user)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".evepal/settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let settings = Settings::default();
        settings.save(&config_path)?;

        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.cache.enabled);
        assert!(settings.sde.archive_url.starts_with("https://"));
        assert_eq!(
            settings
                .sde
                .path_exceptions
                .get("Tranquility")
                .map(String::as_str),
            Some("Tranquillity")
        );
        assert_eq!(
            settings.route.security_preference,
            SecurityPreference::Secure
        );
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[cache]
dir = "/tmp/evetest"
enabled = false

[route]
security_preference = "shortest"
super_danger_threshold = 12
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.cache.dir, PathBuf::from("/tmp/evetest"));
        assert!(!settings.cache.enabled);
        assert_eq!(
            settings.route.security_preference,
            SecurityPreference::Shortest
        );
        assert_eq!(settings.route.super_danger_threshold, 12);

        // Defaults fill unspecified sections
        assert!(settings.esi.root.starts_with("https://esi."));
        assert!(!settings.sde.path_exceptions.is_empty());
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let mut settings = Settings::default();
        settings.route.super_danger_threshold = 3;
        settings.cache.enabled = false;

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.route.super_danger_threshold, 3);
        assert!(!loaded.cache.enabled);
    }

    #[test]
    fn test_security_preference_flag_strings() {
        assert_eq!(SecurityPreference::Secure.as_str(), "secure");
        assert_eq!(SecurityPreference::Insecure.as_str(), "insecure");
        assert_eq!(SecurityPreference::Shortest.as_str(), "shortest");
    }
}
