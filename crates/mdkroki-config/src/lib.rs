//! Configuration management for mdkroki.
//!
//! Parses `mdkroki.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Some string values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `kroki.server_url`
//! - `kroki.user_agent`
//! - `cache.dir` (also expands a leading `~`)
//!
//! ## Example
//!
//! ```toml
//! [kroki]
//! server_url = "${KROKI_URL:-https://kroki.io}"
//! http_method = "POST"
//!
//! [diagrams]
//! fence_prefix = "kroki-"
//! file_types = ["svg", "png"]
//! file_type_overrides = { mermaid = "png" }
//!
//! [cache]
//! retention_days = 7
//! ```

mod expand;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Kroki server URL.
    pub server_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override fail-fast mode.
    pub fail_fast: Option<bool>,
    /// Override docs root directory.
    pub docs_root: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdkroki.toml";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Kroki server configuration.
    pub kroki: KrokiConfig,
    /// Diagram recognition and output configuration.
    pub diagrams: DiagramsConfig,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Kroki server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KrokiConfig {
    /// Kroki server URL.
    pub server_url: String,
    /// `GET` (reference images by URL) or `POST` (embed fetched images).
    pub http_method: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Value of the `User-Agent` header sent with `POST` requests.
    pub user_agent: Option<String>,
}

impl Default for KrokiConfig {
    fn default() -> Self {
        Self {
            server_url: "https://kroki.io".to_owned(),
            http_method: "POST".to_owned(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl KrokiConfig {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Diagram recognition and output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DiagramsConfig {
    /// Prefix a fence language must carry (e.g. `kroki-`).
    pub fence_prefix: String,
    /// Output extensions in order of preference.
    pub file_types: Vec<String>,
    /// Output extension per diagram type, overriding `file_types`.
    pub file_type_overrides: BTreeMap<String, String>,
    pub enable_blockdiag: bool,
    pub enable_bpmn: bool,
    pub enable_excalidraw: bool,
    pub enable_mermaid: bool,
    pub enable_diagramsnet: bool,
    /// `object`, `img` or `svg`.
    pub tag_format: String,
    /// Abort the document on the first failing diagram.
    pub fail_fast: bool,
    /// Worker threads for rendering (defaults to the global pool).
    pub max_concurrency: Option<usize>,
    /// Maximum indentation of a fence opener.
    pub fence_max_indent: usize,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            fence_prefix: String::new(),
            file_types: vec!["svg".to_owned()],
            file_type_overrides: BTreeMap::new(),
            enable_blockdiag: true,
            enable_bpmn: true,
            enable_excalidraw: true,
            enable_mermaid: true,
            enable_diagramsnet: true,
            tag_format: "img".to_owned(),
            fail_fast: false,
            max_concurrency: None,
            fence_max_indent: 3,
        }
    }
}

impl DiagramsConfig {
    /// Names of the optional diagram families that are enabled.
    #[must_use]
    pub fn enabled_families(&self) -> Vec<&'static str> {
        [
            ("blockdiag", self.enable_blockdiag),
            ("bpmn", self.enable_bpmn),
            ("excalidraw", self.enable_excalidraw),
            ("mermaid", self.enable_mermaid),
            ("diagramsnet", self.enable_diagramsnet),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }
}

/// Raw cache configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    retention_days: Option<u64>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug)]
pub struct CacheConfig {
    /// Whether rendered diagrams are cached on disk.
    pub enabled: bool,
    /// Cache directory, or `None` for the platform default.
    pub dir: Option<PathBuf>,
    /// Days a disk entry is kept after its last use.
    pub retention_days: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            retention_days: 3,
        }
    }
}

impl CacheConfig {
    /// Retention window.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(SECONDS_PER_DAY))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    root: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory `@from_file:` references are relative to.
    pub root: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`kroki.server_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a numeric field to be greater than zero.
fn require_positive(value: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// Require a field to hold one of `allowed`.
fn require_one_of(
    value: &str,
    allowed: &[&str],
    field: &str,
    ignore_case: bool,
) -> Result<(), ConfigError> {
    let matches = |a: &&str| {
        if ignore_case {
            a.eq_ignore_ascii_case(value)
        } else {
            *a == value
        }
    };
    if !allowed.iter().any(matches) {
        return Err(ConfigError::Validation(format!(
            "{field} must be one of {}, got \"{value}\"",
            allowed.join(", ")
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdkroki.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated after they are applied.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(server_url) = &settings.server_url {
            self.kroki.server_url.clone_from(server_url);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
        if let Some(fail_fast) = settings.fail_fast {
            self.diagrams.fail_fast = fail_fast;
        }
        if let Some(docs_root) = &settings.docs_root {
            self.docs_resolved.root.clone_from(docs_root);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            kroki: KrokiConfig::default(),
            diagrams: DiagramsConfig::default(),
            cache: CacheConfigRaw::default(),
            docs: DocsConfigRaw::default(),
            cache_resolved: CacheConfig::default(),
            docs_resolved: DocsConfig {
                root: base.join("docs"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_kroki()?;
        self.validate_diagrams()?;
        require_positive(self.cache_resolved.retention_days, "cache.retention_days")?;
        Ok(())
    }

    fn validate_kroki(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.kroki.server_url, "kroki.server_url")?;
        require_http_url(&self.kroki.server_url, "kroki.server_url")?;
        require_one_of(
            &self.kroki.http_method,
            &["GET", "POST"],
            "kroki.http_method",
            true,
        )?;
        require_positive(self.kroki.timeout_secs, "kroki.timeout_secs")?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams;
        if diagrams.file_types.is_empty() {
            return Err(ConfigError::Validation(
                "diagrams.file_types cannot be empty".to_owned(),
            ));
        }
        require_one_of(
            &diagrams.tag_format,
            &["object", "img", "svg"],
            "diagrams.tag_format",
            false,
        )?;
        if diagrams.max_concurrency == Some(0) {
            return Err(ConfigError::Validation(
                "diagrams.max_concurrency must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.kroki.server_url = expand::expand_env(&self.kroki.server_url, "kroki.server_url")?;

        if let Some(ref user_agent) = self.kroki.user_agent {
            self.kroki.user_agent = Some(expand::expand_env(user_agent, "kroki.user_agent")?);
        }

        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand_path(dir, "cache.dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            root: config_dir.join(self.docs.root.as_deref().unwrap_or("docs")),
        };

        let defaults = CacheConfig::default();
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(defaults.enabled),
            dir: self.cache.dir.as_deref().map(|d| config_dir.join(d)),
            retention_days: self.cache.retention_days.unwrap_or(defaults.retention_days),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.kroki.server_url, "https://kroki.io");
        assert_eq!(config.kroki.http_method, "POST");
        assert_eq!(config.kroki.timeout(), Duration::from_secs(30));
        assert_eq!(config.diagrams.file_types, vec!["svg".to_owned()]);
        assert_eq!(config.diagrams.tag_format, "img");
        assert_eq!(config.diagrams.fence_max_indent, 3);
        assert!(!config.diagrams.fail_fast);
        assert_eq!(config.docs_resolved.root, PathBuf::from("/test/docs"));
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, None);
        assert_eq!(
            config.cache_resolved.retention(),
            Duration::from_secs(3 * SECONDS_PER_DAY)
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.kroki.server_url, "https://kroki.io");
        assert_eq!(config.diagrams.enabled_families().len(), 5);
    }

    #[test]
    fn test_parse_kroki_config() {
        let toml = r#"
[kroki]
server_url = "http://localhost:8000"
http_method = "get"
timeout_secs = 5
user_agent = "docs-build/1.0"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.kroki.server_url, "http://localhost:8000");
        assert_eq!(config.kroki.http_method, "get");
        assert_eq!(config.kroki.timeout(), Duration::from_secs(5));
        assert_eq!(config.kroki.user_agent.as_deref(), Some("docs-build/1.0"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_diagrams_config() {
        let toml = r#"
[diagrams]
fence_prefix = "kroki-"
file_types = ["png", "svg"]
file_type_overrides = { mermaid = "svg" }
enable_bpmn = false
enable_mermaid = false
tag_format = "object"
fail_fast = true
max_concurrency = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let diagrams = &config.diagrams;
        assert_eq!(diagrams.fence_prefix, "kroki-");
        assert_eq!(diagrams.file_types, vec!["png".to_owned(), "svg".to_owned()]);
        assert_eq!(
            diagrams.file_type_overrides,
            BTreeMap::from([("mermaid".to_owned(), "svg".to_owned())])
        );
        assert_eq!(
            diagrams.enabled_families(),
            vec!["blockdiag", "excalidraw", "diagramsnet"]
        );
        assert_eq!(diagrams.tag_format, "object");
        assert!(diagrams.fail_fast);
        assert_eq!(diagrams.max_concurrency, Some(4));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
root = "documentation"

[cache]
enabled = false
dir = ".cache/diagrams"
retention_days = 7
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.root,
            PathBuf::from("/project/documentation")
        );
        assert!(!config.cache_resolved.enabled);
        assert_eq!(
            config.cache_resolved.dir,
            Some(PathBuf::from("/project/.cache/diagrams"))
        );
        assert_eq!(config.cache_resolved.retention_days, 7);
    }

    #[test]
    fn test_absolute_cache_dir_kept() {
        let mut config: Config = toml::from_str("[cache]\ndir = \"/var/cache/mdkroki\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.cache_resolved.dir,
            Some(PathBuf::from("/var/cache/mdkroki"))
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[kroki]\nserver_url = \"http://kroki.local\"\n\n[docs]\nroot = \"site\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.kroki.server_url, "http://kroki.local");
        assert_eq!(config.docs_resolved.root, tmp.path().join("site"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/mdkroki.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[kroki\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn test_load_validates_file_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[diagrams]\ntag_format = \"iframe\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("diagrams.tag_format"), "{err}");
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            server_url: Some("http://localhost:8000".to_owned()),
            cache_enabled: Some(false),
            fail_fast: Some(true),
            docs_root: Some(PathBuf::from("/custom/docs")),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.kroki.server_url, "http://localhost:8000");
        assert!(!config.cache_resolved.enabled);
        assert!(config.diagrams.fail_fast);
        assert_eq!(config.docs_resolved.root, PathBuf::from("/custom/docs"));
        assert_eq!(config.kroki.http_method, "POST"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.kroki.server_url, "https://kroki.io");
        assert!(config.cache_resolved.enabled);
        assert!(!config.diagrams.fail_fast);
    }

    #[test]
    fn test_cli_server_url_is_validated() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            server_url: Some("kroki.local".to_owned()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(err.to_string().contains("kroki.server_url"), "{err}");
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDKROKI_CONFIG_TEST_URL", "https://kroki.test.com");
            std::env::remove_var("MDKROKI_CONFIG_TEST_AGENT");
        }

        let toml = r#"
[kroki]
server_url = "${MDKROKI_CONFIG_TEST_URL}"
user_agent = "${MDKROKI_CONFIG_TEST_AGENT:-mdkroki}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.kroki.server_url, "https://kroki.test.com");
        assert_eq!(config.kroki.user_agent.as_deref(), Some("mdkroki"));

        unsafe {
            std::env::remove_var("MDKROKI_CONFIG_TEST_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDKROKI_CONFIG_TEST_MISSING");
        }

        let toml = r#"
[cache]
dir = "${MDKROKI_CONFIG_TEST_MISSING}/cache"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDKROKI_CONFIG_TEST_MISSING"));
        assert!(err.to_string().contains("cache.dir"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_server_url() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.kroki.server_url = String::new();
        assert_validation_error(&config, &["kroki.server_url", "empty"]);

        config.kroki.server_url = "ftp://kroki.io".to_owned();
        assert_validation_error(&config, &["kroki.server_url", "http"]);
    }

    #[test]
    fn test_validate_http_method() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.kroki.http_method = "PUT".to_owned();
        assert_validation_error(&config, &["kroki.http_method", "GET, POST", "PUT"]);
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.kroki.timeout_secs = 0;
        assert_validation_error(&config, &["kroki.timeout_secs", "greater than 0"]);
    }

    #[test]
    fn test_validate_file_types_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams.file_types.clear();
        assert_validation_error(&config, &["diagrams.file_types", "empty"]);
    }

    #[test]
    fn test_validate_tag_format_case_sensitive() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams.tag_format = "IMG".to_owned();
        assert_validation_error(&config, &["diagrams.tag_format"]);
    }

    #[test]
    fn test_validate_max_concurrency_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams.max_concurrency = Some(0);
        assert_validation_error(&config, &["diagrams.max_concurrency"]);
    }

    #[test]
    fn test_validate_retention_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.cache_resolved.retention_days = 0;
        assert_validation_error(&config, &["cache.retention_days"]);
    }
}
