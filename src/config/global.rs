//! Kitchen configuration file (`~/.kitchen/config.toml`).
//!
//! Every section and every field is optional; a missing file yields the
//! defaults below, which reproduce the hosted playground's behaviour.
//!
//! # File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! admin_token = "change-me"
//!
//! [deps]
//! manifest = "closure/goog/deps.js"
//! root = "closure/goog"
//! base_file = "base.js"
//! bootstrap = ["goog.debug.Logger", "goog.debug.LogManager"]
//! ttl_secs = 21600
//!
//! [compiler]
//! endpoint = "http://closure-compiler.appspot.com/compile"
//! timeout_secs = 10
//!
//! [docs]
//! base_url = "http://closure-library.googlecode.com/svn/docs/"
//! chrome_patterns = ['(?ms)^<div id="header">.*?^</div>']
//!
//! [samples]
//! ttl_secs = 86400
//!
//! [cache]
//! max_entries = 10000
//! ```
//!
//! # Location
//!
//! - `--config <path>` on the command line
//! - otherwise `$KITCHEN_CONFIG_PATH`
//! - otherwise `~/.kitchen/config.toml` (`%LOCALAPPDATA%\kitchen\config.toml` on Windows)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    COMPILE_DEADLINE, CONFIG_PATH_ENV, DEFAULT_BOOTSTRAP_SYMBOLS, DEFAULT_CACHE_MAX_ENTRIES,
    DEFAULT_COMPILER_ENDPOINT, DEFAULT_DOCS_BASE_URL, DEPS_CACHE_TTL, DOCS_CACHE_TTL,
    DOCS_FETCH_TIMEOUT, SAMPLES_CACHE_TTL,
};
use crate::core::KitchenError;

/// Script sent ahead of every compilation so the compiled preview forwards
/// its `goog.debug` log records to the playground's console pane.
const DEFAULT_COMPILER_PRELUDE: &str = r#"
goog.require('goog.debug.Logger');
goog.require('goog.debug.LogManager');
(function() {
  function logProxy(r) {
    window.parent['closurekitchen']['ConsolePane']['addLogRecord']({
      'level': r.getLevel(), 'msg': r.getMessage(), 'loggerName': r.getLoggerName(), 'time': r.getMillis(),'exception':r.getException(),'exceptionText':r.getExceptionText() });
  }
  goog.debug.LogManager.getRoot().addHandler(logProxy);
})();
"#;

/// Header block of the legacy SVN documentation pages.
const LEGACY_HEADER_PATTERN: &str = r#"(?msi)^<div id="header">.*?^</div>"#;

/// Right-hand navigation column of the legacy SVN documentation pages.
const LEGACY_COLUMN_PATTERN: &str = r#"(?msi)<div class="col2">.*?<!-- Column 2 end -->\s*</div>"#;

/// Anchors pointing at source views of the documented files.
const DEFAULT_SOURCE_LINK_PATTERN: &str = r#"\.\./trunk/|[^">]*\.source\.html"#;

/// Snippet appended before `</body>` of every rewritten page.
const DEFAULT_DOCS_EXTRA: &str = r#"
<style>
.rightmenu .colleft { right:0; }
.rightmenu .col1 { left:0; width:100%; }
.goog-zippy-expanded, .goog-zippy-collapsed { outline:none; }
.goog-zippy-expanded img  {
  background-image: url('{base_url}static/images/minus.png');
}
.goog-zippy-collapsed img {
  background-image: url('{base_url}static/images/plus.png');
}
</style>
<script src="../files/closuredocs.js"></script>"#;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KitchenConfig {
    /// HTTP listener settings.
    pub server: ServerSection,
    /// Symbol table and bundle settings.
    pub deps: DepsSection,
    /// Remote compilation service settings.
    pub compiler: CompilerSection,
    /// Documentation proxy settings.
    pub docs: DocsSection,
    /// Public sample listing settings.
    pub samples: SamplesSection,
    /// Shared cache settings.
    pub cache: CacheSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSection {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Bearer token identifying the administrator. Without one, nobody is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_token: None,
        }
    }
}

/// `[deps]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DepsSection {
    /// Path of the `deps.js` manifest.
    pub manifest: PathBuf,
    /// Directory the manifest's file paths are relative to.
    /// Defaults to the manifest's own directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Base runtime file, relative to `root`, always emitted first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_file: Option<PathBuf>,
    /// Symbols loaded into every bundle after the base file.
    pub bootstrap: Vec<String>,
    /// Lifetime of a cached bundle in seconds.
    pub ttl_secs: u64,
}

impl Default for DepsSection {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("deps.js"),
            root: None,
            base_file: Some(PathBuf::from("base.js")),
            bootstrap: DEFAULT_BOOTSTRAP_SYMBOLS.iter().map(|s| (*s).to_string()).collect(),
            ttl_secs: DEPS_CACHE_TTL.as_secs(),
        }
    }
}

impl DepsSection {
    /// Directory used to resolve manifest entries.
    pub fn source_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            self.manifest.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
        })
    }

    /// Bundle lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[compiler]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerSection {
    /// Compilation service URL.
    pub endpoint: String,
    /// Request deadline in seconds.
    pub timeout_secs: u64,
    /// Script submitted as a leading `js_code` field. Empty disables it.
    pub prelude: String,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COMPILER_ENDPOINT.to_string(),
            timeout_secs: COMPILE_DEADLINE.as_secs(),
            prelude: DEFAULT_COMPILER_PRELUDE.to_string(),
        }
    }
}

impl CompilerSection {
    /// Request deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[docs]` section.
///
/// The upstream host moved from a hand-written SVN tree to a generated site
/// with different page chrome; both are expressed by swapping `base_url`
/// and `chrome_patterns` here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocsSection {
    /// Upstream documentation root, ending in `/`.
    pub base_url: String,
    /// Fetch deadline in seconds.
    pub timeout_secs: u64,
    /// Lifetime of a cached page in seconds.
    pub ttl_secs: u64,
    /// Regexes whose matches are removed before links are rewritten.
    pub chrome_patterns: Vec<String>,
    /// Regex matched against `href` values of source-view anchors.
    pub source_link_pattern: String,
    /// Snippet inserted before `</body>`; `{base_url}` is expanded.
    pub extra: String,
}

impl Default for DocsSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            timeout_secs: DOCS_FETCH_TIMEOUT.as_secs(),
            ttl_secs: DOCS_CACHE_TTL.as_secs(),
            chrome_patterns: vec![
                LEGACY_HEADER_PATTERN.to_string(),
                LEGACY_COLUMN_PATTERN.to_string(),
            ],
            source_link_pattern: DEFAULT_SOURCE_LINK_PATTERN.to_string(),
            extra: DEFAULT_DOCS_EXTRA.to_string(),
        }
    }
}

impl DocsSection {
    /// Fetch deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Page lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[samples]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SamplesSection {
    /// Lifetime of the cached listing in seconds.
    pub ttl_secs: u64,
}

impl Default for SamplesSection {
    fn default() -> Self {
        Self {
            ttl_secs: SAMPLES_CACHE_TTL.as_secs(),
        }
    }
}

impl SamplesSection {
    /// Listing lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheSection {
    /// Upper bound on live entries before the oldest are evicted.
    pub max_entries: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl KitchenConfig {
    /// Load from an explicit path, `$KITCHEN_CONFIG_PATH`, or the default location.
    ///
    /// A path that does not exist yields [`KitchenConfig::default`].
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match std::env::var_os(CONFIG_PATH_ENV) {
                Some(path) => PathBuf::from(path),
                None => Self::default_path()?,
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate a configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(KitchenError::from)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Platform default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("kitchen")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".kitchen")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Reject values that would make the server misbehave rather than fail.
    pub fn validate(&self) -> Result<(), KitchenError> {
        if self.compiler.timeout_secs == 0 {
            return Err(KitchenError::ConfigError {
                message: "compiler.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.docs.timeout_secs == 0 {
            return Err(KitchenError::ConfigError {
                message: "docs.timeout_secs must be greater than zero".to_string(),
            });
        }
        if !self.docs.base_url.ends_with('/') {
            return Err(KitchenError::ConfigError {
                message: format!("docs.base_url must end with '/': {}", self.docs.base_url),
            });
        }
        if self.cache.max_entries == 0 {
            return Err(KitchenError::ConfigError {
                message: "cache.max_entries must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Example configuration written by `kitchen config init`.
    pub fn init_example() -> Self {
        let mut config = Self::default();
        config.server.admin_token = Some("change-me".to_string());
        config.deps.manifest = PathBuf::from("closure/goog/deps.js");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = KitchenConfig::default();
        assert_eq!(config.compiler.timeout(), Duration::from_secs(10));
        assert_eq!(config.deps.bootstrap, vec!["goog.debug.Logger", "goog.debug.LogManager"]);
        assert_eq!(config.samples.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.docs.chrome_patterns.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: KitchenConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [docs]
            base_url = "https://example.org/docs/"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.docs.base_url, "https://example.org/docs/");
        assert_eq!(config.docs.ttl_secs, DOCS_CACHE_TTL.as_secs());
        assert_eq!(config.compiler.endpoint, DEFAULT_COMPILER_ENDPOINT);
    }

    #[test]
    fn test_source_root_defaults_to_manifest_dir() {
        let mut deps = DepsSection {
            manifest: PathBuf::from("lib/goog/deps.js"),
            ..DepsSection::default()
        };
        assert_eq!(deps.source_root(), PathBuf::from("lib/goog"));

        deps.root = Some(PathBuf::from("/srv/closure"));
        assert_eq!(deps.source_root(), PathBuf::from("/srv/closure"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = KitchenConfig::default();
        config.docs.base_url = "https://example.org/docs".to_string();
        assert!(matches!(config.validate(), Err(KitchenError::ConfigError { .. })));

        let mut config = KitchenConfig::default();
        config.compiler.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = KitchenConfig::init_example();
        config.save_to(&path).await.unwrap();

        let loaded = KitchenConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config =
            KitchenConfig::load_with_optional(Some(temp.path().join("absent.toml"))).await.unwrap();
        assert_eq!(config, KitchenConfig::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_toml_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[server\nport = 1\n").unwrap();

        let err = KitchenConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<KitchenError>(), Some(KitchenError::TomlError(_))));

        let ctx = crate::core::user_friendly_error(err);
        assert!(matches!(ctx.error, KitchenError::TomlError(_)));
        assert!(ctx.suggestion.unwrap().contains("TOML syntax"));
    }
}
