//! Documentation proxy: fetch upstream pages and rewrite them for local serving.
//!
//! Pages are fetched from `docs.base_url` and, when they are HTML, pass
//! through [`RewriteRules`] in this order:
//!
//! 1. embedded `<script>` blocks are removed
//! 2. page chrome matching the configured patterns is removed
//! 3. relative `href`/`src` values in `<link>` and `<img>` tags become
//!    absolute upstream URLs
//! 4. source-view anchors become absolute and open in a new tab
//! 5. external `http(s):` anchors open in a new tab
//! 6. the supplementary snippet is inserted before `</body>`
//!
//! Chrome is stripped before links are rewritten so a removed region never
//! swallows a rewrite meant for markup that survives. Other file types pass
//! through untouched apart from their content type.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use regex::bytes::{Captures, Regex, RegexBuilder};

use crate::cache::{Cache, CacheKey, Namespace};
use crate::config::DocsSection;
use crate::core::KitchenError;

/// Content type of a served document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    JavaScript,
    Css,
    Text,
}

impl ContentKind {
    pub fn from_path(path: &str) -> Self {
        let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("html") => Self::Html,
            Some("js") => Self::JavaScript,
            Some("css") => Self::Css,
            _ => Self::Text,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::JavaScript => "text/javascript; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    pub const fn is_markup(self) -> bool {
        matches!(self, Self::Html)
    }
}

/// A fetched and possibly rewritten document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub kind: ContentKind,
    pub body: Vec<u8>,
}

/// Compiled rewrite rules for one upstream host.
#[derive(Debug, Clone)]
pub struct RewriteRules {
    base_url: String,
    script: Regex,
    chrome: Vec<Regex>,
    asset_tag: Regex,
    url_attr: Regex,
    source_anchor: Regex,
    external_anchor: Regex,
    body_close: Regex,
    extra: String,
}

impl RewriteRules {
    /// Compile the rules described by the `[docs]` section.
    ///
    /// Patterns run over raw bytes with Unicode disabled, so pages in any
    /// ASCII-compatible encoding pass through byte for byte.
    ///
    /// # Errors
    ///
    /// [`KitchenError::ConfigError`] when a configured pattern is not a valid regex.
    pub fn from_config(config: &DocsSection) -> Result<Self, KitchenError> {
        let compile = |pattern: &str| {
            RegexBuilder::new(pattern).unicode(false).build().map_err(|e| {
                KitchenError::ConfigError {
                    message: format!("invalid docs pattern {pattern:?}: {e}"),
                }
            })
        };

        let chrome = config
            .chrome_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            script: compile(r"(?msi)<script[\s>].*?</script>")?,
            chrome,
            asset_tag: compile(r"(?i)<(?:link|img)\b[^>]*>")?,
            url_attr: compile(r#"(?i)\s+(href|src)="([^">]+)""#)?,
            source_anchor: compile(&format!(
                r#"(?i)<a\b[^>]*?href="(?:{})[^>]*>"#,
                config.source_link_pattern
            ))?,
            external_anchor: compile(r#"(?i)<a\b[^>]*?href="https?:[^>]*>"#)?,
            body_close: compile(r"(?i)</body>")?,
            extra: config.extra.replace("{base_url}", &config.base_url),
        })
    }

    /// Root that relative links are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Apply every rule to an HTML page.
    pub fn rewrite(&self, html: &[u8]) -> Vec<u8> {
        let mut page = self.script.replace_all(html, &b""[..]).into_owned();
        for chrome in &self.chrome {
            page = chrome.replace_all(&page, &b""[..]).into_owned();
        }

        let page = self.asset_tag.replace_all(&page, |c: &Captures| self.absolutize(&c[0]));
        let page = self.source_anchor.replace_all(&page, |c: &Captures| {
            open_in_new_tab(&self.absolutize(&c[0])).into_owned()
        });
        let page = self
            .external_anchor
            .replace_all(&page, |c: &Captures| open_in_new_tab(&c[0]).into_owned());

        let extra = self.extra.as_bytes();
        self.body_close
            .replacen(&page, 1, |c: &Captures| [extra, &c[0]].concat())
            .into_owned()
    }

    /// Make every relative `href`/`src` inside one tag absolute.
    fn absolutize(&self, tag: &[u8]) -> Vec<u8> {
        self.url_attr
            .replace_all(tag, |c: &Captures| {
                let value = &c[2];
                let base: &[u8] = if is_relative(value) { self.base_url.as_bytes() } else { &[] };
                let parts: [&[u8]; 6] = [b" ", &c[1], b"=\"", base, value, b"\""];
                parts.concat()
            })
            .into_owned()
    }
}

fn is_relative(url: &[u8]) -> bool {
    let lower = url.to_ascii_lowercase();
    !["http:", "https:", "//", "#", "mailto:", "javascript:", "data:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix.as_bytes()))
}

/// Add `target="_blank"` to an opening anchor tag that lacks a target.
fn open_in_new_tab(anchor: &[u8]) -> Cow<'_, [u8]> {
    let lower = anchor.to_ascii_lowercase();
    if lower.windows(b"target=".len()).any(|w| w == b"target=") {
        return Cow::Borrowed(anchor);
    }
    match anchor.get(2..) {
        Some(rest) => Cow::Owned([&b"<a target=\"_blank\""[..], rest].concat()),
        None => Cow::Borrowed(anchor),
    }
}

/// Accept a single path segment naming an upstream file.
pub fn validate_path(path: &str) -> Result<(), KitchenError> {
    let invalid = path.is_empty()
        || path == "."
        || path == ".."
        || path.contains('/')
        || path.contains('\\')
        || path.contains("..");
    if invalid {
        return Err(KitchenError::InvalidDocumentPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Fetches upstream documents and rewrites HTML pages.
#[derive(Debug, Clone)]
pub struct DocsProxy {
    http: reqwest::Client,
    rules: Arc<RewriteRules>,
    base_url: String,
    timeout: Duration,
    ttl: Duration,
}

impl DocsProxy {
    /// Build a proxy from the `[docs]` section.
    pub fn new(config: &DocsSection) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kitchen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for the documentation host")?;
        Self::with_client(http, config)
    }

    pub fn with_client(http: reqwest::Client, config: &DocsSection) -> anyhow::Result<Self> {
        let rules = RewriteRules::from_config(config)?;
        Ok(Self {
            http,
            rules: Arc::new(rules),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            ttl: config.ttl(),
        })
    }

    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    /// Fetch one document and rewrite it when it is HTML.
    ///
    /// # Errors
    ///
    /// - [`KitchenError::InvalidDocumentPath`] for anything but a single file name
    /// - [`KitchenError::UpstreamNotFound`] when upstream answers with a non-success status
    /// - [`KitchenError::NetworkError`] when upstream cannot be reached in time
    pub async fn fetch(&self, path: &str) -> Result<Document, KitchenError> {
        validate_path(path)?;

        let url = format!("{}{}", self.base_url, path);
        tracing::info!("fetching {}...", url);

        let network_error = |reason: String| KitchenError::NetworkError {
            operation: format!("fetch {url}"),
            reason,
        };

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        if !response.status().is_success() {
            tracing::info!("Failed to fetch {} ({}).", url, response.status());
            return Err(KitchenError::UpstreamNotFound {
                path: path.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| network_error(e.to_string()))?;
        let kind = ContentKind::from_path(path);
        let body = if kind.is_markup() {
            self.rules.rewrite(&bytes)
        } else {
            bytes.to_vec()
        };

        Ok(Document {
            path: path.to_string(),
            kind,
            body,
        })
    }

    /// Fetch through the shared cache, keyed by the literal path.
    ///
    /// Failures reach the caller and leave no entry behind.
    pub async fn fetch_cached(
        &self,
        cache: &Cache,
        path: &str,
    ) -> Result<Arc<Document>, KitchenError> {
        cache
            .get_or_compute(CacheKey::new(Namespace::Docs, path), Some(self.ttl), || {
                self.fetch(path)
            })
            .await
    }
}
