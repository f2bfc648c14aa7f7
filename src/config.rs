//! Runtime configuration.
//!
//! A single [`RuntimeConfig`] lives in thread-local state, like every other
//! piece of runtime state. It can be replaced wholesale or loaded from JSON.

use std::cell::RefCell;

use serde::Deserialize;

use crate::error::Result;

/// Host tags known to carry an isolated subtree.
pub const DEFAULT_ISOLATED_HOSTS: &[&str] = &[
    "article", "aside", "blockquote", "body", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "main", "nav", "p", "section", "span",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Verbose render/mount logging.
    pub debug: bool,
    /// Allow-list of host tags that get an isolated subtree.
    pub isolated_hosts: Vec<String>,
    /// Warn when fragment output replaces foreign content in its parent.
    pub warn_on_content_drift: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            isolated_hosts: DEFAULT_ISOLATED_HOSTS.iter().map(|s| s.to_string()).collect(),
            warn_on_content_drift: true,
        }
    }
}

thread_local! {
    static CONFIG: RefCell<RuntimeConfig> = RefCell::new(RuntimeConfig::default());
}

/// Current configuration (cloned).
pub fn config() -> RuntimeConfig {
    CONFIG.with(|c| c.borrow().clone())
}

pub fn set_config(config: RuntimeConfig) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Load configuration from a JSON object. Missing keys keep their defaults.
pub fn load_config_json(json: &str) -> Result<()> {
    let parsed: RuntimeConfig = serde_json::from_str(json)?;
    set_config(parsed);
    Ok(())
}

pub fn reset_config() {
    set_config(RuntimeConfig::default());
}

/// Whether content mounted under `tag` goes into an isolated subtree.
///
/// Custom elements (any tag containing `-`) always qualify.
pub fn is_isolated_host(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    if tag.contains('-') {
        return true;
    }
    CONFIG.with(|c| c.borrow().isolated_hosts.iter().any(|h| h.eq_ignore_ascii_case(&tag)))
}

/// Install `env_logger` at `debug` (config.debug) or `warn`. `RUST_LOG` wins.
///
/// Safe to call more than once.
pub fn init_logging() {
    let level = if config().debug { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}
