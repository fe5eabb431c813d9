//! Provider configuration.
//!
//! Defaults are overridden by `BIBLIO_*` environment variables (a `.env`
//! file is honoured), which the CLI flags override in turn.
//!
//! | Variable               | Field                    |
//! |------------------------|--------------------------|
//! | `BIBLIO_INPUT_DIR`     | `input_dir`              |
//! | `BIBLIO_DOMAIN`        | `domain_name`            |
//! | `BIBLIO_ACCESS_CACHE`  | `cache_path`             |
//! | `BIBLIO_LANDING_URL`   | `landing_url_prefix`     |
//! | `BIBLIO_PROBE_TIMEOUT` | `probe_timeout_secs`     |
//! | `BIBLIO_USER_AGENT`    | `user_agent`             |
//! | `BIBLIO_EXCLUDED`      | `excluded_publications`  |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const AUTHORS_FILE: &str = "authors.xml";
pub const GRANTS_FILE: &str = "grants.xml";
pub const PUBLICATIONS_FILE: &str = "publications.xml";
pub const ATTACHMENTS_FILE: &str = "attachments.xml";
pub const PROJECTS_FILE: &str = "openaire_projects.xml";

/// Access decisions are kept here unless configured otherwise.
const DEFAULT_CACHE_PATH: &str = ".biblio-oai/access_cache.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Directory holding the XML exports.
    pub input_dir: PathBuf,
    /// Domain part of OAI identifiers (`oai:<domain>:<id>`).
    pub domain_name: String,
    /// Access-decision cache file.
    pub cache_path: PathBuf,
    /// Prepended to a publication id to form its `dc:identifier`.
    pub landing_url_prefix: String,
    /// Probe timeout; the HTTP client default applies when unset.
    pub probe_timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Publication ids skipped in addition to the built-in list.
    pub excluded_publications: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            domain_name: "biblio.ufal.mff.cuni.cz".to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            landing_url_prefix: "https://ufal.mff.cuni.cz/biblio/?section=publication&id="
                .to_string(),
            probe_timeout_secs: None,
            user_agent: format!("biblio-oai/{}", env!("CARGO_PKG_VERSION")),
            excluded_publications: Vec::new(),
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::default().merge_vars(|key| env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("BIBLIO_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(domain) = lookup("BIBLIO_DOMAIN") {
            self.domain_name = domain;
        }
        if let Some(path) = lookup("BIBLIO_ACCESS_CACHE") {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(prefix) = lookup("BIBLIO_LANDING_URL") {
            self.landing_url_prefix = prefix;
        }
        if let Some(secs) = lookup("BIBLIO_PROBE_TIMEOUT") {
            match secs.trim().parse() {
                Ok(secs) => self.probe_timeout_secs = Some(secs),
                Err(_) => warn!("Ignoring invalid BIBLIO_PROBE_TIMEOUT [{}]", secs),
            }
        }
        if let Some(agent) = lookup("BIBLIO_USER_AGENT") {
            self.user_agent = agent;
        }
        if let Some(ids) = lookup("BIBLIO_EXCLUDED") {
            self.excluded_publications = ids
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        self
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        self.probe_timeout_secs.map(Duration::from_secs)
    }

    pub fn authors_path(&self) -> PathBuf {
        self.input_dir.join(AUTHORS_FILE)
    }

    pub fn grants_path(&self) -> PathBuf {
        self.input_dir.join(GRANTS_FILE)
    }

    pub fn publications_path(&self) -> PathBuf {
        self.input_dir.join(PUBLICATIONS_FILE)
    }

    pub fn attachments_path(&self) -> PathBuf {
        self.input_dir.join(ATTACHMENTS_FILE)
    }

    pub fn projects_path(&self) -> PathBuf {
        self.input_dir.join(PROJECTS_FILE)
    }
}
