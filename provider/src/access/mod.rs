//! Open/closed access classification.
//!
//! Evidence is consulted in order, stopping at the first conclusive one:
//!
//! 1. a decision cached by an earlier run
//! 2. a public PDF attachment
//! 3. each URL of the publication: a trusted open-access host, otherwise a
//!    HEAD probe answering `200` with a PDF content type
//!
//! Without evidence the publication is closed. Probe failures are only
//! logged. Every new decision goes into the cache, except a default
//! closed decision reached while probing was disabled.

pub mod probe;

use tracing::{debug, warn};
use url::Url;

use crate::cache::AccessCache;
use crate::error::ProbeError;
use crate::index::AttachmentIndex;
use crate::models::{AccessRights, Publication};

pub use probe::{HttpProber, OfflineProber, Probe, ProbeResponse};

/// Hosts whose content is open access. Subdomains match too.
pub const TRUSTED_HOSTS: &[&str] = &[
    "github.com",
    "arxiv.org",
    "aclweb.org",
    "aclanthology.org",
    "lindat.mff.cuni.cz",
];

/// What a decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Cached,
    Attachment,
    TrustedHost,
    Probe,
    /// Nothing conclusive, defaulted to closed.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rights: AccessRights,
    pub evidence: Evidence,
}

pub struct AccessClassifier {
    cache: AccessCache,
    prober: Box<dyn Probe>,
}

impl AccessClassifier {
    pub fn new(cache: AccessCache, prober: Box<dyn Probe>) -> Self {
        Self { cache, prober }
    }

    pub fn cache(&self) -> &AccessCache {
        &self.cache
    }

    /// Classify a publication, reusing and updating the cache.
    pub fn classify(
        &mut self,
        id: &str,
        publication: &Publication,
        attachments: &AttachmentIndex,
    ) -> Decision {
        if let Some(rights) = self.cache.get(id) {
            return Decision {
                rights,
                evidence: Evidence::Cached,
            };
        }
        let (rights, evidence, skipped) = self.gather(id, publication, attachments);
        if skipped && evidence == Evidence::Default {
            debug!("{}: probing disabled, not caching default decision", id);
            return Decision { rights, evidence };
        }
        let rights = self.cache.record(id, rights);
        Decision { rights, evidence }
    }

    fn gather(
        &self,
        id: &str,
        publication: &Publication,
        attachments: &AttachmentIndex,
    ) -> (AccessRights, Evidence, bool) {
        if attachments
            .for_publication(id)
            .is_some_and(|a| a.is_public_pdf())
        {
            return (AccessRights::Open, Evidence::Attachment, false);
        }

        let urls = publication
            .url
            .as_deref()
            .map(parse_url_field)
            .unwrap_or_default();
        // set when a URL went unchecked because probing is off
        let mut skipped = false;
        for url in &urls {
            if is_trusted_host(url) {
                debug!("{}: trusted host [{}]", id, url);
                return (AccessRights::Open, Evidence::TrustedHost, false);
            }
            match self.prober.probe(url) {
                Ok(response) if response.is_pdf() => {
                    debug!("{}: [{}] serves a PDF", id, url);
                    return (AccessRights::Open, Evidence::Probe, false);
                }
                Ok(response) => {
                    debug!(
                        "{}: [{}] answered {} ({})",
                        id, url, response.status, response.content_type
                    );
                }
                Err(ProbeError::Disabled) => skipped = true,
                Err(e) => warn!("{}: probing [{}] failed: {}", id, url, e),
            }
        }
        (AccessRights::Closed, Evidence::Default, skipped)
    }
}

/// Split a `[url]` or `[url1], [url2]` field into URLs.
///
/// Anything else is logged as invalid and yields no URLs.
pub fn parse_url_field(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.is_empty() {
        return Vec::new();
    }
    let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) else {
        warn!("Invalid URL field [{}]", value);
        return Vec::new();
    };
    let urls: Vec<&str> = inner.split("], [").map(str::trim).collect();
    if urls
        .iter()
        .any(|u| u.is_empty() || u.contains('[') || u.contains(']'))
    {
        warn!("Invalid URL field [{}]", value);
        return Vec::new();
    }
    urls.into_iter().map(str::to_string).collect()
}

/// Whether the URL points to one of [`TRUSTED_HOSTS`] or a subdomain.
pub fn is_trusted_host(url: &str) -> bool {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    TRUSTED_HOSTS.iter().any(|trusted| {
        host == *trusted
            || host
                .strip_suffix(trusted)
                .is_some_and(|rest| rest.ends_with('.'))
    })
}
