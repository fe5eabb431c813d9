//! Per-run counters, returned to the caller instead of kept globally.

use serde::Serialize;

use crate::access::Evidence;
use crate::index::Catalog;

/// How access decisions were reached during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessTally {
    pub cached: usize,
    pub attachment: usize,
    pub trusted_host: usize,
    pub probe: usize,
    pub default_closed: usize,
}

impl AccessTally {
    pub fn count(&mut self, evidence: Evidence) {
        match evidence {
            Evidence::Cached => self.cached += 1,
            Evidence::Attachment => self.attachment += 1,
            Evidence::TrustedHost => self.trusted_host += 1,
            Evidence::Probe => self.probe += 1,
            Evidence::Default => self.default_closed += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    pub authors: usize,
    pub grants: usize,
    pub attachments: usize,
    pub project_ids: usize,
    pub publications: usize,
    /// Records rendered successfully.
    pub rendered: usize,
    /// Records dropped for a missing required element.
    pub dropped: usize,
    pub access: AccessTally,
}

impl HarvestReport {
    /// Start a report with the index sizes of a catalog.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            authors: catalog.authors.len(),
            grants: catalog.grants.len(),
            attachments: catalog.attachments.len(),
            project_ids: catalog.projects.len(),
            publications: catalog.publications.len(),
            ..Default::default()
        }
    }
}
