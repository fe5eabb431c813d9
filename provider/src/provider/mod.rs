//! The metadata provider consumed by the harvesting layer.
//!
//! [`Provider`] answers the harvester's questions (identifiers, records,
//! sets, changes). It is only reachable through a [`Session`], which owns
//! the access cache and writes it back when the run ends.

pub mod report;
pub mod session;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::error;

use crate::access::AccessClassifier;
use crate::config::ProviderConfig;
use crate::dc::{DcRenderer, OAI_DC_NAMESPACE, OAI_DC_PREFIX, OAI_DC_SCHEMA};
use crate::error::{ProviderError, ProviderResult};
use crate::index::Catalog;

pub use report::{AccessTally, HarvestReport};
pub use session::Session;

/// The only set every record belongs to.
pub const OPENAIRE_SET: (&str, &str) = ("openaire", "openaire");

pub struct Provider {
    oai_identifier_prefix: String,
    landing_url_prefix: String,
    catalog: Catalog,
    classifier: AccessClassifier,
    report: HarvestReport,
}

impl Provider {
    pub fn new(config: &ProviderConfig, catalog: Catalog, classifier: AccessClassifier) -> Self {
        let report = HarvestReport::for_catalog(&catalog);
        Self {
            oai_identifier_prefix: format!("oai:{}:", config.domain_name),
            landing_url_prefix: config.landing_url_prefix.clone(),
            catalog,
            classifier,
            report,
        }
    }

    /// Metadata prefix -> (namespace, schema location).
    pub fn formats(&self) -> BTreeMap<&'static str, (&'static str, &'static str)> {
        BTreeMap::from([(OAI_DC_PREFIX, (OAI_DC_NAMESPACE, OAI_DC_SCHEMA))])
    }

    /// OAI identifiers of all funded publications.
    pub fn list_identifiers(&self) -> Vec<String> {
        self.catalog
            .publications
            .ids()
            .map(|id| self.make_identifier(id))
            .collect()
    }

    pub fn make_identifier(&self, id: &str) -> String {
        format!("{}{}", self.oai_identifier_prefix, id)
    }

    /// Publication id of an OAI identifier issued by this provider.
    pub fn local_id<'a>(&self, oai_identifier: &'a str) -> Option<&'a str> {
        oai_identifier.strip_prefix(self.oai_identifier_prefix.as_str())
    }

    /// Render a record. `Ok(None)` for unsupported formats and for records
    /// dropped because a required element could not be resolved.
    pub fn get_record(
        &mut self,
        oai_identifier: &str,
        metadata_prefix: &str,
    ) -> ProviderResult<Option<String>> {
        if metadata_prefix != OAI_DC_PREFIX {
            return Ok(None);
        }
        let id = self
            .local_id(oai_identifier)
            .filter(|id| self.catalog.publications.get(id).is_some())
            .ok_or_else(|| ProviderError::UnknownIdentifier(oai_identifier.to_string()))?;

        let renderer = DcRenderer::new(&self.catalog, &self.landing_url_prefix);
        match renderer.to_dc(id, &mut self.classifier) {
            Some(rendered) => {
                self.report.rendered += 1;
                self.report.access.count(rendered.access.evidence);
                Ok(Some(rendered.xml))
            }
            None => {
                error!("Dropping record {}", oai_identifier);
                self.report.dropped += 1;
                Ok(None)
            }
        }
    }

    pub fn get_sets(&self, _oai_identifier: &str) -> Vec<(String, String)> {
        vec![(OPENAIRE_SET.0.to_string(), OPENAIRE_SET.1.to_string())]
    }

    /// No change tracking: every harvest is a full harvest.
    pub fn has_changed(&self, _oai_identifier: &str, _since: DateTime<Utc>) -> bool {
        true
    }

    pub fn report(&self) -> &HarvestReport {
        &self.report
    }
}
