//! Dublin Core rendering.
//!
//! A record is assembled in a fixed element order:
//!
//! | Element          | Source                              | Required |
//! |------------------|-------------------------------------|----------|
//! | `dc:identifier`  | landing page URL                    | yes      |
//! | `dc:title`       | first present title field           | yes      |
//! | `dc:creator`     | author index, one per author id     | yes      |
//! | `dc:relation`    | grant index, one per funding grant  | yes      |
//! | `dc:rights`      | access classifier                   | yes      |
//! | `dc:description` | English abstract                    | no       |
//! | `dc:publisher`   | publisher                           | no       |
//! | `dc:date`        | year                                | no       |
//! | `dc:type`        | type mapper                         | yes      |
//!
//! A record missing a required element is not rendered at all.

pub mod types;

use quick_xml::escape::partial_escape;
use tracing::error;

use crate::access::{AccessClassifier, Decision};
use crate::index::Catalog;

pub use types::{map_type, OTHER_TYPE};

pub const OAI_DC_PREFIX: &str = "oai_dc";
pub const OAI_DC_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
pub const OAI_DC_SCHEMA: &str = "http://www.openarchives.org/OAI/2.0/oai_dc.xsd";

/// Wrap rendered elements in the `oai_dc:dc` envelope.
pub fn envelope(body: &str) -> String {
    format!(
        "\n<oai_dc:dc xmlns:oai_dc=\"http://www.openarchives.org/OAI/2.0/oai_dc/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
xsi:schemaLocation=\"http://www.openarchives.org/OAI/2.0/oai_dc/ http://www.openarchives.org/OAI/2.0/oai_dc.xsd\">\n\
{}\n</oai_dc:dc>\n",
        body
    )
}

fn element(name: &str, text: &str) -> String {
    format!("<dc:{name}>{}</dc:{name}>", partial_escape(text), name = name)
}

/// A rendered record plus the access decision taken for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub xml: String,
    pub access: Decision,
}

/// Renders publications of a catalog.
pub struct DcRenderer<'a> {
    catalog: &'a Catalog,
    landing_url_prefix: &'a str,
}

impl<'a> DcRenderer<'a> {
    pub fn new(catalog: &'a Catalog, landing_url_prefix: &'a str) -> Self {
        Self {
            catalog,
            landing_url_prefix,
        }
    }

    /// Render one publication, or `None` when a required element is missing.
    ///
    /// Cross-references are checked before the access classifier runs, so a
    /// dropped record never triggers network probes.
    pub fn to_dc(&self, id: &str, classifier: &mut AccessClassifier) -> Option<Rendered> {
        let Some(publication) = self.catalog.publications.get(id) else {
            error!("Unknown publication {}", id);
            return None;
        };

        let identifier = element(
            "identifier",
            &format!("{}{}", self.landing_url_prefix, id),
        );

        let Some(title) = publication.display_title() else {
            error!("No title for {}", id);
            return None;
        };
        let title = element("title", title);

        if publication.authors.is_empty() {
            error!("No authors for {}", id);
            return None;
        }
        let mut creators = Vec::with_capacity(publication.authors.len());
        for author_id in &publication.authors {
            let Some(name) = self.catalog.authors.name(author_id) else {
                error!("Error fetching authors for {}: unknown author {}", id, author_id);
                return None;
            };
            creators.push(element("creator", name));
        }

        let mut relations = Vec::with_capacity(publication.supported_by.len());
        for grant_id in &publication.supported_by {
            let Some(grant) = self.catalog.grants.get(grant_id) else {
                error!("Error fetching grants for {}: unknown grant {}", id, grant_id);
                return None;
            };
            relations.push(element("relation", &grant.openaire_id));
        }

        let access = classifier.classify(id, publication, &self.catalog.attachments);

        let mut lines = vec![identifier, title];
        lines.extend(creators);
        lines.extend(relations);
        lines.push(element("rights", access.rights.uri()));
        lines.extend(
            publication
                .english_abstract
                .as_deref()
                .map(|text| element("description", text)),
        );
        lines.extend(
            publication
                .publisher
                .as_deref()
                .map(|text| element("publisher", text)),
        );
        lines.extend(publication.year.as_deref().map(|text| element("date", text)));
        lines.push(element(
            "type",
            &map_type(publication.kind.as_deref().unwrap_or_default()),
        ));

        Some(Rendered {
            xml: envelope(&lines.join("\n")),
            access,
        })
    }
}
