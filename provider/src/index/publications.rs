//! Publication index: publications funded by at least one recognized grant.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

use super::grants::GrantIndex;
use crate::error::LoadResult;
use crate::models::{split_ids, Fields, Publication, PublicationField};
use crate::parser::{load_filtered, retain_records, Derived, RawRecord};

/// Publication ids the export is known to get wrong. Always skipped.
pub const EXCLUDED_PUBLICATIONS: &[&str] = &[];

/// Funded publications keyed by publication id.
#[derive(Debug, Clone, Default)]
pub struct PublicationIndex {
    publications: BTreeMap<String, Publication>,
}

impl PublicationIndex {
    pub fn load(path: &Path, grants: &GrantIndex, excluded: &BTreeSet<String>) -> LoadResult<Self> {
        Ok(Self {
            publications: load_filtered(path, |r| to_publication(r, grants, excluded))?,
        })
    }

    pub fn from_records(
        records: &[RawRecord],
        grants: &GrantIndex,
        excluded: &BTreeSet<String>,
    ) -> Self {
        Self {
            publications: retain_records(records, "publications", |r| {
                to_publication(r, grants, excluded)
            }),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Publication> {
        self.publications.get(id)
    }

    /// Publication ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.publications.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.publications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publications.is_empty()
    }
}

/// The built-in exclusion list merged with configured extras.
pub fn exclusion_set<I, S>(extra: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EXCLUDED_PUBLICATIONS
        .iter()
        .map(|id| id.to_string())
        .chain(extra.into_iter().map(Into::into))
        .collect()
}

fn to_publication(
    record: &RawRecord,
    grants: &GrantIndex,
    excluded: &BTreeSet<String>,
) -> Option<Derived<Publication>> {
    if excluded.contains(&record.id) {
        warn!("Skipping excluded publication {}", record.id);
        return None;
    }

    let mut fields = Fields::<PublicationField>::collect(record);
    let supported_by: BTreeSet<String> = fields
        .get(PublicationField::SupportedBy)
        .map(|v| {
            split_ids(v)
                .filter(|id| grants.contains(id))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if supported_by.is_empty() {
        debug!("Publication {} has no recognized grant", record.id);
        return None;
    }

    let mut authors: Vec<String> = Vec::new();
    if let Some(value) = fields.get(PublicationField::Authors) {
        for id in split_ids(value) {
            if !authors.iter().any(|a| a == id) {
                authors.push(id.to_string());
            }
        }
    }

    Some(Derived::new(Publication {
        title: fields.take(PublicationField::Title),
        original_title: fields.take(PublicationField::OriginalTitle),
        english_title: fields.take(PublicationField::EnglishTitle),
        czech_title: fields.take(PublicationField::CzechTitle),
        authors,
        supported_by,
        kind: fields.take(PublicationField::Type),
        year: fields.take(PublicationField::Year),
        publisher: fields.take(PublicationField::Publisher),
        english_abstract: fields.take(PublicationField::EnglishAbstract),
        url: fields.take(PublicationField::Url),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ProjectIds;

    fn grants() -> GrantIndex {
        let projects: ProjectIds = ["EC/FP7/247762", "EC/H2020/644402"].into_iter().collect();
        GrantIndex::from_records(
            &[
                RawRecord::new("g1").with_field("Agency", "EU").with_field("Code", "FP7-247762"),
                RawRecord::new("g2").with_field("Agency", "EU").with_field("Code", "H2020-644402"),
                RawRecord::new("g3").with_field("Agency", "GACR").with_field("Code", "GA-247762"),
            ],
            &projects,
        )
    }

    #[test]
    fn test_supported_by_is_intersection() {
        let records = [
            RawRecord::new("p1")
                .with_field("Title", "Funded")
                .with_field("Supported by", "g1;g3;g9")
                .with_field("Author(s)", "a1;a2;a1"),
            RawRecord::new("p2")
                .with_field("Title", "Unfunded")
                .with_field("Supported by", "g3"),
            RawRecord::new("p3").with_field("Title", "No grants"),
        ];
        let index = PublicationIndex::from_records(&records, &grants(), &BTreeSet::new());

        assert_eq!(index.ids().collect::<Vec<_>>(), vec!["p1"]);
        let p1 = index.get("p1").unwrap();
        assert_eq!(p1.supported_by, BTreeSet::from(["g1".to_string()]));
        assert_eq!(p1.authors, vec!["a1", "a2"]);
        assert_eq!(p1.title.as_deref(), Some("Funded"));
    }

    #[test]
    fn test_excluded_publication_dropped() {
        let records = [RawRecord::new("p1").with_field("Supported by", "g1;g2")];
        let excluded = exclusion_set(["p1"]);
        let index = PublicationIndex::from_records(&records, &grants(), &excluded);

        assert!(index.is_empty());
    }

    #[test]
    fn test_unresolved_authors_tolerated() {
        let records = [RawRecord::new("p1")
            .with_field("Supported by", "g2")
            .with_field("Author(s)", "ghost")];
        let index = PublicationIndex::from_records(&records, &grants(), &BTreeSet::new());

        assert_eq!(index.get("p1").unwrap().authors, vec!["ghost"]);
    }
}
