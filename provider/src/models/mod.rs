//! Domain models for the bibliographic exports.
//!
//! - [`Fields`] - Typed view over a record's (label, text) pairs
//! - [`AuthorField`], [`GrantField`], [`AttachmentField`], [`PublicationField`] -
//!   The closed sets of labels each export is read with
//! - [`Grant`], [`Attachment`], [`Publication`] - Retained entities
//! - [`AccessRights`] - Open/closed access decision

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::parser::RawRecord;

// =============================================================================
// Field Labels
// =============================================================================

/// A closed set of labels recognized in one export.
pub trait FieldName: Copy + Ord {
    /// Map an export label to a field, `None` for labels we do not read.
    fn from_label(label: &str) -> Option<Self>;
}

/// Recognized fields of a record. Unknown labels and empty texts are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields<F: FieldName>(BTreeMap<F, String>);

impl<F: FieldName> Fields<F> {
    /// Collect the recognized fields of a raw record. Later duplicates win.
    pub fn collect(record: &RawRecord) -> Self {
        let mut map = BTreeMap::new();
        for (label, text) in &record.fields {
            let Some(field) = F::from_label(label) else {
                continue;
            };
            match text {
                Some(text) => {
                    map.insert(field, text.clone());
                }
                None => {
                    map.remove(&field);
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn take(&mut self, field: F) -> Option<String> {
        self.0.remove(&field)
    }
}

/// Fields of `authors.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorField {
    FirstName,
    LastName,
}

impl FieldName for AuthorField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "First name" => Some(Self::FirstName),
            "Last name" => Some(Self::LastName),
            _ => None,
        }
    }
}

/// Fields of `grants.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrantField {
    Agency,
    Code,
}

impl FieldName for GrantField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Agency" => Some(Self::Agency),
            "Code" => Some(Self::Code),
            _ => None,
        }
    }
}

/// Fields of `attachments.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttachmentField {
    /// MIME type of the file, e.g. `application/pdf`.
    ContentType,
    /// Declared visibility, `public` or `private`.
    Access,
}

impl FieldName for AttachmentField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Type" => Some(Self::ContentType),
            "Access" => Some(Self::Access),
            _ => None,
        }
    }
}

/// Fields of `publications.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublicationField {
    Title,
    OriginalTitle,
    EnglishTitle,
    CzechTitle,
    Authors,
    SupportedBy,
    Type,
    Year,
    Publisher,
    EnglishAbstract,
    Url,
}

impl FieldName for PublicationField {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Title" => Some(Self::Title),
            "Original title" => Some(Self::OriginalTitle),
            "English title" => Some(Self::EnglishTitle),
            "Czech title" => Some(Self::CzechTitle),
            "Author(s)" => Some(Self::Authors),
            "Supported by" => Some(Self::SupportedBy),
            "Type" => Some(Self::Type),
            "Year" => Some(Self::Year),
            "Publisher" => Some(Self::Publisher),
            "English abstract" => Some(Self::EnglishAbstract),
            "URL" => Some(Self::Url),
            _ => None,
        }
    }
}

// =============================================================================
// Grant
// =============================================================================

/// A grant from a supported agency with a resolved OpenAIRE project id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    pub agency: String,
    pub code: String,
    pub openaire_id: String,
}

// =============================================================================
// Attachment
// =============================================================================

/// A file attached to a publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    pub content_type: Option<String>,
    pub access: Option<String>,
}

impl Attachment {
    /// A publicly accessible PDF is proof of open access.
    pub fn is_public_pdf(&self) -> bool {
        self.content_type.as_deref().is_some_and(|t| t.contains("pdf"))
            && self.access.as_deref() == Some("public")
    }
}

// =============================================================================
// Publication
// =============================================================================

/// A publication funded by at least one recognized grant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Publication {
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub english_title: Option<String>,
    pub czech_title: Option<String>,
    /// Author ids in declared order, without duplicates.
    pub authors: Vec<String>,
    /// Declared grants that are present in the grant index.
    pub supported_by: BTreeSet<String>,
    pub kind: Option<String>,
    pub year: Option<String>,
    pub publisher: Option<String>,
    pub english_abstract: Option<String>,
    /// Raw bracket-delimited URL field.
    pub url: Option<String>,
}

impl Publication {
    /// First present title, in order: title, original, English, Czech.
    pub fn display_title(&self) -> Option<&str> {
        [
            &self.title,
            &self.original_title,
            &self.english_title,
            &self.czech_title,
        ]
        .into_iter()
        .find_map(|t| t.as_deref())
    }
}

/// Split a `;`-separated id list, skipping blanks.
pub fn split_ids(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Access Rights
// =============================================================================

/// Access level of a publication, serialized as its info:eu-repo URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRights {
    #[serde(rename = "info:eu-repo/semantics/openAccess")]
    Open,
    #[serde(rename = "info:eu-repo/semantics/closedAccess")]
    Closed,
}

impl AccessRights {
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Open => "info:eu-repo/semantics/openAccess",
            Self::Closed => "info:eu-repo/semantics/closedAccess",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_ignore_unknown_labels() {
        let record = RawRecord::new("1")
            .with_field("First name", "Jan")
            .with_field("Nickname", "Honza");
        let fields = Fields::<AuthorField>::collect(&record);

        assert_eq!(fields.get(AuthorField::FirstName), Some("Jan"));
        assert_eq!(fields.get(AuthorField::LastName), None);
    }

    #[test]
    fn test_fields_empty_text_is_absent() {
        let mut record = RawRecord::new("1").with_field("Agency", "EU");
        record.fields.push(("Agency".into(), None));
        let fields = Fields::<GrantField>::collect(&record);

        assert_eq!(fields.get(GrantField::Agency), None);
    }

    #[test]
    fn test_title_precedence() {
        let publication = Publication {
            english_title: Some("English".into()),
            czech_title: Some("Česky".into()),
            ..Default::default()
        };
        assert_eq!(publication.display_title(), Some("English"));

        let publication = Publication {
            original_title: Some("Original".into()),
            english_title: Some("English".into()),
            ..Default::default()
        };
        assert_eq!(publication.display_title(), Some("Original"));

        assert_eq!(Publication::default().display_title(), None);
    }

    #[test]
    fn test_public_pdf() {
        let pdf = Attachment {
            content_type: Some("application/pdf".into()),
            access: Some("public".into()),
        };
        assert!(pdf.is_public_pdf());

        let private = Attachment {
            access: Some("private".into()),
            ..pdf.clone()
        };
        assert!(!private.is_public_pdf());

        let zip = Attachment {
            content_type: Some("application/zip".into()),
            ..pdf
        };
        assert!(!zip.is_public_pdf());
    }

    #[test]
    fn test_split_ids() {
        let ids: Vec<_> = split_ids("12; 13;;14 ").collect();
        assert_eq!(ids, vec!["12", "13", "14"]);
    }

    #[test]
    fn test_access_rights_serialization() {
        let json = serde_json::to_string(&AccessRights::Open).unwrap();
        assert_eq!(json, "\"info:eu-repo/semantics/openAccess\"");
        let back: AccessRights = serde_json::from_str("\"info:eu-repo/semantics/closedAccess\"").unwrap();
        assert_eq!(back, AccessRights::Closed);
    }
}
