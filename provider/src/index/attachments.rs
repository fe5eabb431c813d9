//! Attachment index, keyed by the owning publication.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LoadResult;
use crate::models::{Attachment, AttachmentField, Fields};
use crate::parser::{load_filtered, retain_records, Derived, RawRecord};

/// Attachments keyed by their `Parent` publication id. When a publication
/// has several files the last one in the export is kept.
#[derive(Debug, Clone, Default)]
pub struct AttachmentIndex {
    by_publication: BTreeMap<String, Attachment>,
}

impl AttachmentIndex {
    pub fn load(path: &Path) -> LoadResult<Self> {
        Ok(Self {
            by_publication: load_filtered(path, to_attachment)?,
        })
    }

    pub fn from_records(records: &[RawRecord]) -> Self {
        Self {
            by_publication: retain_records(records, "attachments", to_attachment),
        }
    }

    pub fn for_publication(&self, publication_id: &str) -> Option<&Attachment> {
        self.by_publication.get(publication_id)
    }

    pub fn len(&self) -> usize {
        self.by_publication.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_publication.is_empty()
    }
}

fn to_attachment(record: &RawRecord) -> Option<Derived<Attachment>> {
    let mut fields = Fields::<AttachmentField>::collect(record);
    let attachment = Attachment {
        content_type: fields.take(AttachmentField::ContentType),
        access: fields.take(AttachmentField::Access),
    };
    Some(match &record.parent {
        Some(parent) => Derived::keyed(parent.clone(), attachment),
        None => Derived::new(attachment),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rekeyed_to_parent() {
        let index = AttachmentIndex::from_records(&[RawRecord::new("900")
            .with_parent("42")
            .with_field("Type", "application/pdf")
            .with_field("Access", "public")]);

        assert!(index.for_publication("900").is_none());
        let attachment = index.for_publication("42").unwrap();
        assert!(attachment.is_public_pdf());
    }

    #[test]
    fn test_every_attachment_retained() {
        let index = AttachmentIndex::from_records(&[
            RawRecord::new("900").with_parent("42"),
            RawRecord::new("901").with_parent("43").with_field("Access", "private"),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.for_publication("42"), Some(&Attachment::default()));
    }
}
