//! Author index: author id -> display name.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::error;

use crate::error::LoadResult;
use crate::models::{AuthorField, Fields};
use crate::parser::{load_filtered, retain_records, Derived, RawRecord};

/// Display names keyed by author id.
#[derive(Debug, Clone, Default)]
pub struct AuthorIndex {
    names: BTreeMap<String, String>,
}

impl AuthorIndex {
    pub fn load(path: &Path) -> LoadResult<Self> {
        Ok(Self {
            names: load_filtered(path, format_name)?,
        })
    }

    pub fn from_records(records: &[RawRecord]) -> Self {
        Self {
            names: retain_records(records, "authors", format_name),
        }
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// "Last, First", or whichever part is present.
fn format_name(record: &RawRecord) -> Option<Derived<String>> {
    let fields = Fields::<AuthorField>::collect(record);
    let name = match (fields.get(AuthorField::LastName), fields.get(AuthorField::FirstName)) {
        (Some(last), Some(first)) => format!("{}, {}", last, first),
        (Some(last), None) => last.to_string(),
        (None, Some(first)) => first.to_string(),
        (None, None) => {
            error!("No names for {}", record.id);
            return None;
        }
    };
    Some(Derived::new(name))
}
