//! OpenAIRE project identifiers, the reference set for grant codes.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::LoadResult;
use crate::parser::{parse_project_ids, read_project_ids};

/// Externally registered project ids (`pair/stored-value` entries).
#[derive(Debug, Clone, Default)]
pub struct ProjectIds {
    ids: BTreeSet<String>,
}

impl ProjectIds {
    pub fn load(path: &Path) -> LoadResult<Self> {
        Ok(Self {
            ids: read_project_ids(path)?,
        })
    }

    pub fn from_xml(xml: &str, source: &str) -> LoadResult<Self> {
        Ok(Self {
            ids: parse_project_ids(xml, source)?,
        })
    }

    /// All project ids containing `token` as a substring.
    pub fn containing<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.ids
            .iter()
            .filter(move |id| id.contains(token))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ProjectIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
