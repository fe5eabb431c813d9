//! Grant index and grant code -> OpenAIRE project id resolution.
//!
//! Grant codes are hyphen-delimited (`FP7-ICT-2009-4-247762`,
//! `GA15-10472S`). The project number is taken from the last segment, or
//! from the one before it when the last is a suffix like `EXPERT`. A
//! segment counts as numeric when it is a run of digits optionally followed
//! by a letter suffix (`10472S` -> `10472`). The number then has to occur in
//! exactly one registered project id.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, error};

use super::projects::ProjectIds;
use crate::error::LoadResult;
use crate::models::{Fields, Grant, GrantField};
use crate::parser::{load_filtered, retain_records, Derived, RawRecord};

/// Funding agencies whose grants are exposed.
pub const SUPPORTED_AGENCIES: &[&str] = &["EU"];

/// Grant code prefixes of programmes not registered in OpenAIRE.
pub const UNSUPPORTED_GRANT_PREFIXES: &[&str] = &["COST", "ERASMUS"];

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)[A-Za-z]*$").expect("valid regex"));

/// Grants keyed by grant id, each with a unique OpenAIRE project id.
#[derive(Debug, Clone, Default)]
pub struct GrantIndex {
    grants: BTreeMap<String, Grant>,
}

impl GrantIndex {
    pub fn load(path: &Path, projects: &ProjectIds) -> LoadResult<Self> {
        Ok(Self {
            grants: load_filtered(path, |r| to_grant(r, projects))?,
        })
    }

    pub fn from_records(records: &[RawRecord], projects: &ProjectIds) -> Self {
        Self {
            grants: retain_records(records, "grants", |r| to_grant(r, projects)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Grant> {
        self.grants.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.grants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

fn to_grant(record: &RawRecord, projects: &ProjectIds) -> Option<Derived<Grant>> {
    let mut fields = Fields::<GrantField>::collect(record);
    let Some(agency) = fields.take(GrantField::Agency) else {
        error!("Grant {} has no agency", record.id);
        return None;
    };
    if !SUPPORTED_AGENCIES.contains(&agency.as_str()) {
        return None;
    }
    let Some(code) = fields.take(GrantField::Code) else {
        error!("Grant {} has no code", record.id);
        return None;
    };
    if let Some(prefix) = UNSUPPORTED_GRANT_PREFIXES.iter().find(|p| code.starts_with(*p)) {
        debug!("Skipping grant {} ({}): unsupported programme {}", record.id, code, prefix);
        return None;
    }
    let openaire_id = resolve_openaire_id(&code, projects)?;
    Some(Derived::new(Grant {
        agency,
        code,
        openaire_id,
    }))
}

/// Project number used to search for a grant code, see module docs.
pub fn search_token(code: &str) -> Option<&str> {
    code.rsplit('-')
        .take(2)
        .find_map(|segment| NUMERIC_SEGMENT.captures(segment))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolve a grant code to the single project id containing its number.
pub fn resolve_openaire_id(code: &str, projects: &ProjectIds) -> Option<String> {
    let Some(token) = search_token(code) else {
        error!("Cannot parse project number from grant code [{}]", code);
        return None;
    };
    let candidates: Vec<&str> = projects.containing(token).collect();
    match candidates.as_slice() {
        [single] => Some(single.to_string()),
        [] => {
            error!("No project id matches grant code [{}] (token {})", code, token);
            None
        }
        many => {
            error!(
                "Grant code [{}] (token {}) is ambiguous, {} project ids match",
                code,
                token,
                many.len()
            );
            None
        }
    }
}
