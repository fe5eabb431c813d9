//! In-memory indices built from the exports.
//!
//! Built once per run, leaves first: authors, attachments and project ids
//! are independent; grants need project ids; publications need grants.

pub mod attachments;
pub mod authors;
pub mod grants;
pub mod projects;
pub mod publications;

pub use attachments::AttachmentIndex;
pub use authors::AuthorIndex;
pub use grants::{resolve_openaire_id, search_token, GrantIndex, SUPPORTED_AGENCIES};
pub use projects::ProjectIds;
pub use publications::{exclusion_set, PublicationIndex};

use crate::config::ProviderConfig;
use crate::error::LoadResult;

/// All indices of one run. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub authors: AuthorIndex,
    pub attachments: AttachmentIndex,
    pub projects: ProjectIds,
    pub grants: GrantIndex,
    pub publications: PublicationIndex,
}

impl Catalog {
    /// Load every export from the configured input directory.
    pub fn load(config: &ProviderConfig) -> LoadResult<Self> {
        let authors = AuthorIndex::load(&config.authors_path())?;
        let attachments = AttachmentIndex::load(&config.attachments_path())?;
        let projects = ProjectIds::load(&config.projects_path())?;
        let grants = GrantIndex::load(&config.grants_path(), &projects)?;
        let excluded = exclusion_set(config.excluded_publications.iter().cloned());
        let publications = PublicationIndex::load(&config.publications_path(), &grants, &excluded)?;

        Ok(Self {
            authors,
            attachments,
            projects,
            grants,
            publications,
        })
    }
}
