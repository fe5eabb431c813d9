//! # biblio-oai - OpenAIRE Dublin Core records from bibliographic exports
//!
//! Joins the author, grant, publication and attachment exports of the
//! bibliography with the OpenAIRE project list, keeps publications funded
//! by a recognized EU grant and renders them as `oai_dc` records for an
//! OAI-PMH harvester.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XML exports │────▶│   Indices   │────▶│   Access    │────▶│  oai_dc XML │
//! │ + projects  │     │   (joins)   │     │ (cache/net) │     │  fragments  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use biblio_oai::{HttpProber, ProviderConfig, ProviderError, Session};
//!
//! let config = ProviderConfig::from_env();
//! let prober = HttpProber::new(&config.user_agent, config.probe_timeout())?;
//! let session = Session::open(&config, Box::new(prober))?;
//! let (records, report) = session.run(|provider| {
//!     let mut out = Vec::new();
//!     for id in provider.list_identifiers() {
//!         out.extend(provider.get_record(&id, "oai_dc")?);
//!     }
//!     Ok::<_, ProviderError>(out)
//! })?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Provider configuration
//! - [`models`] - Field labels and domain entities
//! - [`parser`] - XML record loading
//! - [`index`] - Author, grant, attachment and publication indices
//! - [`cache`] - Persistent access decisions
//! - [`access`] - Access classification and network probing
//! - [`dc`] - Type mapping and Dublin Core rendering
//! - [`provider`] - Harvester-facing provider and session

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod index;
pub mod parser;

// Access classification
pub mod access;
pub mod cache;

// Rendering
pub mod dc;

// Harvesting
pub mod provider;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CacheError, LoadError, ProbeError, ProviderError, ProviderResult};

// =============================================================================
// Re-exports - Configuration and models
// =============================================================================

pub use config::ProviderConfig;
pub use models::{AccessRights, Attachment, Grant, Publication};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use index::{
    resolve_openaire_id, AttachmentIndex, AuthorIndex, Catalog, GrantIndex, ProjectIds,
    PublicationIndex,
};
pub use parser::{load_filtered, parse_records, Derived, RawRecord};

// =============================================================================
// Re-exports - Access and rendering
// =============================================================================

pub use access::{AccessClassifier, Decision, Evidence, HttpProber, OfflineProber, Probe};
pub use cache::AccessCache;
pub use dc::{map_type, DcRenderer};

// =============================================================================
// Re-exports - Provider
// =============================================================================

pub use provider::{HarvestReport, Provider, Session};
