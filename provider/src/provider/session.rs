//! Scoped harvesting session.
//!
//! ```rust,ignore
//! let session = Session::open(&config, Box::new(OfflineProber))?;
//! let (ids, report) = session.run(|provider| Ok::<_, ProviderError>(provider.list_identifiers()))?;
//! ```
//!
//! The access cache is flushed when `run` returns, whether the closure
//! succeeded or not.

use tracing::error;

use super::{HarvestReport, Provider};
use crate::access::{AccessClassifier, Probe};
use crate::cache::AccessCache;
use crate::config::ProviderConfig;
use crate::error::{CacheResult, ProviderError, ProviderResult};
use crate::index::Catalog;

pub struct Session {
    provider: Provider,
}

impl Session {
    /// Load the access cache and every index.
    pub fn open(config: &ProviderConfig, prober: Box<dyn Probe>) -> ProviderResult<Self> {
        let cache = AccessCache::load(&config.cache_path)?;
        let catalog = Catalog::load(config)?;
        Ok(Self::from_parts(config, catalog, cache, prober))
    }

    pub fn from_parts(
        config: &ProviderConfig,
        catalog: Catalog,
        cache: AccessCache,
        prober: Box<dyn Probe>,
    ) -> Self {
        let classifier = AccessClassifier::new(cache, prober);
        Self {
            provider: Provider::new(config, catalog, classifier),
        }
    }

    /// Run `f` against the provider, then flush the access cache.
    ///
    /// An error from `f` takes precedence over a flush error, which is then
    /// only logged. The cache is also flushed if `f` panics.
    pub fn run<T, E, F>(self, f: F) -> Result<(T, HarvestReport), E>
    where
        F: FnOnce(&mut Provider) -> Result<T, E>,
        E: From<ProviderError>,
    {
        let mut guard = FlushOnDrop {
            provider: self.provider,
            flushed: false,
        };
        let outcome = f(&mut guard.provider);
        let flushed = guard.flush();
        let report = guard.provider.report().clone();

        match (outcome, flushed) {
            (Ok(value), Ok(_)) => Ok((value, report)),
            (Ok(_), Err(e)) => Err(ProviderError::from(e).into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(flush_err)) => {
                error!("Failed to store access decisions: {}", flush_err);
                Err(e)
            }
        }
    }
}

/// Flushes the access cache once, at the latest when dropped.
struct FlushOnDrop {
    provider: Provider,
    flushed: bool,
}

impl FlushOnDrop {
    fn flush(&mut self) -> CacheResult<bool> {
        self.flushed = true;
        self.provider.classifier.cache().flush()
    }
}

impl Drop for FlushOnDrop {
    fn drop(&mut self) {
        if !self.flushed {
            if let Err(e) = self.flush() {
                error!("Failed to store access decisions: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::probe::testing::FakeProber;
    use crate::access::OfflineProber;
    use crate::models::AccessRights;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const AUTHORS: &str = r#"<Records>
  <Record Id="a1"><Field Label="First name">Jan</Field><Field Label="Last name">Hajič</Field></Record>
  <Record Id="a2"><Field Label="Note">no name</Field></Record>
</Records>"#;

    const GRANTS: &str = r#"<Records>
  <Record Id="g1"><Field Label="Agency">EU</Field><Field Label="Code">FP7-ICT-2009-4-247762</Field></Record>
  <Record Id="g2"><Field Label="Agency">GACR</Field><Field Label="Code">GA15-10472S</Field></Record>
</Records>"#;

    const PROJECTS: &str = r#"<form-value-pairs><value-pairs>
  <pair><displayed-value>FAUST</displayed-value><stored-value>info:eu-repo/grantAgreement/EC/FP7/247762/EU/FAUST</stored-value></pair>
</value-pairs></form-value-pairs>"#;

    const PUBLICATIONS: &str = r#"<Records>
  <Record Id="100">
    <Field Label="Title">Funded paper</Field>
    <Field Label="Author(s)">a1</Field>
    <Field Label="Supported by">g1;g2</Field>
    <Field Label="URL">[http://example.org/paper.pdf]</Field>
  </Record>
  <Record Id="101">
    <Field Label="Title">National grant only</Field>
    <Field Label="Author(s)">a1</Field>
    <Field Label="Supported by">g2</Field>
  </Record>
</Records>"#;

    const ATTACHMENTS: &str = r#"<Records>
  <Record Id="900" Parent="100"><Field Name="Type">text/plain</Field></Record>
</Records>"#;

    fn write_inputs(dir: &Path) -> ProviderConfig {
        let input = dir.join("input");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("authors.xml"), AUTHORS).unwrap();
        fs::write(input.join("grants.xml"), GRANTS).unwrap();
        fs::write(input.join("openaire_projects.xml"), PROJECTS).unwrap();
        fs::write(input.join("publications.xml"), PUBLICATIONS).unwrap();
        fs::write(input.join("attachments.xml"), ATTACHMENTS).unwrap();
        ProviderConfig {
            input_dir: input,
            cache_path: dir.join("state").join("access.json"),
            domain_name: "example.org".into(),
            ..Default::default()
        }
    }

    fn harvest(provider: &mut Provider) -> ProviderResult<Vec<String>> {
        let mut records = Vec::new();
        for id in provider.list_identifiers() {
            if let Some(xml) = provider.get_record(&id, "oai_dc")? {
                records.push(xml);
            }
        }
        Ok(records)
    }

    #[test]
    fn test_open_and_run() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());
        let prober = FakeProber::default().with("http://example.org/paper.pdf", 200, "application/pdf");

        let session = Session::open(&config, Box::new(prober)).unwrap();
        let (records, report) = session.run(harvest).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].contains("<dc:rights>info:eu-repo/semantics/openAccess</dc:rights>"));
        assert_eq!(report.publications, 1);
        assert_eq!(report.authors, 1);
        assert_eq!(report.grants, 1);
        assert_eq!(report.access.probe, 1);

        let reloaded = AccessCache::load(&config.cache_path).unwrap();
        assert_eq!(reloaded.get("100"), Some(AccessRights::Open));
    }

    #[test]
    fn test_second_run_uses_cache() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());

        let first = FakeProber::default().with("http://example.org/paper.pdf", 200, "application/pdf");
        Session::open(&config, Box::new(first)).unwrap().run(harvest).unwrap();

        let second = FakeProber::default();
        let calls = second.calls();
        let (records, report) = Session::open(&config, Box::new(second))
            .unwrap()
            .run(harvest)
            .unwrap();

        assert!(records[0].contains("openAccess"));
        assert_eq!(report.access.cached, 1);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_offline_run_does_not_pin_closed_access() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());

        let (records, _) = Session::open(&config, Box::new(OfflineProber))
            .unwrap()
            .run(harvest)
            .unwrap();
        assert!(records[0].contains("closedAccess"));
        assert!(!config.cache_path.exists());

        let online = FakeProber::default().with("http://example.org/paper.pdf", 200, "application/pdf");
        let calls = online.calls();
        let (records, report) = Session::open(&config, Box::new(online))
            .unwrap()
            .run(harvest)
            .unwrap();

        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(report.access.probe, 1);
        assert!(records[0].contains("openAccess"));
    }

    #[test]
    fn test_cache_flushed_on_error() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());

        let session = Session::open(&config, Box::new(FakeProber::default())).unwrap();
        let result: Result<((), HarvestReport), ProviderError> = session.run(|provider| {
            provider.get_record("oai:example.org:100", "oai_dc")?;
            provider.get_record("oai:example.org:404", "oai_dc")?;
            Ok(())
        });

        assert!(matches!(result, Err(ProviderError::UnknownIdentifier(_))));
        let reloaded = AccessCache::load(&config.cache_path).unwrap();
        assert_eq!(reloaded.get("100"), Some(AccessRights::Closed));
    }

    #[test]
    fn test_cache_flushed_on_panic() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());
        let prober = FakeProber::default().with("http://example.org/paper.pdf", 200, "application/pdf");
        let session = Session::open(&config, Box::new(prober)).unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = session.run(|provider| -> ProviderResult<()> {
                provider.get_record("oai:example.org:100", "oai_dc")?;
                panic!("harvester crashed");
            });
        }));

        assert!(outcome.is_err());
        let reloaded = AccessCache::load(&config.cache_path).unwrap();
        assert_eq!(reloaded.get("100"), Some(AccessRights::Open));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        let config = write_inputs(dir.path());
        fs::remove_file(config.grants_path()).unwrap();

        let err = Session::open(&config, Box::new(FakeProber::default())).err().unwrap();
        assert!(matches!(err, ProviderError::Load(_)));
    }
}
