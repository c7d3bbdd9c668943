use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::domain::{NewPatient, PatientProfile};
use super::errors::PatientError;
use super::identifier::{IdentifierKind, PatientIdentifier};
use super::registry::RegistryClient;
use super::repository::PatientRepository;
use crate::HospitalId;

pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(5);

/// Patient search configuration
#[derive(Debug, Clone)]
pub struct PatientConfig {
    /// Upper bound on a single registry call.
    pub registry_timeout: Duration,
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self { registry_timeout: DEFAULT_REGISTRY_TIMEOUT }
    }
}

/// Resolves patient identities: local store first, registry on a miss,
/// best-effort write-back of registry hits.
pub struct PatientService<R: PatientRepository + ?Sized, C: RegistryClient + ?Sized> {
    repo: Arc<R>,
    registry: Arc<C>,
    cfg: PatientConfig,
}

impl<R, C> PatientService<R, C>
where
    R: PatientRepository + ?Sized,
    C: RegistryClient + ?Sized,
{
    pub fn new(repo: Arc<R>, registry: Arc<C>) -> Self {
        Self::with_config(repo, registry, PatientConfig::default())
    }

    pub fn with_config(repo: Arc<R>, registry: Arc<C>, cfg: PatientConfig) -> Self {
        Self { repo, registry, cfg }
    }

    /// Resolve `raw_identifier` within `hospital_id`.
    ///
    /// `hospital_id` must come from the caller's verified session.
    ///
    /// # Examples
    /// ```
    /// use service::patient::PatientService;
    /// use service::patient::repository::mock::MockPatientRepository;
    /// use service::patient::registry::FixtureRegistryClient;
    /// use std::sync::Arc;
    /// let registry = Arc::new(FixtureRegistryClient::new());
    /// let svc = PatientService::new(Arc::new(MockPatientRepository::default()), registry.clone());
    /// let first = tokio_test::block_on(svc.search("1234567890123", 1)).unwrap();
    /// let again = tokio_test::block_on(svc.search("1234567890123", 1)).unwrap();
    /// assert_eq!(first, again);
    /// assert_eq!(registry.calls(), 1);
    /// ```
    #[instrument(skip(self, raw_identifier), fields(kind = tracing::field::Empty))]
    pub async fn search(&self, raw_identifier: &str, hospital_id: HospitalId) -> Result<PatientProfile, PatientError> {
        let identifier = PatientIdentifier::parse(raw_identifier)?;
        tracing::Span::current().record("kind", identifier.kind().as_str());

        let cached = match identifier.kind() {
            IdentifierKind::NationalId => self.repo.find_by_national_id(hospital_id, identifier.as_str()).await?,
            IdentifierKind::PassportId => self.repo.find_by_passport_id(hospital_id, identifier.as_str()).await?,
        };
        if let Some(record) = cached {
            debug!(patient_id = %record.id, "served from local store");
            return Ok(record.into_profile());
        }

        let profile = self.fetch_from_registry(&identifier).await?;
        self.write_back(hospital_id, &profile).await;
        Ok(profile)
    }

    async fn fetch_from_registry(&self, identifier: &PatientIdentifier) -> Result<PatientProfile, PatientError> {
        let call = self.registry.search_patient(identifier.as_str());
        match tokio::time::timeout(self.cfg.registry_timeout, call).await {
            Ok(Ok(profile)) => {
                info!("resolved via registry");
                Ok(profile)
            }
            Ok(Err(e)) => {
                debug!(error = %e, "registry lookup failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(timeout_ms = self.cfg.registry_timeout.as_millis() as u64, "registry timed out");
                Err(PatientError::UpstreamUnavailable("registry timed out".into()))
            }
        }
    }

    /// Cache a registry hit. Any failure is logged and dropped: the caller
    /// gets the registry result either way.
    async fn write_back(&self, hospital_id: HospitalId, profile: &PatientProfile) {
        let new = NewPatient { hospital_id, profile: profile.clone() };
        match self.repo.create(new).await {
            Ok(record) => debug!(patient_id = %record.id, "cached registry result"),
            Err(PatientError::Conflict(_)) => debug!("already cached by a concurrent search"),
            Err(e) => warn!(error = %e, "write-back failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::patient::registry::{fixture_profile, FixtureRegistryClient, RegistryError};
    use crate::patient::repository::mock::MockPatientRepository;

    type Fixture = (Arc<MockPatientRepository>, Arc<FixtureRegistryClient>, PatientService<MockPatientRepository, FixtureRegistryClient>);

    fn fixture() -> Fixture {
        let repo = Arc::new(MockPatientRepository::default());
        let registry = Arc::new(FixtureRegistryClient::new());
        let svc = PatientService::new(repo.clone(), registry.clone());
        (repo, registry, svc)
    }

    /// Registry that fails every call with a fixed error, or hangs.
    struct BrokenRegistry {
        error: Option<RegistryError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryClient for BrokenRegistry {
        async fn search_patient(&self, _identifier: &str) -> Result<PatientProfile, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(e) => Err(e.clone()),
                None => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(fixture_profile())
                }
            }
        }
    }

    #[tokio::test]
    async fn miss_then_hit_calls_registry_once() {
        let (repo, registry, svc) = fixture();

        let first = svc.search("1234567890123", 1).await.unwrap();
        assert_eq!(first.patient_hn, "HN12345");
        assert_eq!(registry.calls(), 1);
        assert_eq!(repo.len(), 1);

        let second = svc.search("1234567890123", 1).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn passport_lookup_uses_passport_column() {
        let (_repo, registry, svc) = fixture();
        svc.search("AB1234567", 1).await.unwrap();
        // Cached row carries both identifiers, so either one now hits locally
        svc.search("1234567890123", 1).await.unwrap();
        svc.search(" AB1234567 ", 1).await.unwrap();
        assert_eq!(registry.calls(), 1);
    }

    #[tokio::test]
    async fn cache_is_per_hospital() {
        let (repo, registry, svc) = fixture();
        svc.search("1234567890123", 1).await.unwrap();
        svc.search("1234567890123", 2).await.unwrap();
        assert_eq!(registry.calls(), 2);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let (repo, _registry, svc) = fixture();
        let err = svc.search("9999999999999", 1).await.unwrap_err();
        assert!(matches!(err, PatientError::NotFound));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn blank_identifier_fails_before_any_access() {
        let (repo, registry, svc) = fixture();
        repo.fail_lookups(true);
        for raw in ["", "   ", "\t"] {
            let err = svc.search(raw, 1).await.unwrap_err();
            assert!(matches!(err, PatientError::Validation(_)));
        }
        assert_eq!(registry.calls(), 0);
        assert_eq!(repo.create_attempts(), 0);
    }

    #[tokio::test]
    async fn write_back_failure_does_not_change_result() {
        let (repo, registry, svc) = fixture();
        repo.fail_creates(true);

        let profile = svc.search("1234567890123", 1).await.unwrap();
        assert_eq!(profile, fixture_profile());
        assert_eq!(repo.create_attempts(), 1);
        assert!(repo.is_empty());

        // Nothing was cached, so the registry is asked again
        svc.search("1234567890123", 1).await.unwrap();
        assert_eq!(registry.calls(), 2);
    }

    #[tokio::test]
    async fn store_fault_is_internal_and_skips_registry() {
        let (repo, registry, svc) = fixture();
        repo.fail_lookups(true);
        let err = svc.search("1234567890123", 1).await.unwrap_err();
        assert!(matches!(err, PatientError::Repository(_)));
        assert_eq!(registry.calls(), 0);
    }

    #[tokio::test]
    async fn registry_failures_are_upstream_unavailable() {
        for error in [RegistryError::Status(503), RegistryError::Transport("refused".into()), RegistryError::Timeout] {
            let repo = Arc::new(MockPatientRepository::default());
            let registry = Arc::new(BrokenRegistry { error: Some(error), calls: AtomicUsize::new(0) });
            let svc = PatientService::new(repo.clone(), registry);
            let err = svc.search("1234567890123", 1).await.unwrap_err();
            assert!(matches!(err, PatientError::UpstreamUnavailable(_)), "{err:?}");
            assert_eq!(repo.create_attempts(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_registry_is_cut_off() {
        let repo = Arc::new(MockPatientRepository::default());
        let registry = Arc::new(BrokenRegistry { error: None, calls: AtomicUsize::new(0) });
        let svc = PatientService::with_config(
            repo,
            registry.clone(),
            PatientConfig { registry_timeout: Duration::from_secs(2) },
        );
        let err = svc.search("1234567890123", 1).await.unwrap_err();
        assert!(matches!(err, PatientError::UpstreamUnavailable(_)));
        assert_eq!(registry.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_both_succeed() {
        let (repo, _registry, svc) = fixture();
        let svc = Arc::new(svc);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.search("1234567890123", 1).await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), fixture_profile());
        }
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn works_through_trait_objects() {
        let repo: Arc<dyn PatientRepository> = Arc::new(MockPatientRepository::default());
        let registry: Arc<dyn RegistryClient> = Arc::new(FixtureRegistryClient::new());
        let svc: PatientService<dyn PatientRepository, dyn RegistryClient> = PatientService::new(repo, registry);
        assert_eq!(svc.search("AB1234567", 9).await.unwrap().first_name_en, "Somchai");
    }
}
