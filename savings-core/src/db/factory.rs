use std::collections::BTreeMap;

use async_trait::async_trait;

use super::repository::{RepositoryError, SavingsRepository};

/// Connection settings handed to a [`RepositoryFactory`].
///
/// `backend` selects which registered factory runs. Everything a backend
/// needs beyond that travels in `connection_string`, whose format the
/// backend defines. For the `sqlite` backend it is a database path such as
/// `savings.db` or `:memory:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Lowercase name of a registered backend.
    pub backend: String,
    /// Backend-defined locator, forwarded untouched.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Implemented once per storage backend. A backend crate ships a single
/// factory type; the application registers it at startup and never has to
/// name the concrete repository again.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open the backing store and hand back a working repository.
    ///
    /// A factory may run migrations or seed reference data in here; callers
    /// only ever see the finished [`SavingsRepository`].
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SavingsRepository>, RepositoryError>;
}

/// Maps backend names to their factories.
///
/// Built once at startup: register every compiled-in backend, then call
/// [`create`](Self::create) with whatever [`DbConfig`] the user supplied.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `factory` under its [`backend_name`](RepositoryFactory::backend_name).
    /// Registering the same name twice keeps the later factory.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Look up `config.backend` and delegate to that factory.
    ///
    /// # Errors
    /// [`RepositoryError::Configuration`] when nothing is registered under
    /// the requested name; otherwise whatever the chosen factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SavingsRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        factory.create(config).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::models::{NewSavedEstimate, SavedEstimate, Scenario, ScenarioCode, ScenarioParams};

    use super::{
        DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, SavingsRepository,
    };

    // The registry never touches the repository it hands out, so a stub with
    // `unimplemented!()` bodies is enough.
    struct StubRepository;

    #[async_trait]
    impl SavingsRepository for StubRepository {
        async fn get_scenarios(&self) -> Result<Vec<Scenario>, RepositoryError> {
            unimplemented!()
        }
        async fn get_scenario_by_code(
            &self,
            _code: ScenarioCode,
        ) -> Result<Scenario, RepositoryError> {
            unimplemented!()
        }
        async fn upsert_scenario(
            &self,
            _code: ScenarioCode,
            _name: &str,
        ) -> Result<Scenario, RepositoryError> {
            unimplemented!()
        }
        async fn get_params_for_scenario(
            &self,
            _code: ScenarioCode,
        ) -> Result<ScenarioParams, RepositoryError> {
            unimplemented!()
        }
        async fn insert_scenario_params(
            &self,
            _params: &ScenarioParams,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_params_for_scenario(
            &self,
            _code: ScenarioCode,
        ) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn create_saved_estimate(
            &self,
            _estimate: NewSavedEstimate,
        ) -> Result<SavedEstimate, RepositoryError> {
            unimplemented!()
        }
        async fn get_saved_estimate(&self, _id: i64) -> Result<SavedEstimate, RepositoryError> {
            unimplemented!()
        }
        async fn delete_saved_estimate(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn list_saved_estimates(
            &self,
            _scenario: Option<ScenarioCode>,
        ) -> Result<Vec<SavedEstimate>, RepositoryError> {
            unimplemented!()
        }
    }

    /// Counts how often `create` runs, so tests can tell which factory the
    /// registry picked.
    struct CountingFactory {
        name: &'static str,
        creations: Arc<AtomicUsize>,
    }

    impl CountingFactory {
        fn boxed(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicUsize>) {
            let creations = Arc::new(AtomicUsize::new(0));
            let factory = Box::new(Self {
                name,
                creations: creations.clone(),
            });
            (factory, creations)
        }
    }

    #[async_trait]
    impl RepositoryFactory for CountingFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn SavingsRepository>, RepositoryError> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct BrokenFactory;

    #[async_trait]
    impl RepositoryFactory for BrokenFactory {
        fn backend_name(&self) -> &'static str {
            "broken"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn SavingsRepository>, RepositoryError> {
            Err(RepositoryError::Connection("refused".to_string()))
        }
    }

    fn config_for(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    #[test]
    fn default_config_is_in_memory_sqlite() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn registry_starts_empty() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
        assert!(
            RepositoryRegistry::default()
                .available_backends()
                .is_empty()
        );
    }

    #[test]
    fn backends_listed_alphabetically() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, _) = CountingFactory::boxed("sqlite");
        let (postgres, _) = CountingFactory::boxed("postgres");
        registry.register(sqlite);
        registry.register(postgres);
        assert_eq!(registry.available_backends(), vec!["postgres", "sqlite"]);
    }

    #[test]
    fn reregistering_a_name_keeps_one_entry() {
        let mut registry = RepositoryRegistry::new();
        let (first, _) = CountingFactory::boxed("sqlite");
        let (second, _) = CountingFactory::boxed("sqlite");
        registry.register(first);
        registry.register(second);
        assert_eq!(registry.available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn create_routes_to_the_named_factory() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, sqlite_creations) = CountingFactory::boxed("sqlite");
        let (postgres, postgres_creations) = CountingFactory::boxed("postgres");
        registry.register(sqlite);
        registry.register(postgres);

        let result = registry.create(&config_for("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert_eq!(sqlite_creations.load(Ordering::SeqCst), 1);
        assert_eq!(postgres_creations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reregistering_routes_to_the_replacement() {
        let mut registry = RepositoryRegistry::new();
        let (first, first_creations) = CountingFactory::boxed("sqlite");
        let (second, second_creations) = CountingFactory::boxed("sqlite");
        registry.register(first);
        registry.register(second);

        registry
            .create(&config_for("sqlite"))
            .await
            .expect("replacement factory should succeed");

        assert_eq!(first_creations.load(Ordering::SeqCst), 0);
        assert_eq!(second_creations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_backend_is_a_configuration_error() {
        let registry = RepositoryRegistry::new();
        assert!(matches!(
            registry.create(&config_for("nope")).await,
            Err(RepositoryError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn configuration_error_lists_alternatives() {
        let mut registry = RepositoryRegistry::new();
        let (sqlite, _) = CountingFactory::boxed("sqlite");
        registry.register(sqlite);

        match registry.create(&config_for("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"), "names the requested backend");
                assert!(msg.contains("sqlite"), "lists what is registered");
            }
            other => panic!("expected Configuration error, got {:#?}", other.err()),
        }
    }

    #[tokio::test]
    async fn factory_failure_passes_through() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(BrokenFactory));

        match registry.create(&config_for("broken")).await {
            Err(err) => assert_eq!(err, RepositoryError::Connection("refused".to_string())),
            Ok(_) => panic!("expected the factory error to pass through"),
        }
    }
}
