use std::path::PathBuf;

use async_trait::async_trait;

use savings_core::db::repository::{RepositoryError, SavingsRepository};
use savings_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so it works in both development
/// and packaged distribution.
///
/// Resolution order:
/// 1. `SAVINGS_SEEDS_DIR`, when set (override for packagers or custom
///    layouts).
/// 2. `./seeds`, when the directory exists in the current working directory.
/// 3. `$CARGO_MANIFEST_DIR/seeds` as a last resort (dev and tests run from
///    the build tree).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SAVINGS_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`savings_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use savings_core::db::RepositoryRegistry;
/// use savings_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory::new()));
/// ```
#[derive(Debug, Default)]
pub struct SqliteRepositoryFactory {
    seeds_dir: Option<PathBuf>,
}

impl SqliteRepositoryFactory {
    /// Factory that resolves the seeds directory at runtime (see the module's
    /// `seeds_dir` resolution order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that loads seeds from a fixed directory, skipping the runtime
    /// resolution. Used when a config file names the directory explicitly.
    pub fn with_seeds_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            seeds_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, then run
    /// migrations and seeds so the catalog is ready to query.
    ///
    /// Accepted connection-string values:
    /// * A sqlx SQLite URL or bare file path, e.g. `sqlite:savings.db` or
    ///   `savings.db`. The file is created if it does not exist.
    /// * `":memory:"` for an ephemeral in-memory database (useful for tests).
    ///
    /// Seed SQL files are loaded from the configured directory, or from a
    /// directory resolved at runtime. For packaged distribution, set
    /// `SAVINGS_SEEDS_DIR` or run with a `seeds` directory in the current
    /// working directory.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SavingsRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{:#}", e)))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        let dir = match &self.seeds_dir {
            Some(dir) => dir.clone(),
            None => seeds_dir(),
        };
        repo.run_seeds(&dir)
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        Ok(Box::new(repo))
    }
}
