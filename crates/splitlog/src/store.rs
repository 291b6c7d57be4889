//! The filesystem-backed result store.
//!
//! One storage directory holds three append-only logs plus the lock
//! file. Writers serialize on the directory lock; reads scan without
//! locking and may trail the newest append. `save_test` and
//! `set_alternative` hold the lock across their check and append, so a
//! pair of racing writers cannot both slip a conflicting record in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::lock::DirLock;
use crate::record::{Assignment, ResultEvent, TestDefinition};
use crate::report::AbReport;
use crate::{log, query, report};

/// File extension shared by the three logs and the lock file.
pub const LOG_EXTENSION: &str = "splitlog";

/// The six operations a higher-level A/B-testing controller depends on.
///
/// `ResultStore` is the flat-file implementation; alternative backends
/// can sit behind the same contract.
pub trait ResultStorage {
    /// Register a test, or verify an existing registration.
    fn save_test(&self, test_name: &str, alternatives: &[String]) -> Result<()>;

    /// Append one funnel event. Never validated against the registry.
    fn record(
        &self,
        identity: &str,
        test_name: &str,
        alternative: usize,
        action: &str,
        completed: bool,
    ) -> Result<()>;

    /// Whether any completed event exists for this identity/test/alternative.
    fn is_completed(&self, identity: &str, test_name: &str, alternative: usize) -> bool;

    /// Pin an identity to one alternative of a test.
    fn set_alternative(&self, identity: &str, test_name: &str, alternative: usize) -> Result<()>;

    /// The identity's pinned alternative, if any.
    fn get_alternative(&self, identity: &str, test_name: &str) -> Option<usize>;

    /// Aggregate the two-step funnel report for a test.
    fn ab_report(&self, test_name: &str, action_a: &str, action_b: &str) -> Result<AbReport>;
}

/// Configuration for a [`ResultStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the logs. Must exist before the store opens.
    pub directory: PathBuf,

    /// Fsync after every append (default: true). Turning this off trades
    /// durability for throughput; line atomicity is unaffected.
    pub sync_writes: bool,
}

impl StoreConfig {
    /// Configuration with defaults for the given directory.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            sync_writes: true,
        }
    }
}

/// Append-only flat-file storage for A/B test results.
///
/// Instances are cheap to clone-by-reopen and safe to use from multiple
/// threads or processes against the same directory; appends coordinate
/// through the directory lock.
#[derive(Debug)]
pub struct ResultStore {
    directory: PathBuf,
    lock: DirLock,
    tests_path: PathBuf,
    results_path: PathBuf,
    alts_path: PathBuf,
    sync_writes: bool,
}

impl ResultStore {
    /// Open a store over an existing directory with default config.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(StoreConfig::new(directory))
    }

    /// Open a store with explicit configuration.
    ///
    /// Fails with [`StoreError::MissingDirectory`] if the directory does
    /// not already exist; the store never creates it.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        if !config.directory.is_dir() {
            return Err(StoreError::MissingDirectory(config.directory));
        }

        let log_path = |stem: &str| config.directory.join(format!("{stem}.{LOG_EXTENSION}"));

        let store = Self {
            lock: DirLock::new(&config.directory),
            tests_path: log_path("tests"),
            results_path: log_path("results"),
            alts_path: log_path("alts"),
            sync_writes: config.sync_writes,
            directory: config.directory,
        };
        debug!(directory = %store.directory.display(), "opened result store");
        Ok(store)
    }

    /// The storage directory this store is bound to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn lookup_test(&self, test_name: &str) -> Option<TestDefinition> {
        query::find_first_as(&self.tests_path, &[("t", Value::from(test_name))])
    }

    fn lookup_assignment(&self, identity: &str, test_name: &str) -> Option<Assignment> {
        query::find_first_as(
            &self.alts_path,
            &[("i", Value::from(identity)), ("t", Value::from(test_name))],
        )
    }
}

impl ResultStorage for ResultStore {
    /// Register `test_name` with its ordered alternatives.
    ///
    /// Re-registering the same list is idempotent in effect but still
    /// appends a record; the earliest record stays authoritative. A
    /// different list is rejected with [`StoreError::TestConflict`].
    fn save_test(&self, test_name: &str, alternatives: &[String]) -> Result<()> {
        // Lock spans the check and the append: no window for two racing
        // registrations with different lists to both pass the check.
        let guard = self.lock.acquire()?;

        if let Some(existing) = self.lookup_test(test_name) {
            if existing.alternatives != alternatives {
                debug!(test = test_name, "rejecting conflicting registration");
                return Err(StoreError::TestConflict {
                    name: test_name.to_string(),
                });
            }
        }

        let definition = TestDefinition {
            test_name: test_name.to_string(),
            alternatives: alternatives.to_vec(),
        };
        log::append(&guard, &self.tests_path, &definition, self.sync_writes)
    }

    fn record(
        &self,
        identity: &str,
        test_name: &str,
        alternative: usize,
        action: &str,
        completed: bool,
    ) -> Result<()> {
        let event = ResultEvent {
            identity: identity.to_string(),
            test_name: test_name.to_string(),
            alternative,
            action: action.to_string(),
            completed,
        };

        let guard = self.lock.acquire()?;
        log::append(&guard, &self.results_path, &event, self.sync_writes)
    }

    /// Existence check over the entire event stream, not a first-match
    /// lookup: completion is a one-way flag, true once it appears
    /// anywhere in the log.
    fn is_completed(&self, identity: &str, test_name: &str, alternative: usize) -> bool {
        query::find_first(
            &self.results_path,
            &[
                ("i", Value::from(identity)),
                ("t", Value::from(test_name)),
                ("n", Value::from(alternative)),
                ("c", Value::from(true)),
            ],
        )
        .is_some()
    }

    fn set_alternative(&self, identity: &str, test_name: &str, alternative: usize) -> Result<()> {
        let guard = self.lock.acquire()?;

        if let Some(existing) = self.lookup_assignment(identity, test_name) {
            if existing.alternative != alternative {
                debug!(
                    identity,
                    test = test_name,
                    "rejecting conflicting assignment"
                );
                return Err(StoreError::AssignmentConflict {
                    identity: identity.to_string(),
                    test_name: test_name.to_string(),
                });
            }
        }

        let assignment = Assignment {
            identity: identity.to_string(),
            test_name: test_name.to_string(),
            alternative,
        };
        log::append(&guard, &self.alts_path, &assignment, self.sync_writes)
    }

    /// First matching assignment wins; later duplicates never shadow it.
    fn get_alternative(&self, identity: &str, test_name: &str) -> Option<usize> {
        self.lookup_assignment(identity, test_name)
            .map(|a| a.alternative)
    }

    fn ab_report(&self, test_name: &str, action_a: &str, action_b: &str) -> Result<AbReport> {
        let definition = self
            .lookup_test(test_name)
            .ok_or_else(|| StoreError::UnknownTest(test_name.to_string()))?;

        let fields = [("t", Value::from(test_name))];
        let events = query::find_all(&self.results_path, &fields)
            .filter_map(|value| serde_json::from_value::<ResultEvent>(value).ok());

        Ok(report::aggregate(&definition, events, action_a, action_b))
    }
}
