//! The migration definition contract and the discovered-definition set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{MigrateError, Result};
use crate::provider::TransformationProvider;

/// A versioned, reversible schema change.
///
/// Definitions are authored externally (a loader hands them to the runner)
/// and express both directions purely in terms of
/// [`TransformationProvider`] calls.
#[async_trait]
pub trait Migration: Send + Sync {
    /// The migration's version. Strictly ordered and unique across the
    /// discovered set.
    fn version(&self) -> i64;

    /// Human-readable name for logs and reports.
    fn name(&self) -> &str;

    /// Apply the forward schema change.
    async fn up(&self, schema: &TransformationProvider) -> Result<()>;

    /// Apply the paired reverse change.
    async fn down(&self, schema: &TransformationProvider) -> Result<()>;
}

/// The set of discovered migration definitions, keyed by version.
#[derive(Default)]
pub struct MigrationSet {
    migrations: BTreeMap<i64, Arc<dyn Migration>>,
}

impl MigrationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::DuplicateVersion`] when a definition with the
    /// same version was already registered.
    pub fn register(&mut self, migration: Arc<dyn Migration>) -> Result<()> {
        let version = migration.version();
        if self.migrations.contains_key(&version) {
            return Err(MigrateError::DuplicateVersion(version));
        }
        self.migrations.insert(version, migration);
        Ok(())
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// All registered versions, ascending.
    pub fn versions(&self) -> BTreeSet<i64> {
        self.migrations.keys().copied().collect()
    }

    /// The highest registered version, if any.
    pub fn latest(&self) -> Option<i64> {
        self.migrations.keys().next_back().copied()
    }

    /// Look up a definition by version.
    pub fn get(&self, version: i64) -> Option<Arc<dyn Migration>> {
        self.migrations.get(&version).cloned()
    }
}
