//! The public facade: every operation opens the backing file under the
//! appropriate cross-process lock, mutates or reads an in-memory snapshot,
//! and (for writes) persists the whole file back before returning. Nothing
//! here caches a snapshot across calls -- the file is the only authoritative
//! copy, and the in-memory one is valid only for the span of a single locked
//! operation. [`LockManager`] exists purely to serialize call sequencing
//! in-process; [`FileLock`] is what actually keeps two processes from
//! stepping on each other.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::lock_manager::LockManager;
use crate::core::types::{Document, DimensionMap, UpdateRequest};
use crate::id::prefix_table::PrefixTable;
use crate::id::resolver;
use crate::importexport::archive;
use crate::mutation::{bulk, delete, update};
use crate::mutation::where_ast::WhereExpr;
use crate::query::engine::{self, ListedDocument};
use crate::query::filter::ListQuery;
use crate::storage::file_lock::FileLock;
use crate::storage::layout::StorageLayout;
use crate::storage::persistence;

pub struct Store {
    config: Config,
    prefixes: PrefixTable,
    storage: StorageLayout,
    lock_manager: LockManager<()>,
}

impl Store {
    /// Validate the schema, then bind to the configured file. Nothing is
    /// read or written until the first operation.
    pub fn open(config: Config) -> Result<Self> {
        let prefixes = PrefixTable::build(&config)?;
        let storage = StorageLayout::new(config.storage_path.clone());
        Ok(Store {
            config,
            prefixes,
            storage,
            lock_manager: LockManager::new(()),
        })
    }

    /// Release this process's hold on the lockfile. Safe to call even if no
    /// lock is currently held; a later operation simply reacquires one.
    pub fn close(&self) -> Result<()> {
        FileLock::remove(&self.storage);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn with_read<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&[Document]) -> Result<R>,
    {
        self.lock_manager.read(|_| {
            let _file_lock = FileLock::acquire(&self.storage, false, self.config.lock_wait, self.config.lock_poll_interval)?;
            let snapshot = persistence::load(&self.storage)?;
            f(&snapshot.documents)
        })
    }

    fn with_write<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<Document>) -> Result<R>,
    {
        self.lock_manager.write(|_| {
            let _file_lock = FileLock::acquire(&self.storage, true, self.config.lock_wait, self.config.lock_poll_interval)?;
            let mut snapshot = persistence::load(&self.storage)?;
            let result = f(&mut snapshot.documents)?;
            snapshot.metadata.updated_at = Utc::now();
            persistence::save(&self.storage, &snapshot)?;
            Ok(result)
        })
    }

    // -- queries ----------------------------------------------------------

    pub fn list(&self, query: &ListQuery) -> Result<Vec<ListedDocument>> {
        self.with_read(|documents| engine::list(documents, &self.config, &self.prefixes, query))
    }

    /// Resolve a short ID or UUID string to the document it currently
    /// denotes, accepting either form (see [`resolver::resolve_id`]).
    pub fn resolve(&self, id: &str) -> Result<Uuid> {
        self.with_read(|documents| resolver::resolve_id(id, documents, &self.config, &self.prefixes))
    }

    pub fn short_ids(&self) -> Result<HashMap<Uuid, String>> {
        self.with_read(|documents| Ok(resolver::short_ids_for(documents, &self.config, &self.prefixes)))
    }

    pub fn get(&self, id: &str) -> Result<Document> {
        self.with_read(|documents| {
            let uuid = resolver::resolve_id(id, documents, &self.config, &self.prefixes)?;
            documents
                .iter()
                .find(|d| d.uuid == uuid)
                .cloned()
                .ok_or_else(|| crate::core::error::Error::not_found(format!("uuid '{}' does not exist", uuid)))
        })
    }

    // -- single-document mutations -----------------------------------------

    pub fn add(&self, title: impl Into<String>, body: impl Into<String>, dimensions: DimensionMap) -> Result<Document> {
        self.with_write(|documents| crate::mutation::add::add(documents, &self.config, title.into(), body.into(), dimensions))
    }

    pub fn update(&self, id: &str, request: UpdateRequest) -> Result<Document> {
        self.with_write(|documents| update::update(documents, &self.config, &self.prefixes, id, request))
    }

    pub fn delete(&self, id: &str, cascade: bool) -> Result<Uuid> {
        self.with_write(|documents| delete::delete(documents, &self.config, &self.prefixes, id, cascade))
    }

    // -- bulk mutations -----------------------------------------------------

    pub fn update_by_dimension(&self, dimension: &str, value: &str, request: UpdateRequest) -> Result<usize> {
        self.with_write(|documents| bulk::update_by_dimension(documents, &self.config, dimension, value, request))
    }

    pub fn delete_by_dimension(&self, dimension: &str, value: &str, cascade: bool) -> Result<usize> {
        self.with_write(|documents| bulk::delete_by_dimension(documents, &self.config, dimension, value, cascade))
    }

    pub fn update_by_uuids(&self, uuids: &[Uuid], request: UpdateRequest) -> Result<usize> {
        self.with_write(|documents| bulk::update_by_uuids(documents, &self.config, &self.prefixes, uuids, request))
    }

    pub fn delete_by_uuids(&self, uuids: &[Uuid], cascade: bool) -> Result<usize> {
        self.with_write(|documents| bulk::delete_by_uuids(documents, &self.config, &self.prefixes, uuids, cascade))
    }

    pub fn update_where(&self, expr: &WhereExpr, params: &[String], request: UpdateRequest) -> Result<usize> {
        self.with_write(|documents| bulk::update_where(documents, &self.config, expr, params, request))
    }

    pub fn delete_where(&self, expr: &WhereExpr, params: &[String], cascade: bool) -> Result<usize> {
        self.with_write(|documents| bulk::delete_where(documents, &self.config, &self.prefixes, expr, params, cascade))
    }

    // -- import / export ----------------------------------------------------

    pub fn export(&self, archive_path: &std::path::Path, format: crate::importexport::formats::ExportFormat) -> Result<()> {
        self.with_read(|documents| archive::export(documents, &self.config, &self.prefixes, archive_path, format))
    }

    pub fn import(&self, archive_path: &std::path::Path) -> Result<usize> {
        self.with_write(|documents| archive::import(documents, &self.config, archive_path))
    }
}
