//! PCD Collection
//!
//! Ordered store of records keyed by id, plus a side index from id to folder.
//! Insertion order is significant: it is preserved by every operation and by
//! the serialized form, and therefore participates in the collection hash.
//!
//! The folder index lives beside the records rather than inside them, since
//! records are opaque to the collection. An id without an index entry sits in
//! the root folder.

pub mod codec;
pub mod merge;

pub use codec::{DeserializeOptions, FallbackDeserializer, SerializedPcdCollection};
pub use merge::MergeOptions;

use crate::emitter::{ChangeEmitter, Subscription};
use crate::error::CollectionError;
use crate::folder;
use crate::package::{PackageRegistry, PcdPackage};
use crate::pcd::Pcd;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Options for [`PcdCollection::add`] and [`PcdCollection::add_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Replace an existing record with the same id, keeping its position
    pub upsert: bool,
}

impl AddOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// All the records a user holds, with the packages able to handle them
pub struct PcdCollection {
    packages: Arc<PackageRegistry>,
    pcds: Vec<Pcd>,
    /// id -> position in `pcds`
    index: HashMap<String, usize>,
    /// id -> folder; never holds the root, never outlives its record
    folders: BTreeMap<String, String>,
    /// Folder entries read from a snapshot whose record was not loaded under
    /// that id. Written back on serialization so the snapshot round-trips.
    unresolved_folders: BTreeMap<String, String>,
    emitter: ChangeEmitter,
}

impl PcdCollection {
    pub fn new(packages: Arc<PackageRegistry>) -> Self {
        Self {
            packages,
            pcds: Vec::new(),
            index: HashMap::new(),
            folders: BTreeMap::new(),
            unresolved_folders: BTreeMap::new(),
            emitter: ChangeEmitter::new(),
        }
    }

    /// Build a collection from existing records and folder assignments
    ///
    /// Fails on repeated ids and on folder entries for absent records.
    pub fn with_pcds(
        packages: Arc<PackageRegistry>,
        pcds: Vec<Pcd>,
        folders: BTreeMap<String, String>,
    ) -> Result<Self, CollectionError> {
        let mut collection = Self::new(packages);
        collection.add_all(pcds, AddOptions::default())?;
        for (id, folder) in folders {
            if !collection.has_pcd_with_id(&id) {
                return Err(CollectionError::RecordNotFound(id));
            }
            collection.assign_folder(&id, &folder);
        }
        Ok(collection)
    }

    pub fn packages(&self) -> &PackageRegistry {
        &self.packages
    }

    /// Shared handle on the registry, for building sibling collections
    pub fn package_registry(&self) -> Arc<PackageRegistry> {
        Arc::clone(&self.packages)
    }

    pub fn get_package(&self, name: &str) -> Option<&dyn PcdPackage> {
        self.packages.get_package(name)
    }

    pub fn has_package(&self, name: &str) -> bool {
        self.packages.has_package(name)
    }

    /// Listen for changes; see [`ChangeEmitter::subscribe`]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.emitter.subscribe(listener)
    }

    pub fn change_emitter(&self) -> &ChangeEmitter {
        &self.emitter
    }

    pub(crate) fn emit_change(&self) {
        self.emitter.emit();
    }

    // ----- records -----

    pub fn add(&mut self, pcd: Pcd, options: AddOptions) -> Result<(), CollectionError> {
        self.add_all(vec![pcd], options)
    }

    /// Add a batch of records
    ///
    /// Without `upsert`, any id already present (or repeated inside the batch)
    /// fails the whole batch before anything is written. With `upsert`,
    /// existing ids are replaced in place and later batch entries win.
    pub fn add_all(&mut self, pcds: Vec<Pcd>, options: AddOptions) -> Result<(), CollectionError> {
        if !options.upsert {
            let mut batch_ids = HashSet::with_capacity(pcds.len());
            for pcd in &pcds {
                if self.has_pcd_with_id(pcd.id()) || !batch_ids.insert(pcd.id()) {
                    return Err(CollectionError::DuplicateId(pcd.id().to_string()));
                }
            }
        }

        debug!(count = pcds.len(), upsert = options.upsert, "Adding pcds");
        if self.upsert_all(pcds) {
            self.emit_change();
        }
        Ok(())
    }

    /// Remove a record and its folder assignment
    ///
    /// Removing an absent id is a no-op and returns `false`.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.remove_where(|pcd, _| pcd.id() == id) > 0;
        if removed {
            self.emit_change();
        }
        removed
    }

    pub fn size(&self) -> usize {
        self.pcds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcds.is_empty()
    }

    pub fn get_all(&self) -> &[Pcd] {
        &self.pcds
    }

    pub fn get_all_ids(&self) -> Vec<&str> {
        self.pcds.iter().map(Pcd::id).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Pcd> {
        self.index.get(id).map(|&position| &self.pcds[position])
    }

    /// Records whose id is listed, in collection order
    pub fn get_by_ids(&self, ids: &[&str]) -> Vec<&Pcd> {
        let wanted: HashSet<&str> = ids.iter().copied().collect();
        self.pcds
            .iter()
            .filter(|pcd| wanted.contains(pcd.id()))
            .collect()
    }

    pub fn has_pcd_with_id(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get_pcds_by_type(&self, pcd_type: &str) -> Vec<&Pcd> {
        self.pcds
            .iter()
            .filter(|pcd| pcd.pcd_type() == pcd_type)
            .collect()
    }

    /// Check a record with its owning package
    pub async fn verify(&self, pcd: &Pcd) -> Result<bool, CollectionError> {
        self.packages.get_or_error(pcd.pcd_type())?.verify(pcd).await
    }

    // ----- folders -----

    /// Move a record into `folder`; the root folder clears the assignment
    pub fn set_pcd_folder(&mut self, id: &str, folder: &str) -> Result<(), CollectionError> {
        self.bulk_set_folder(&[id], folder)
    }

    /// Move several records into `folder` at once
    ///
    /// Every id is checked before any assignment changes.
    pub fn bulk_set_folder(&mut self, ids: &[&str], folder: &str) -> Result<(), CollectionError> {
        if let Some(missing) = ids.iter().find(|id| !self.has_pcd_with_id(id)) {
            return Err(CollectionError::RecordNotFound(missing.to_string()));
        }

        let mut changed = false;
        for id in ids {
            changed |= self.assign_folder(id, folder);
        }
        if changed {
            self.emit_change();
        }
        Ok(())
    }

    pub fn get_folder_of_pcd(&self, id: &str) -> Option<&str> {
        self.folders.get(id).map(String::as_str)
    }

    /// Records assigned to exactly `folder`, in collection order
    ///
    /// Subfolders are not included. For the root folder this is every record
    /// without an assignment.
    pub fn get_all_pcds_in_folder(&self, folder: &str) -> Vec<&Pcd> {
        self.pcds
            .iter()
            .filter(|pcd| in_folder(self.get_folder_of_pcd(pcd.id()), folder))
            .collect()
    }

    /// Remove the records assigned to exactly `folder`; returns how many
    pub fn remove_all_pcds_in_folder(&mut self, folder: &str) -> usize {
        let removed = self.remove_where(|_, assigned| in_folder(assigned, folder));
        if removed > 0 {
            self.emit_change();
        }
        removed
    }

    /// Swap the contents of `folder` for `pcds`
    ///
    /// Records formerly in the folder are removed; the new records are
    /// upserted and assigned to it. One notification covers the whole swap.
    pub fn replace_pcds_in_folder(&mut self, folder: &str, pcds: Vec<Pcd>) {
        let mut changed = self.remove_where(|_, assigned| in_folder(assigned, folder)) > 0;
        let ids: Vec<String> = pcds.iter().map(|pcd| pcd.id().to_string()).collect();
        changed |= self.upsert_all(pcds);
        for id in &ids {
            changed |= self.assign_folder(id, folder);
        }
        if changed {
            self.emit_change();
        }
    }

    /// Direct subfolders of `folder` implied by the current assignments
    pub fn get_folders_in_folder(&self, folder: &str) -> Vec<String> {
        folder::get_folders_in_folder(folder, self.folders.values().map(String::as_str))
    }

    /// True iff some record is assigned to exactly `folder`
    pub fn is_valid_folder(&self, folder: &str) -> bool {
        self.folders.values().any(|assigned| assigned == folder)
    }

    /// Distinct assigned folders, sorted
    pub fn get_all_folder_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.folders.values().map(String::as_str).collect();
        names.into_iter().collect()
    }

    /// Snapshot folder entries that no loaded record claims
    ///
    /// A record that falls back to an unknown sentinel under a derived id
    /// leaves its folder entry here until the record loads again.
    pub fn get_unresolved_folders(&self) -> &BTreeMap<String, String> {
        &self.unresolved_folders
    }

    /// Folder map for the serialized form: live assignments over unresolved ones
    pub(crate) fn snapshot_folders(&self) -> BTreeMap<String, String> {
        let mut folders = self.unresolved_folders.clone();
        folders.extend(
            self.folders
                .iter()
                .map(|(id, folder)| (id.clone(), folder.clone())),
        );
        folders
    }

    pub(crate) fn keep_unresolved_folder(&mut self, id: &str, folder: &str) {
        self.unresolved_folders
            .insert(id.to_string(), folder.to_string());
    }

    // ----- internal mutation helpers (no notification) -----

    /// Insert or replace each record in place; reports whether anything changed
    pub(crate) fn upsert_all(&mut self, pcds: Vec<Pcd>) -> bool {
        let mut changed = false;
        for pcd in pcds {
            let existing = self.index.get(pcd.id()).copied();
            match existing {
                Some(position) => {
                    if self.pcds[position] != pcd {
                        self.pcds[position] = pcd;
                        changed = true;
                    }
                }
                None => {
                    // A live record owns its folder from now on
                    self.unresolved_folders.remove(pcd.id());
                    self.index.insert(pcd.id().to_string(), self.pcds.len());
                    self.pcds.push(pcd);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Point `id` at `folder` (root clears it); reports whether anything changed
    ///
    /// Callers check that the record exists.
    pub(crate) fn assign_folder(&mut self, id: &str, folder: &str) -> bool {
        if folder::is_root_folder(folder) {
            return self.folders.remove(id).is_some();
        }
        if self.get_folder_of_pcd(id) == Some(folder) {
            return false;
        }
        self.folders.insert(id.to_string(), folder.to_string());
        true
    }

    /// Drop every record matching `predicate`, along with its folder entry
    pub(crate) fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Pcd, Option<&str>) -> bool,
    {
        let folders = &self.folders;
        let mut removed_ids = Vec::new();
        self.pcds.retain(|pcd| {
            let assigned = folders.get(pcd.id()).map(String::as_str);
            if predicate(pcd, assigned) {
                removed_ids.push(pcd.id().to_string());
                false
            } else {
                true
            }
        });

        if removed_ids.is_empty() {
            return 0;
        }
        for id in &removed_ids {
            self.folders.remove(id);
        }
        self.reindex();
        removed_ids.len()
    }

    fn reindex(&mut self) {
        self.index = self
            .pcds
            .iter()
            .enumerate()
            .map(|(position, pcd)| (pcd.id().to_string(), position))
            .collect();
    }
}

impl std::fmt::Debug for PcdCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcdCollection")
            .field("packages", &self.packages)
            .field("size", &self.pcds.len())
            .field("folders", &self.folders)
            .field("unresolved_folders", &self.unresolved_folders.len())
            .finish()
    }
}

/// Whether a record with assignment `assigned` sits directly in `folder`
pub(crate) fn in_folder(assigned: Option<&str>, folder: &str) -> bool {
    match assigned {
        Some(assigned) => assigned == folder,
        None => folder::is_root_folder(folder),
    }
}
