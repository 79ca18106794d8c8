//! Storage context for editing a purchase and its children
//!
//! A [`Session`] loads a [`PurchaseRecord`] (the purchase plus its models
//! and accessories), serves as the [`ChildContext`] for the ordered child
//! lists, and commits changes back to disk. At load time it remembers the
//! serialized form of every record; on commit only records whose YAML
//! differs are rewritten and detached children are deleted.
//!
//! One session is the only writer of the records it loaded until it is
//! committed or dropped.

use miette::Diagnostic;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::collection::Collection;
use crate::core::entity::{Entity, PurchaseItem};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::ordering::{ChildContext, ChildList, OrderingError};
use crate::entities::{Accessory, Model, Purchase};
use crate::yaml::{parse_yaml_file, YamlError};

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("failed to serialize {id}: {source}")]
    Serialize {
        id: EntityId,
        source: serde_yml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a commit did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    pub written: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// A purchase together with its ordered children
#[derive(Debug, Clone)]
pub struct PurchaseRecord {
    pub purchase: Purchase,
    pub models: ChildList<Model>,
    pub accessories: ChildList<Accessory>,
}

impl PurchaseRecord {
    /// A freshly created purchase with no children
    pub fn new(purchase: Purchase) -> Self {
        Self {
            purchase,
            models: ChildList::new(),
            accessories: ChildList::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.purchase.id
    }

    /// Append a new model
    pub fn add_model(&mut self, session: &mut Session<'_>) -> &mut Model {
        let mut scope = session.scope(self.purchase.id);
        self.models.add(&mut scope)
    }

    /// Detach a model and queue its file for deletion
    ///
    /// # Panics
    ///
    /// Panics if the model does not belong to this purchase.
    pub fn remove_model(&mut self, id: &EntityId, session: &mut Session<'_>) {
        let mut scope = session.scope(self.purchase.id);
        self.models.remove(id, &mut scope);
    }

    /// Append a new accessory
    pub fn add_accessory(&mut self, session: &mut Session<'_>) -> &mut Accessory {
        let mut scope = session.scope(self.purchase.id);
        self.accessories.add(&mut scope)
    }

    /// Detach an accessory and queue its file for deletion
    ///
    /// # Panics
    ///
    /// Panics if the accessory does not belong to this purchase.
    pub fn remove_accessory(&mut self, id: &EntityId, session: &mut Session<'_>) {
        let mut scope = session.scope(self.purchase.id);
        self.accessories.remove(id, &mut scope);
    }

    /// Ordering problems in either child list
    pub fn verify(&self) -> Vec<(EntityPrefix, OrderingError)> {
        let mut problems = Vec::new();
        if let Err(e) = self.models.verify() {
            problems.push((EntityPrefix::Mdl, e));
        }
        if let Err(e) = self.accessories.verify() {
            problems.push((EntityPrefix::Acc, e));
        }
        problems
    }

    /// Renumber both child lists; returns the number of children moved
    pub fn renumber(&mut self) -> usize {
        self.models.renumber() + self.accessories.renumber()
    }

    /// Copy derived values back onto the purchase before it is saved
    fn sync_purchase(&mut self) {
        self.purchase.max_model_position = self.models.max_position();
        self.purchase.max_accessory_position = self.accessories.max_position();
        self.purchase.refresh_catalog_number_prefix();
    }
}

/// Child record whose parent no longer exists
#[derive(Debug, Clone)]
pub struct Orphan {
    pub id: EntityId,
    pub purchase: EntityId,
}

/// Storage context for one command's worth of changes
pub struct Session<'c> {
    collection: &'c Collection,
    snapshots: HashMap<EntityId, String>,
    deleted: Vec<EntityId>,
    skipped: Vec<(PathBuf, YamlError)>,
}

/// A session narrowed to the children of one purchase
pub struct Scope<'s, 'c> {
    session: &'s mut Session<'c>,
    purchase: EntityId,
}

impl ChildContext<Model> for Scope<'_, '_> {
    fn create(&mut self) -> Model {
        Model::new(self.purchase)
    }

    fn delete(&mut self, child: Model) {
        self.session.mark_deleted(child.id);
    }
}

impl ChildContext<Accessory> for Scope<'_, '_> {
    fn create(&mut self) -> Accessory {
        Accessory::new(self.purchase)
    }

    fn delete(&mut self, child: Accessory) {
        self.session.mark_deleted(child.id);
    }
}

impl<'c> Session<'c> {
    pub fn new(collection: &'c Collection) -> Self {
        Self {
            collection,
            snapshots: HashMap::new(),
            deleted: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn collection(&self) -> &Collection {
        self.collection
    }

    /// Context for creating and deleting children of `purchase`
    pub fn scope(&mut self, purchase: EntityId) -> Scope<'_, 'c> {
        Scope {
            session: self,
            purchase,
        }
    }

    /// Child files that failed to parse while loading
    ///
    /// Their parent is unknown, so they are left out of every list.
    pub fn take_skipped(&mut self) -> Vec<(PathBuf, YamlError)> {
        std::mem::take(&mut self.skipped)
    }

    /// Load a purchase and every child that points at it
    pub fn load_purchase(&mut self, id: &EntityId) -> Result<PurchaseRecord, SessionError> {
        let purchase: Purchase = self.read(id)?;
        let models: Vec<Model> = self.read_children(Some(id))?;
        let accessories: Vec<Accessory> = self.read_children(Some(id))?;

        tracing::debug!(
            purchase = %id,
            models = models.len(),
            accessories = accessories.len(),
            "loaded purchase"
        );

        Ok(PurchaseRecord {
            models: ChildList::from_members(models, purchase.max_model_position),
            accessories: ChildList::from_members(accessories, purchase.max_accessory_position),
            purchase,
        })
    }

    /// Load every purchase with its children in one pass over the collection
    ///
    /// Children whose purchase is missing are returned as orphans.
    pub fn load_all(&mut self) -> Result<(Vec<PurchaseRecord>, Vec<Orphan>), SessionError> {
        let mut purchases: Vec<Purchase> = Vec::new();
        for path in self.collection.iter_entity_files(EntityPrefix::Pur) {
            let purchase: Purchase = parse_yaml_file(&path)?;
            self.snapshot(&purchase)?;
            purchases.push(purchase);
        }

        let mut models: BTreeMap<EntityId, Vec<Model>> = BTreeMap::new();
        for model in self.read_children::<Model>(None)? {
            models.entry(model.purchase).or_default().push(model);
        }
        let mut accessories: BTreeMap<EntityId, Vec<Accessory>> = BTreeMap::new();
        for accessory in self.read_children::<Accessory>(None)? {
            accessories.entry(accessory.purchase).or_default().push(accessory);
        }

        let records: Vec<PurchaseRecord> = purchases
            .into_iter()
            .map(|purchase| PurchaseRecord {
                models: ChildList::from_members(
                    models.remove(&purchase.id).unwrap_or_default(),
                    purchase.max_model_position,
                ),
                accessories: ChildList::from_members(
                    accessories.remove(&purchase.id).unwrap_or_default(),
                    purchase.max_accessory_position,
                ),
                purchase,
            })
            .collect();

        let orphans = models
            .into_values()
            .flatten()
            .map(|m| Orphan {
                id: m.id,
                purchase: m.purchase,
            })
            .chain(accessories.into_values().flatten().map(|a| Orphan {
                id: a.id,
                purchase: a.purchase,
            }))
            .collect();

        Ok((records, orphans))
    }

    /// Queue a record file for deletion on the next commit
    pub fn mark_deleted(&mut self, id: EntityId) {
        tracing::debug!(%id, "queued for deletion");
        self.deleted.push(id);
    }

    /// Queue a purchase and all of its children for deletion
    pub fn delete_purchase(&mut self, record: PurchaseRecord) {
        for model in record.models.members() {
            self.mark_deleted(model.id);
        }
        for accessory in record.accessories.members() {
            self.mark_deleted(accessory.id);
        }
        self.mark_deleted(record.purchase.id);
    }

    /// Write every changed record and delete every detached one
    pub fn commit(&mut self, record: &mut PurchaseRecord) -> Result<CommitStats, SessionError> {
        record.sync_purchase();

        let mut stats = CommitStats::default();
        self.save(&record.purchase, &mut stats)?;
        for model in record.models.members() {
            self.save(model, &mut stats)?;
        }
        for accessory in record.accessories.members() {
            self.save(accessory, &mut stats)?;
        }
        self.flush_deleted(&mut stats)?;

        tracing::info!(
            purchase = %record.purchase.id,
            written = stats.written,
            unchanged = stats.unchanged,
            deleted = stats.deleted,
            "committed"
        );
        Ok(stats)
    }

    /// Apply queued deletions without saving anything else
    pub fn commit_deletions(&mut self) -> Result<CommitStats, SessionError> {
        let mut stats = CommitStats::default();
        self.flush_deleted(&mut stats)?;
        Ok(stats)
    }

    fn flush_deleted(&mut self, stats: &mut CommitStats) -> Result<(), SessionError> {
        for id in std::mem::take(&mut self.deleted) {
            let path = self.collection.entity_path(&id);
            if path.exists() {
                fs::remove_file(&path)?;
                stats.deleted += 1;
                tracing::debug!(path = %path.display(), "deleted");
            }
            self.snapshots.remove(&id);
        }
        Ok(())
    }

    fn save<T: Entity>(&mut self, entity: &T, stats: &mut CommitStats) -> Result<(), SessionError> {
        let yaml = Self::serialize(entity)?;
        let id = *entity.id();

        if self.snapshots.get(&id) == Some(&yaml) {
            stats.unchanged += 1;
            return Ok(());
        }

        let path = self.collection.entity_path(&id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, &yaml)?;
        tracing::debug!(path = %path.display(), "wrote");

        self.snapshots.insert(id, yaml);
        stats.written += 1;
        Ok(())
    }

    fn read<T: Entity>(&mut self, id: &EntityId) -> Result<T, SessionError> {
        let entity: T = parse_yaml_file(&self.collection.entity_path(id))?;
        self.snapshot(&entity)?;
        Ok(entity)
    }

    fn read_children<T: PurchaseItem>(
        &mut self,
        purchase: Option<&EntityId>,
    ) -> Result<Vec<T>, SessionError> {
        let mut children = Vec::new();
        for path in self.collection.iter_entity_files(T::PREFIX) {
            let child: T = match parse_yaml_file(&path) {
                Ok(child) => child,
                Err(e) => {
                    tracing::debug!(path = %path.display(), "skipping unparseable child");
                    self.skipped.push((path, e));
                    continue;
                }
            };
            if purchase.is_some_and(|p| child.purchase() != p) {
                continue;
            }
            self.snapshot(&child)?;
            children.push(child);
        }
        Ok(children)
    }

    fn snapshot<T: Entity>(&mut self, entity: &T) -> Result<(), SessionError> {
        let yaml = Self::serialize(entity)?;
        self.snapshots.insert(*entity.id(), yaml);
        Ok(())
    }

    fn serialize<T: Serialize + Entity>(entity: &T) -> Result<String, SessionError> {
        serde_yml::to_string(entity).map_err(|source| SessionError::Serialize {
            id: *entity.id(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_collection() -> (TempDir, Collection) {
        let tmp = TempDir::new().unwrap();
        let collection = Collection::init(tmp.path(), false).unwrap();
        (tmp, collection)
    }

    fn purchase_with_models(collection: &Collection, count: usize) -> (EntityId, Vec<EntityId>) {
        let mut session = Session::new(collection);
        let mut record = PurchaseRecord::new(Purchase::new(
            "Hornby".into(),
            "R3390TTS".into(),
            "test".into(),
        ));
        let mut ids = Vec::new();
        for n in 0..count {
            let model = record.add_model(&mut session);
            model.number = format!("{}", 100 + n);
            ids.push(model.id);
        }
        session.commit(&mut record).unwrap();
        (record.id(), ids)
    }

    fn count_files(collection: &Collection, prefix: EntityPrefix) -> usize {
        collection.iter_entity_files(prefix).count()
    }

    #[test]
    fn test_commit_new_record_writes_everything() {
        let (_tmp, collection) = new_collection();
        let mut session = Session::new(&collection);
        let mut record = PurchaseRecord::new(Purchase::new(
            "Bachmann".into(),
            "32-452A".into(),
            "test".into(),
        ));
        record.add_model(&mut session);
        record.add_accessory(&mut session);

        let stats = session.commit(&mut record).unwrap();

        assert_eq!(stats.written, 3);
        assert_eq!(stats.unchanged, 0);
        assert_eq!(record.purchase.max_model_position, 0);
        assert_eq!(record.purchase.max_accessory_position, 0);
    }

    #[test]
    fn test_load_round_trip() {
        let (_tmp, collection) = new_collection();
        let (purchase, ids) = purchase_with_models(&collection, 3);

        let mut session = Session::new(&collection);
        let record = session.load_purchase(&purchase).unwrap();

        assert_eq!(record.models.len(), 3);
        assert_eq!(record.models.max_position(), 2);
        assert_eq!(record.purchase.catalog_number_prefix, "R3390");
        let ordered: Vec<EntityId> = record.models.ordered().iter().map(|m| m.id).collect();
        assert_eq!(ordered, ids);
        assert!(record.verify().is_empty());
    }

    #[test]
    fn test_load_skips_unparseable_children() {
        let (_tmp, collection) = new_collection();
        let (purchase, _) = purchase_with_models(&collection, 2);
        let broken = collection
            .entity_dir(EntityPrefix::Mdl)
            .join("MDL-BROKEN.yb.yaml");
        fs::write(&broken, "position: [\n").unwrap();

        let mut session = Session::new(&collection);
        let record = session.load_purchase(&purchase).unwrap();
        assert_eq!(record.models.len(), 2);

        let skipped = session.take_skipped();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, broken);
        assert!(session.take_skipped().is_empty());
    }

    #[test]
    fn test_commit_without_changes_writes_nothing() {
        let (_tmp, collection) = new_collection();
        let (purchase, _) = purchase_with_models(&collection, 3);

        let mut session = Session::new(&collection);
        let mut record = session.load_purchase(&purchase).unwrap();
        let stats = session.commit(&mut record).unwrap();

        assert_eq!(stats.written, 0);
        assert_eq!(stats.unchanged, 4);
    }

    #[test]
    fn test_move_rewrites_only_affected_range() {
        let (_tmp, collection) = new_collection();
        let (purchase, ids) = purchase_with_models(&collection, 6);

        let mut session = Session::new(&collection);
        let mut record = session.load_purchase(&purchase).unwrap();
        record.models.move_at(4, 2);
        let stats = session.commit(&mut record).unwrap();

        // models at 2, 3 and 4 change; the purchase does not
        assert_eq!(stats.written, 3);
        assert_eq!(stats.unchanged, 4);

        let mut session = Session::new(&collection);
        let record = session.load_purchase(&purchase).unwrap();
        let ordered: Vec<EntityId> = record.models.ordered().iter().map(|m| m.id).collect();
        assert_eq!(ordered, vec![ids[0], ids[1], ids[4], ids[2], ids[3], ids[5]]);
    }

    #[test]
    fn test_remove_deletes_file_and_closes_gap() {
        let (_tmp, collection) = new_collection();
        let (purchase, ids) = purchase_with_models(&collection, 3);

        let mut session = Session::new(&collection);
        let mut record = session.load_purchase(&purchase).unwrap();
        record.remove_model(&ids[0], &mut session);
        let stats = session.commit(&mut record).unwrap();

        assert_eq!(stats.deleted, 1);
        // two siblings shift plus the purchase's cached max position
        assert_eq!(stats.written, 3);
        assert_eq!(count_files(&collection, EntityPrefix::Mdl), 2);

        let mut session = Session::new(&collection);
        let record = session.load_purchase(&purchase).unwrap();
        assert_eq!(record.models.max_position(), 1);
        assert!(record.verify().is_empty());
    }

    #[test]
    fn test_delete_purchase_removes_children() {
        let (_tmp, collection) = new_collection();
        let (purchase, _) = purchase_with_models(&collection, 2);

        let mut session = Session::new(&collection);
        let record = session.load_purchase(&purchase).unwrap();
        session.delete_purchase(record);
        let stats = session.commit_deletions().unwrap();

        assert_eq!(stats.deleted, 3);
        assert_eq!(count_files(&collection, EntityPrefix::Pur), 0);
        assert_eq!(count_files(&collection, EntityPrefix::Mdl), 0);
    }

    #[test]
    fn test_load_all_groups_children_and_finds_orphans() {
        let (_tmp, collection) = new_collection();
        let (first, _) = purchase_with_models(&collection, 2);
        let (second, _) = purchase_with_models(&collection, 1);

        let orphan = Model::new(EntityId::new(EntityPrefix::Pur));
        fs::write(
            collection.entity_path(&orphan.id),
            serde_yml::to_string(&orphan).unwrap(),
        )
        .unwrap();

        let mut session = Session::new(&collection);
        let (records, orphans) = session.load_all().unwrap();

        assert_eq!(records.len(), 2);
        let count = |id: EntityId| {
            records
                .iter()
                .find(|r| r.id() == id)
                .map(|r| r.models.len())
                .unwrap()
        };
        assert_eq!(count(first), 2);
        assert_eq!(count(second), 1);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, orphan.id);
    }

    #[test]
    fn test_renumber_repairs_hand_edited_positions() {
        let (_tmp, collection) = new_collection();
        let (purchase, ids) = purchase_with_models(&collection, 3);

        // Simulate a hand edit that leaves a gap
        let path = collection.entity_path(&ids[2]);
        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replace("position: 2", "position: 7")).unwrap();

        let mut session = Session::new(&collection);
        let mut record = session.load_purchase(&purchase).unwrap();
        assert_eq!(record.verify().len(), 1);

        assert_eq!(record.renumber(), 1);
        let stats = session.commit(&mut record).unwrap();
        assert_eq!(stats.written, 1);
        assert!(record.verify().is_empty());
    }
}
