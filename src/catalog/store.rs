use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, error, info};

use super::collections::{Collections, Touched};
use super::events::ChangeKind;
use super::hydrate::{load, HydrationReport};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::kv::{FileKeyValueStore, KeyValueStore};
use crate::model::{
    Artwork, ArtworkFilter, ArtworkList, ArtworkPatch, CatalogStats, ListPatch, NewArtwork,
};
use crate::persistence::{PersistenceStats, PersistenceWorker};
use crate::snapshot::{self, CollectionKind};

#[cfg(feature = "emitter")]
use super::events::{ChangeEvent, ChangeNotifier};

/// Lifecycle of a [`CollectionStore`]. The transition happens once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Hydrating,
    Ready,
}

struct Inner {
    state: StoreState,
    collections: Collections,
    report: Option<HydrationReport>,
}

/// In-process owner of the artwork and list collections.
///
/// All reads return detached copies. All mutations apply to memory
/// synchronously, keep artwork/list cross-references symmetric inside a
/// single write lock, and then hand a full snapshot of each touched
/// collection to a background writer. Callers never wait on storage and
/// never see storage errors.
///
/// ## Example
///
/// ```ignore
/// use gallery_catalog::{CatalogConfig, CollectionStore, InMemoryKeyValueStore, NewArtwork};
///
/// let store = CollectionStore::open(InMemoryKeyValueStore::new(), CatalogConfig::default())?;
/// let art = store.add_artwork(NewArtwork::new("Blue Nude", "Matisse"));
/// let list = store.create_list("Basel 2024");
/// store.add_artwork_to_list(art.id(), list.id());
///
/// assert_eq!(store.get_artworks_by_filter(list.id()).len(), 1);
/// ```
pub struct CollectionStore<S: ?Sized> {
    config: CatalogConfig,
    inner: RwLock<Inner>,
    worker: PersistenceWorker,
    #[cfg(feature = "emitter")]
    notifier: ChangeNotifier,
    kv: Arc<S>,
}

impl<S: KeyValueStore + 'static> CollectionStore<S> {
    /// Create a store in the Hydrating state. Call [`hydrate`](Self::hydrate)
    /// before use, or use [`open`](Self::open).
    pub fn new(kv: S, config: CatalogConfig) -> Result<Self> {
        Self::with_shared(Arc::new(kv), config)
    }

    /// Create and hydrate a store.
    pub fn open(kv: S, config: CatalogConfig) -> Result<Self> {
        let store = Self::new(kv, config)?;
        store.hydrate();
        Ok(store)
    }
}

impl CollectionStore<FileKeyValueStore> {
    /// Open a file-backed store in `config.data_dir`.
    pub fn open_in_data_dir(config: CatalogConfig) -> Result<Self> {
        let dir = config
            .data_dir
            .clone()
            .ok_or_else(|| CatalogError::config("data_dir", "not set"))?;
        let kv = FileKeyValueStore::open(dir)?;
        Self::open(kv, config)
    }
}

impl<S: KeyValueStore + ?Sized + 'static> CollectionStore<S> {
    /// Create a store over a key-value store shared with other owners. The
    /// store starts Hydrating; see [`open_shared`](Self::open_shared).
    pub fn with_shared(kv: Arc<S>, config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let worker = PersistenceWorker::spawn(Arc::clone(&kv));
        Ok(Self {
            config,
            inner: RwLock::new(Inner {
                state: StoreState::Hydrating,
                collections: Collections::default(),
                report: None,
            }),
            worker,
            #[cfg(feature = "emitter")]
            notifier: ChangeNotifier::new(),
            kv,
        })
    }

    /// Create and hydrate a store over a shared key-value store.
    pub fn open_shared(kv: Arc<S>, config: CatalogConfig) -> Result<Self> {
        let store = Self::with_shared(kv, config)?;
        store.hydrate();
        Ok(store)
    }

    /// Load both collections from storage and move to Ready.
    ///
    /// Missing, blank or corrupt snapshots start that collection empty.
    /// Links repaired on load are written back, except into a collection
    /// whose snapshot could not be read.
    /// Anything mutated while Hydrating is replaced by what was loaded.
    /// Calling this again after Ready returns the first report unchanged.
    pub fn hydrate(&self) -> HydrationReport {
        if let Some(report) = self.read().report.clone() {
            return report;
        }

        let (artworks, artworks_outcome) =
            load::<Artwork, S>(&*self.kv, CollectionKind::Artworks, &self.config.artworks_key);
        let (lists, lists_outcome) =
            load::<ArtworkList, S>(&*self.kv, CollectionKind::Lists, &self.config.lists_key);
        let (collections, repaired_links) = Collections::from_parts(artworks, lists);
        let report = HydrationReport {
            artworks: artworks_outcome,
            lists: lists_outcome,
            repaired_links,
        };

        {
            let mut inner = self.write();
            if let Some(existing) = &inner.report {
                return existing.clone();
            }
            inner.collections = collections;
            inner.state = StoreState::Ready;
            inner.report = Some(report.clone());
            if repaired_links > 0 {
                // a snapshot that failed to load is left as it is on disk
                let touched = Touched {
                    artworks: !report.artworks.is_failure(),
                    lists: !report.lists.is_failure(),
                };
                self.persist(&inner.collections, touched);
            }
            info!(
                artworks = inner.collections.artworks.len(),
                lists = inner.collections.lists.len(),
                repaired_links,
                "catalog hydrated"
            );
        }

        self.notify(ChangeKind::Hydrated, Vec::<String>::new());
        report
    }

    pub fn state(&self) -> StoreState {
        self.read().state
    }

    /// True until hydration has completed.
    pub fn is_loading(&self) -> bool {
        self.state() == StoreState::Hydrating
    }

    /// The report from hydration, once it has run.
    pub fn hydration_report(&self) -> Option<HydrationReport> {
        self.read().report.clone()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The backing key-value store.
    pub fn storage(&self) -> &S {
        &self.kv
    }

    // -- artworks ------------------------------------------------------------

    /// Add an artwork, assigning its id and timestamps. Any `list_ids` on the
    /// input are linked on both sides.
    pub fn add_artwork(&self, artwork: NewArtwork) -> Artwork {
        let created = self.apply(|c| c.add_artwork(artwork));
        self.notify(ChangeKind::ArtworkAdded, [created.id()]);
        created
    }

    /// Merge `patch` into an artwork and refresh its `updated_at`.
    /// Returns false if the id is unknown.
    pub fn update_artwork(&self, id: &str, patch: ArtworkPatch) -> bool {
        self.apply_tracked(ChangeKind::ArtworkUpdated, [id], |c| c.update_artwork(id, patch))
    }

    /// Delete an artwork and strip it from every list.
    pub fn delete_artwork(&self, id: &str) -> bool {
        self.apply_tracked(ChangeKind::ArtworkDeleted, [id], |c| c.delete_artwork(id))
    }

    pub fn toggle_favorite(&self, id: &str) -> bool {
        self.apply_tracked(ChangeKind::FavoriteToggled, [id], |c| c.toggle_favorite(id))
    }

    // -- lists ---------------------------------------------------------------

    /// Create a list with an empty description.
    pub fn create_list(&self, name: impl Into<String>) -> ArtworkList {
        self.create_list_with_description(name, String::new())
    }

    pub fn create_list_with_description(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ArtworkList {
        let (name, description) = (name.into(), description.into());
        let created = self.apply(|c| c.create_list(name, description));
        self.notify(ChangeKind::ListCreated, [created.id()]);
        created
    }

    pub fn update_list(&self, id: &str, patch: ListPatch) -> bool {
        self.apply_tracked(ChangeKind::ListUpdated, [id], |c| c.update_list(id, patch))
    }

    /// Delete a list and strip it from every artwork.
    pub fn delete_list(&self, id: &str) -> bool {
        self.apply_tracked(ChangeKind::ListDeleted, [id], |c| c.delete_list(id))
    }

    // -- membership ----------------------------------------------------------

    /// Link an artwork and a list on both sides. No-op if either is unknown
    /// or they are already linked.
    pub fn add_artwork_to_list(&self, artwork_id: &str, list_id: &str) -> bool {
        self.apply_tracked(ChangeKind::ArtworkLinked, [artwork_id, list_id], |c| {
            c.link(artwork_id, list_id)
        })
    }

    /// Unlink an artwork and a list on both sides. No-op if not linked.
    pub fn remove_artwork_from_list(&self, artwork_id: &str, list_id: &str) -> bool {
        self.apply_tracked(ChangeKind::ArtworkUnlinked, [artwork_id, list_id], |c| {
            c.unlink(artwork_id, list_id)
        })
    }

    /// Drop every artwork and list, and remove both keys from storage.
    pub fn reset(&self) {
        {
            let mut inner = self.write();
            inner.collections.clear();
            if inner.state == StoreState::Ready {
                self.worker.remove(&self.config.artworks_key);
                self.worker.remove(&self.config.lists_key);
            }
        }
        info!("catalog reset");
        self.notify(ChangeKind::Reset, Vec::<String>::new());
    }

    // -- queries -------------------------------------------------------------

    pub fn artworks(&self) -> Vec<Artwork> {
        self.read().collections.artworks.clone()
    }

    pub fn lists(&self) -> Vec<ArtworkList> {
        self.read().collections.lists.clone()
    }

    pub fn artwork(&self, id: &str) -> Option<Artwork> {
        self.read().collections.artwork(id).cloned()
    }

    pub fn list(&self, id: &str) -> Option<ArtworkList> {
        self.read().collections.list(id).cloned()
    }

    /// `all`, `favorites`, `recent` (newest first, capped at the configured
    /// limit) or a list id.
    pub fn get_artworks_by_filter(&self, filter: impl Into<ArtworkFilter>) -> Vec<Artwork> {
        let filter = filter.into();
        self.read()
            .collections
            .filter(&filter, self.config.recent_limit)
    }

    /// Case-insensitive substring search over title, artist, gallery, medium
    /// and notes. An empty query returns everything.
    pub fn search_artworks(&self, query: &str) -> Vec<Artwork> {
        self.read().collections.search(query)
    }

    pub fn artworks_in_list(&self, list_id: &str) -> Vec<Artwork> {
        self.read().collections.artworks_in_list(list_id)
    }

    pub fn lists_for_artwork(&self, artwork_id: &str) -> Vec<ArtworkList> {
        self.read().collections.lists_for_artwork(artwork_id)
    }

    pub fn stats(&self) -> CatalogStats {
        self.read().collections.stats()
    }

    // -- persistence ---------------------------------------------------------

    /// Block until every snapshot scheduled so far has been attempted.
    pub fn flush(&self) -> Result<()> {
        self.worker.flush()
    }

    pub fn persistence_stats(&self) -> PersistenceStats {
        self.worker.stats()
    }

    /// Finish pending writes and stop the background writer.
    pub fn shutdown(self) -> PersistenceStats {
        self.worker.stop()
    }

    // -- subscription --------------------------------------------------------

    /// Register a change listener. Returns an id for [`unsubscribe`](Self::unsubscribe).
    ///
    /// Each delivery runs on its own emitter thread, so events from quick
    /// successive mutations may arrive out of order. Treat an event as a
    /// signal to re-read the store, not as an ordered change log.
    #[cfg(feature = "emitter")]
    pub fn subscribe<F>(&self, listener: F) -> String
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    #[cfg(feature = "emitter")]
    pub fn unsubscribe(&self, id: &str) -> bool {
        self.notifier.unsubscribe(id)
    }

    // -- internals -----------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a mutation under the write lock and schedule write-back for
    /// whatever it touched. Snapshots are queued before the lock is released
    /// so queue order matches mutation order.
    fn apply<R>(&self, op: impl FnOnce(&mut Collections) -> (R, Touched)) -> R {
        let mut inner = self.write();
        let (result, touched) = op(&mut inner.collections);
        debug_assert!(inner.collections.links_consistent());
        if inner.state == StoreState::Ready {
            self.persist(&inner.collections, touched);
        }
        result
    }

    fn apply_tracked<const N: usize>(
        &self,
        kind: ChangeKind,
        ids: [&str; N],
        op: impl FnOnce(&mut Collections) -> Touched,
    ) -> bool {
        let touched = self.apply(|c| {
            let touched = op(c);
            (touched, touched)
        });
        if touched.is_empty() {
            debug!(?kind, ?ids, "no matching entity, nothing changed");
            return false;
        }
        self.notify(kind, ids);
        true
    }

    fn persist(&self, collections: &Collections, touched: Touched) {
        if touched.artworks {
            self.schedule(&self.config.artworks_key, &collections.artworks);
        }
        if touched.lists {
            self.schedule(&self.config.lists_key, &collections.lists);
        }
    }

    fn schedule<T: Serialize>(&self, key: &str, items: &[T]) {
        if items.is_empty() && !self.config.persist_empty {
            debug!(key = %key, "collection empty, keeping previous snapshot");
            self.worker.record_skipped_empty();
            return;
        }
        match snapshot::encode(key, items) {
            Ok(payload) => self.worker.write(key, payload),
            Err(e) => error!(key = %key, error = %e, "failed to encode snapshot"),
        }
    }

    #[allow(unused_variables)]
    fn notify<I, T>(&self, kind: ChangeKind, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        #[cfg(feature = "emitter")]
        self.notifier.notify(&ChangeEvent::new(kind, ids));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKeyValueStore;

    fn open() -> CollectionStore<InMemoryKeyValueStore> {
        CollectionStore::open(InMemoryKeyValueStore::new(), CatalogConfig::default()).unwrap()
    }

    #[test]
    fn new_store_is_loading_until_hydrated() {
        let store =
            CollectionStore::new(InMemoryKeyValueStore::new(), CatalogConfig::default()).unwrap();
        assert!(store.is_loading());
        assert!(store.hydration_report().is_none());

        store.hydrate();
        assert!(!store.is_loading());
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[test]
    fn mutations_before_ready_are_not_persisted() {
        let kv = InMemoryKeyValueStore::new();
        let store = CollectionStore::new(kv.clone(), CatalogConfig::default()).unwrap();

        store.add_artwork(NewArtwork::new("Early", "Bird"));
        store.flush().unwrap();
        assert!(kv.get("artworks").unwrap().is_none());

        store.hydrate();
        assert!(store.artworks().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CatalogConfig::default().with_keys("same", "same");
        assert!(CollectionStore::new(InMemoryKeyValueStore::new(), config).is_err());
    }

    #[test]
    fn no_op_mutations_schedule_nothing() {
        let store = open();
        assert!(!store.update_artwork("nope", ArtworkPatch::default()));
        assert!(!store.remove_artwork_from_list("nope", "nope"));
        store.flush().unwrap();

        assert_eq!(store.persistence_stats().writes_succeeded, 0);
    }

    #[test]
    fn open_in_data_dir_requires_a_directory() {
        let err = CollectionStore::open_in_data_dir(CatalogConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::Config { ref name, .. } if name == "data_dir"));
    }
}
