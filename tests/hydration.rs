mod support;

use std::sync::Arc;

use gallery_catalog::{
    CatalogConfig, CollectionKind, CollectionStore, InMemoryKeyValueStore, KeyValueStore,
    LoadOutcome,
};
use support::{artwork, FlakyStore, RecordingStore};

const ARTWORKS_FROM_APP: &str = r#"[
  {"id":"1714560000000","title":"Blue Nude","artist":"Matisse","gallery":"Galerie Maeght",
   "price":"$4,200","dimensions":"","medium":"Gouache","year":"1952","notes":"",
   "imageUri":"","createdAt":"2024-05-01T12:00:00.000Z","updatedAt":"2024-05-01T12:00:00.000Z",
   "listIds":["1714560100000"],"isFavorite":true},
  {"id":"1714560200000","title":"Starry Night","artist":"Van Gogh","gallery":"MoMA",
   "price":"","dimensions":"73.7 x 92.1 cm","medium":"Oil on canvas","year":"1889","notes":"",
   "imageUri":"file:///photos/2.jpg","createdAt":"2024-05-02T09:15:00.000Z",
   "updatedAt":"2024-05-02T09:15:00.000Z","listIds":[],"isFavorite":false}
]"#;

const LISTS_FROM_APP: &str = r#"[
  {"id":"1714560100000","name":"Basel","description":"June","artworkIds":["1714560000000"],
   "createdAt":"2024-05-01T12:01:40.000Z","updatedAt":"2024-05-01T12:05:00.000Z"}
]"#;

#[test]
fn hydrates_snapshots_written_by_the_mobile_app() {
    let kv = InMemoryKeyValueStore::with_entries([
        ("artworks", ARTWORKS_FROM_APP),
        ("lists", LISTS_FROM_APP),
    ]);
    let store = CollectionStore::open(kv, CatalogConfig::default()).unwrap();

    let report = store.hydration_report().unwrap();
    assert_eq!(report.artworks, LoadOutcome::Loaded(2));
    assert_eq!(report.lists, LoadOutcome::Loaded(1));
    assert!(report.is_clean());

    assert_eq!(store.get_artworks_by_filter("favorites")[0].title, "Blue Nude");
    assert_eq!(store.get_artworks_by_filter("recent")[0].title, "Starry Night");
    assert_eq!(store.artworks_in_list("1714560100000").len(), 1);
}

#[test]
fn new_items_sort_after_hydrated_ones() {
    let kv = InMemoryKeyValueStore::with_entries([("artworks", ARTWORKS_FROM_APP)]);
    let store = CollectionStore::open(kv, CatalogConfig::default()).unwrap();

    let fresh = store.add_artwork(artwork("Fresh", "Capture"));
    assert_eq!(store.get_artworks_by_filter("recent")[0].id(), fresh.id());
}

#[test]
fn missing_keys_start_empty_without_failure() {
    let store = CollectionStore::open(InMemoryKeyValueStore::new(), CatalogConfig::default())
        .unwrap();

    let report = store.hydration_report().unwrap();
    assert_eq!(report.outcome(CollectionKind::Artworks), &LoadOutcome::Missing);
    assert_eq!(report.outcome(CollectionKind::Lists), &LoadOutcome::Missing);
    assert!(report.is_clean());
    assert!(store.artworks().is_empty());
    assert!(!store.is_loading());
}

#[test]
fn corrupt_snapshot_falls_back_to_empty_for_that_collection_only() {
    let corrupt = "[{\"id\": \"1\", \"title\": ";
    let kv =
        InMemoryKeyValueStore::with_entries([("artworks", corrupt), ("lists", LISTS_FROM_APP)]);
    let store = CollectionStore::open(kv.clone(), CatalogConfig::default()).unwrap();

    let report = store.hydration_report().unwrap();
    assert!(matches!(report.artworks, LoadOutcome::Corrupt(_)));
    assert_eq!(report.lists, LoadOutcome::Loaded(1));
    assert!(store.artworks().is_empty());
    assert!(!store.is_loading());

    // the list's reference to the lost artwork is dropped
    assert!(store.lists()[0].is_empty());
    assert_eq!(report.repaired_links, 1);

    // the unreadable snapshot is left for manual recovery
    store.flush().unwrap();
    assert_eq!(kv.get("artworks").unwrap().as_deref(), Some(corrupt));
    let lists = kv.get("lists").unwrap().unwrap();
    assert!(!lists.contains("1714560000000"));
}

#[test]
fn blank_and_null_values_are_treated_as_absent() {
    let kv = InMemoryKeyValueStore::with_entries([("artworks", ""), ("lists", "null")]);
    let store = CollectionStore::open(kv, CatalogConfig::default()).unwrap();

    let report = store.hydration_report().unwrap();
    assert!(!report.artworks.is_failure());
    assert!(!report.lists.is_failure());
    assert!(store.artworks().is_empty());
    assert!(store.lists().is_empty());
}

#[test]
fn unreadable_store_still_becomes_ready() {
    let kv = FlakyStore::failing_reads(InMemoryKeyValueStore::with_entries([(
        "artworks",
        ARTWORKS_FROM_APP,
    )]));
    let store = CollectionStore::open(kv, CatalogConfig::default()).unwrap();

    let report = store.hydration_report().unwrap();
    assert!(matches!(report.artworks, LoadOutcome::Unavailable(_)));
    assert!(!store.is_loading());

    let art = store.add_artwork(artwork("Works", "Anyway"));
    assert_eq!(store.artwork(art.id()).unwrap().title, "Works");
}

#[test]
fn asymmetric_legacy_links_are_repaired_and_written_back() {
    // The artwork claims membership but the list never recorded it.
    let lists = LISTS_FROM_APP.replace(r#""artworkIds":["1714560000000"]"#, r#""artworkIds":[]"#);
    let inner = InMemoryKeyValueStore::with_entries([
        ("artworks", ARTWORKS_FROM_APP.to_string()),
        ("lists", lists),
    ]);
    let kv = Arc::new(RecordingStore::new(inner.clone()));
    let store = CollectionStore::with_shared(Arc::clone(&kv), CatalogConfig::default()).unwrap();

    let report = store.hydrate();
    assert_eq!(report.repaired_links, 1);
    assert!(store.list("1714560100000").unwrap().contains("1714560000000"));

    store.flush().unwrap();
    assert_eq!(kv.sets_for("lists"), 1);
    assert!(inner
        .get("lists")
        .unwrap()
        .unwrap()
        .contains("1714560000000"));
}

#[test]
fn hydrate_runs_once() {
    let kv = InMemoryKeyValueStore::with_entries([("artworks", ARTWORKS_FROM_APP)]);
    let store = CollectionStore::new(kv.clone(), CatalogConfig::default()).unwrap();
    let first = store.hydrate();

    kv.set("artworks", "[]").unwrap();
    let second = store.hydrate();

    assert_eq!(first, second);
    assert_eq!(store.artworks().len(), 2);
}
