//! Tests for favourites synchronisation.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{InMemoryKeyValueStore, MockKeyValueStore};
use crate::domain::{SettlementPolicy, StateStore};
use rstest::{fixture, rstest};

fn make_sync<S: KeyValueStore>(storage: Arc<S>) -> (Arc<StateStore>, FavouritesSync<S>) {
    let store = Arc::new(StateStore::default());
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&store),
        SettlementPolicy::default(),
    ));
    (store, FavouritesSync::new(coordinator, storage))
}

fn entry(id: u64) -> Destination {
    Destination {
        price: id * 100,
        rating: 4.5,
        ..Destination::new(EntryId::new(id), format!("Explore {id}"))
    }
}

fn persisted(storage: &InMemoryKeyValueStore) -> Vec<Destination> {
    let raw = storage
        .peek(StorageKey::Favourites)
        .expect("favourites persisted");
    serde_json::from_str(&raw).expect("persisted favourites parse")
}

#[fixture]
fn storage() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::new())
}

#[rstest]
#[tokio::test]
async fn toggle_on_empty_list_persists_the_single_entry(storage: Arc<InMemoryKeyValueStore>) {
    let (store, sync) = make_sync(Arc::clone(&storage));

    let outcome = sync.toggle(entry(5)).await;

    assert!(outcome.changed);
    assert!(outcome.is_persisted());
    assert_eq!(store.snapshot().favourites.items(), [entry(5)]);
    let raw = storage.peek(StorageKey::Favourites).expect("written");
    assert!(raw.starts_with(r#"[{"id":5,"#));
    assert_eq!(raw, serde_json::to_string(&vec![entry(5)]).expect("encode"));

    sync.toggle(entry(5)).await;

    assert!(store.snapshot().favourites.items().is_empty());
    assert_eq!(storage.peek(StorageKey::Favourites).as_deref(), Some("[]"));
}

#[rstest]
#[tokio::test]
async fn every_mutation_leaves_storage_equal_to_the_slice(storage: Arc<InMemoryKeyValueStore>) {
    let (store, sync) = make_sync(Arc::clone(&storage));

    sync.set_all(vec![entry(1), entry(2)]).await;
    assert_eq!(persisted(&storage), store.snapshot().favourites.items());
    sync.add(entry(3)).await;
    assert_eq!(persisted(&storage), store.snapshot().favourites.items());
    sync.remove(EntryId::new(1)).await;
    assert_eq!(persisted(&storage), store.snapshot().favourites.items());
    sync.toggle(entry(2)).await;
    assert_eq!(persisted(&storage), store.snapshot().favourites.items());
    assert_eq!(store.snapshot().favourites.ids(), vec![EntryId::new(3)]);
}

#[rstest]
#[tokio::test]
async fn no_op_mutations_still_write_the_list(storage: Arc<InMemoryKeyValueStore>) {
    let (_, sync) = make_sync(Arc::clone(&storage));
    sync.add(entry(1)).await;
    let writes = storage.write_count();

    let duplicate = sync.add(entry(1)).await;
    let missing = sync.remove(EntryId::new(42)).await;

    assert!(!duplicate.changed);
    assert!(!missing.changed);
    assert_eq!(storage.write_count(), writes + 2);
    assert_eq!(persisted(&storage), vec![entry(1)]);
}

#[rstest]
#[tokio::test]
async fn overlapping_toggles_persist_the_final_slice(storage: Arc<InMemoryKeyValueStore>) {
    let (store, sync) = make_sync(Arc::clone(&storage));
    let sync = Arc::new(sync);

    let handles: Vec<_> = (1..=6)
        .map(|id| {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.toggle(entry(id % 3)).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.expect("toggle task").is_persisted());
    }

    assert_eq!(persisted(&storage), store.snapshot().favourites.items());
}

#[tokio::test]
async fn write_failure_is_reported_without_rollback() {
    let mut storage = MockKeyValueStore::new();
    storage
        .expect_set_item()
        .withf(|key, value| *key == StorageKey::Favourites && value.is_some())
        .times(1)
        .returning(|_, _| Err(StorageError::unavailable("disk full")));
    let (store, sync) = make_sync(Arc::new(storage));

    let outcome = sync.add(entry(8)).await;

    assert!(outcome.changed);
    assert_eq!(
        outcome.persisted,
        Err(StorageError::unavailable("disk full"))
    );
    assert!(store.snapshot().favourites.contains(EntryId::new(8)));
    assert!(sync.is_favourite(EntryId::new(8)));
}

#[rstest]
#[tokio::test]
async fn load_restores_the_stored_list() {
    let encoded = serde_json::to_string(&vec![entry(4), entry(9)]).expect("encode");
    let storage = Arc::new(InMemoryKeyValueStore::new().with_item(StorageKey::Favourites, encoded));
    let (store, sync) = make_sync(storage);

    let loaded = sync.load().await.expect("load");

    assert_eq!(loaded, FavouritesLoad::Restored(vec![entry(4), entry(9)]));
    let favourites = store.snapshot().favourites;
    assert_eq!(favourites.ids(), vec![EntryId::new(4), EntryId::new(9)]);
    assert!(!favourites.is_loading());
}

#[rstest]
#[tokio::test]
async fn load_of_missing_value_empties_the_slice(storage: Arc<InMemoryKeyValueStore>) {
    let (store, sync) = make_sync(storage);
    store.dispatch(FavouritesEvent::Add(entry(1)));

    assert_eq!(sync.load().await.expect("load"), FavouritesLoad::Empty);
    assert!(store.snapshot().favourites.items().is_empty());
}

#[rstest]
#[tokio::test]
async fn malformed_value_is_replaced_with_an_empty_list() {
    let storage = Arc::new(
        InMemoryKeyValueStore::new().with_item(StorageKey::Favourites, "[{\"id\":"),
    );
    let (store, sync) = make_sync(Arc::clone(&storage));

    let loaded = sync.load().await.expect("recovered load");

    assert!(matches!(loaded, FavouritesLoad::Recovered { .. }));
    assert!(store.snapshot().favourites.items().is_empty());
    assert_eq!(storage.peek(StorageKey::Favourites).as_deref(), Some("[]"));
}

#[rstest]
#[tokio::test]
async fn read_failure_rejects_the_load_and_keeps_the_slice(storage: Arc<InMemoryKeyValueStore>) {
    let (store, sync) = make_sync(Arc::clone(&storage));
    sync.add(entry(2)).await;
    storage.fail_reads(true);

    let err = sync.load().await.expect_err("read fails");

    assert!(err.message().starts_with("Unable to load favourites"));
    let favourites = store.snapshot().favourites;
    assert_eq!(favourites.ids(), vec![EntryId::new(2)]);
    assert!(!favourites.is_loading());
}
