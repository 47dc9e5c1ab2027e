//! Navigation behaviour of the history store.

use std::rc::Rc;

use sgrid_history::{
    ChangeOrigin, HistoryStore, MemoryNavigation, NavigationPayload, NavigationStateAdapter,
    ScopedHistory, WriteMode,
};
use sgrid_model::{ActiveFilter, FilterSet, FilterValue, GridId, QueryState};

fn grid(name: &str) -> GridId {
    GridId::new(name).expect("valid grid id")
}

fn filtered(key: &str, value: &str) -> QueryState {
    let mut fields = FilterSet::new();
    fields.insert(key.to_string(), FilterValue::from(value));
    QueryState::default().with_filter(ActiveFilter::FilterBy { fields })
}

#[test]
fn back_then_forward_restores_state() {
    let store = HistoryStore::new(MemoryNavigation::new());
    let id = grid("assets");
    let state = filtered("owner", "ops").with_page(4);

    store.set_state(&id, &state, WriteMode::Push).unwrap();
    assert!(store.back());
    assert_eq!(store.get_state(&id), QueryState::default());
    assert!(store.forward());
    assert_eq!(store.get_state(&id), state);
}

#[test]
fn replace_does_not_create_back_entries() {
    let store = HistoryStore::new(MemoryNavigation::new());
    let id = grid("sales");

    store
        .set_state(&id, &QueryState::default().with_page(2), WriteMode::Push)
        .unwrap();
    store
        .set_state(&id, &filtered("region", "eu"), WriteMode::Replace)
        .unwrap();

    assert!(store.back());
    assert_eq!(store.get_state(&id), QueryState::default());
    assert!(!store.back());
}

#[test]
fn writes_replace_only_the_target_grid() {
    let store = HistoryStore::new(MemoryNavigation::new());
    let a = grid("a");
    let b = grid("b");

    store
        .set_state(&a, &filtered("status", "open"), WriteMode::Push)
        .unwrap();
    store
        .set_state(&b, &QueryState::default().with_page(3), WriteMode::Push)
        .unwrap();

    assert_eq!(store.get_state(&a), filtered("status", "open"));
    assert_eq!(store.get_state(&b).page, 3);

    // Going back only rewinds b; a's state was carried into the later entry.
    assert!(store.back());
    assert_eq!(store.get_state(&a), filtered("status", "open"));
    assert_eq!(store.get_state(&b), QueryState::default());
}

#[test]
fn pop_state_broadcasts_for_known_grids() {
    let store = HistoryStore::new(MemoryNavigation::new());
    let id = grid("distributors");
    let other = grid("late");
    // `other` is mounted but never writes.
    let _ = store.get_state(&other);
    let mut rx = store.subscribe();

    store
        .set_state(&id, &QueryState::default().with_page(5), WriteMode::Push)
        .unwrap();
    let written = rx.try_recv().unwrap();
    assert_eq!(written.origin, ChangeOrigin::Write(WriteMode::Push));

    assert!(store.back());
    let mut restored = Vec::new();
    while let Ok(change) = rx.try_recv() {
        assert!(change.origin.is_pop_state());
        restored.push(change.grid_id.clone());
        assert_eq!(change.state, QueryState::default());
    }
    restored.sort();
    assert_eq!(restored, vec![id, other]);
}

#[test]
fn foreign_payload_entries_pass_through() {
    let mut nav = MemoryNavigation::new();
    let mut payload = NavigationPayload::new();
    payload.insert("legacy".into(), serde_json::json!({"anything": [1, 2]}));
    nav.write(payload, WriteMode::Replace).unwrap();

    let store = HistoryStore::new(nav);
    store
        .set_state(&grid("fresh"), &QueryState::default().with_page(2), WriteMode::Push)
        .unwrap();
    assert!(store.back());
    assert!(store.forward());
    assert_eq!(store.get_state(&grid("fresh")).page, 2);
}

#[test]
fn unregistered_grids_receive_no_restorations() {
    let store = HistoryStore::shared(MemoryNavigation::new());
    let kept = ScopedHistory::new(Rc::clone(&store), grid("kept"));
    let gone = ScopedHistory::new(Rc::clone(&store), grid("gone"));

    gone.set(&QueryState::default().with_page(2), WriteMode::Push)
        .unwrap();
    kept.set(&QueryState::default().with_page(3), WriteMode::Push)
        .unwrap();
    assert!(store.unregister(gone.grid_id()));
    assert!(!store.unregister(gone.grid_id()));

    let mut rx = store.subscribe();
    assert!(store.back());
    let mut restored = Vec::new();
    while let Ok(change) = rx.try_recv() {
        restored.push(change.grid_id);
    }
    assert_eq!(restored, vec![grid("kept")]);

    // The entry still carries the unmounted grid's state for a remount.
    assert_eq!(gone.get().page, 2);
}
