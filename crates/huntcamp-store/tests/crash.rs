//! Crash-consistency tests for multi-collection commits.
//!
//! A crash is simulated by writing the journal and then stopping before the
//! collection files are replaced, or after only some of them were.

use huntcamp_store::{
    CampStore, Collection, Counters, Hunter, Journal, PendingWrite, Stand, StoreLayout,
};
use std::fs;

fn alex(current_stand: Option<u32>) -> Hunter {
    Hunter {
        id: 1,
        name: "Alex".to_owned(),
        pin: "1234".to_owned(),
        is_admin: false,
        current_stand,
    }
}

fn seeded_store(dir: &std::path::Path) -> CampStore {
    let store = CampStore::new(StoreLayout::new(dir));
    store.initialize().unwrap();
    store.save(&[Stand::new(10, "North Ridge")]).unwrap();
    store.save(&[alex(None)]).unwrap();
    store
}

fn occupied_writes() -> Vec<PendingWrite> {
    let mut stand = Stand::new(10, "North Ridge");
    stand.occupy("Alex", "2025-11-02T05:41:07.123Z");
    vec![
        PendingWrite {
            file: Collection::Stands.file_name().to_owned(),
            content: serde_json::to_string_pretty(&vec![stand]).unwrap(),
        },
        PendingWrite {
            file: Collection::Hunters.file_name().to_owned(),
            content: serde_json::to_string_pretty(&vec![alex(Some(10))]).unwrap(),
        },
    ]
}

#[test]
fn crash_before_any_collection_write_is_rolled_forward() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());

    let journal = Journal::new(store.layout());
    journal.begin(&occupied_writes()).unwrap();
    drop(store);

    let reopened = CampStore::new(StoreLayout::new(dir.path()));
    assert_eq!(reopened.initialize().unwrap(), 2);

    let stands = reopened.load::<Stand>().unwrap();
    let hunters = reopened.load::<Hunter>().unwrap();
    assert!(stands[0].occupied);
    assert_eq!(stands[0].hunter.as_deref(), Some("Alex"));
    assert_eq!(hunters[0].current_stand, Some(10));
}

#[test]
fn crash_between_collection_writes_is_rolled_forward() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());

    let writes = occupied_writes();
    let journal = Journal::new(store.layout());
    journal.begin(&writes).unwrap();
    // stands written, hunters not
    journal.apply(&writes[..1]).unwrap();

    let stands = store.load::<Stand>().unwrap();
    let hunters = store.load::<Hunter>().unwrap();
    assert!(stands[0].occupied);
    assert_eq!(hunters[0].current_stand, None, "simulated crash state");
    drop(store);

    let reopened = CampStore::new(StoreLayout::new(dir.path()));
    reopened.initialize().unwrap();
    let hunters = reopened.load::<Hunter>().unwrap();
    assert_eq!(hunters[0].current_stand, Some(10));
    assert!(!reopened.layout().journal_file().exists());
}

#[test]
fn torn_journal_leaves_collections_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path());
    let before = fs::read_to_string(store.layout().collection_path(Collection::Stands)).unwrap();

    fs::write(store.layout().journal_file(), "{\"created_at\":\"2025").unwrap();
    drop(store);

    let reopened = CampStore::new(StoreLayout::new(dir.path()));
    assert_eq!(reopened.initialize().unwrap(), 0);
    let after =
        fs::read_to_string(reopened.layout().collection_path(Collection::Stands)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn counters_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = seeded_store(dir.path());
        let mut counters: Counters = store.load_counters().unwrap();
        counters.allocate_hunter();
        counters.allocate_hunter();
        store.save_counters(&counters).unwrap();
    }
    let reopened = CampStore::new(StoreLayout::new(dir.path()));
    reopened.initialize().unwrap();
    assert_eq!(reopened.load_counters().unwrap().next_hunter_id, 3);
}
