//! Column layouts persisted through the file store.

use std::rc::Rc;

use sgrid_model::GridId;
use sgrid_persistence::{ColumnPrefs, FileStore, StoredLayout};

fn grid(name: &str) -> GridId {
    GridId::new(name).expect("valid grid id")
}

#[test]
fn layouts_are_partitioned_by_grid() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("storage.json");

    {
        let prefs = ColumnPrefs::new(Rc::new(FileStore::open(&path)));
        prefs.save(&grid("G1"), &[0, 2, 3]).expect("save G1");
        prefs.save(&grid("G2"), &[1]).expect("save G2");
        prefs.save(&grid("G2"), &[1, 4]).expect("save G2 again");
    }

    let prefs = ColumnPrefs::new(Rc::new(FileStore::open(&path)));
    assert_eq!(prefs.load(&grid("G1")), StoredLayout::Visible(vec![0, 2, 3]));
    assert_eq!(prefs.load(&grid("G2")), StoredLayout::Visible(vec![1, 4]));
    assert_eq!(prefs.load(&grid("G3")), StoredLayout::Missing);
}

#[test]
fn storage_file_is_plain_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("storage.json");

    let prefs = ColumnPrefs::new(Rc::new(FileStore::open(&path)));
    prefs.save(&grid("assets"), &[5]).expect("save");

    let content = std::fs::read_to_string(&path).expect("read storage");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(parsed["assets"], "[5]");
}
