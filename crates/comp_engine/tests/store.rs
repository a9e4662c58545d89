use std::fs;

use comp_core::{ArrangedUnit, BoardPosition, BoardSize, CompositionRecord, Tier};
use comp_engine::{CompositionStore, MemoryStore, RonFileStore, StoreError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn record(name: &str) -> CompositionRecord {
    CompositionRecord {
        name: name.to_string(),
        tier: Tier::A,
        plan: Some("Slow roll 6".to_string()),
        difficulty: None,
        meta_description: None,
        board: BoardSize::default(),
        units: vec![ArrangedUnit {
            id: "TFT13_Vi".to_string(),
            name: "Vi".to_string(),
            position: BoardPosition::new(0, 1),
            items: vec!["TFT_Item_SteraksGage".to_string()],
            stars: 2,
        }],
        augments: vec!["TFT6_Augment_PortableForge".to_string()],
        core_champion: Some("TFT13_Vi".to_string()),
        source_url: format!("https://guide.example/comps/{}", name.to_lowercase()),
        crawled_utc: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn ron_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("compositions.ron");

    let store = RonFileStore::new(&path);
    assert!(store.list_names().await.unwrap().is_empty());
    store.create(record("Rebels")).await.unwrap();
    store.create(record("Snipers")).await.unwrap();
    assert!(store.exists_by_name("Rebels").await.unwrap());
    assert!(!store.exists_by_name("rebels").await.unwrap());

    let reopened = RonFileStore::new(&path);
    assert_eq!(reopened.list_names().await.unwrap(), vec!["Rebels", "Snipers"]);

    assert_eq!(reopened.delete_by_name("Rebels").await.unwrap(), 1);
    assert_eq!(reopened.delete_by_name("Rebels").await.unwrap(), 0);
    assert_eq!(store.list_names().await.unwrap(), vec!["Snipers"]);
}

#[tokio::test]
async fn ron_store_round_trips_full_records() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compositions.ron");
    let store = RonFileStore::new(&path);
    store.create(record("Rebels")).await.unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("TFT_Item_SteraksGage"));
    assert!(text.contains("compositions"));
}

#[tokio::test]
async fn corrupt_store_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compositions.ron");
    fs::write(&path, "this is not ron (").unwrap();

    let err = RonFileStore::new(&path).list_names().await.unwrap_err();
    assert!(matches!(err, StoreError::Deserialize { .. }));
}

#[tokio::test]
async fn memory_store_deletes_every_match() {
    let store = MemoryStore::with_records(vec![record("Rebels"), record("Rebels"), record("Snipers")]);
    assert_eq!(store.delete_by_name("Rebels").await.unwrap(), 2);
    assert_eq!(store.list_names().await.unwrap(), vec!["Snipers"]);
}
