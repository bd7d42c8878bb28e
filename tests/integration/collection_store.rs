//! Integration tests for the record store and its folder index

use crate::integration::test_utils::{collection_with, full_registry, json_pcd};
use pcd_collection::{AddOptions, CollectionError, PcdCollection};

#[test]
fn test_duplicate_add_without_upsert_fails() {
    let mut collection = PcdCollection::new(full_registry());
    collection.add(json_pcd("a"), AddOptions::default()).unwrap();

    let err = collection
        .add(json_pcd("a"), AddOptions::default())
        .unwrap_err();
    assert!(matches!(err, CollectionError::DuplicateId(id) if id == "a"));
    assert_eq!(collection.size(), 1);
}

#[test]
fn test_upsert_replaces_in_place() {
    let mut collection = collection_with(&[("a", ""), ("b", "docs"), ("c", "")]);

    collection.add(json_pcd("b"), AddOptions::upsert()).unwrap();

    assert_eq!(collection.get_all_ids(), vec!["a", "b", "c"]);
    assert_eq!(collection.get_folder_of_pcd("b"), Some("docs"));
}

#[test]
fn test_failed_batch_leaves_store_untouched() {
    let mut collection = collection_with(&[("a", "")]);

    let result = collection.add_all(
        vec![json_pcd("b"), json_pcd("a"), json_pcd("c")],
        AddOptions::default(),
    );

    assert!(result.is_err());
    assert_eq!(collection.get_all_ids(), vec!["a"]);
}

#[test]
fn test_folder_queries() {
    let collection = collection_with(&[
        ("a", "photos"),
        ("b", "photos/2024"),
        ("c", "photos/2024/summer"),
        ("d", "tickets"),
        ("e", ""),
    ]);

    assert_eq!(collection.get_folders_in_folder(""), vec!["photos", "tickets"]);
    assert_eq!(collection.get_folders_in_folder("photos"), vec!["photos/2024"]);
    assert!(collection.is_valid_folder("photos/2024"));
    assert!(!collection.is_valid_folder("music"));

    let in_photos: Vec<&str> = collection
        .get_all_pcds_in_folder("photos")
        .iter()
        .map(|pcd| pcd.id())
        .collect();
    assert_eq!(in_photos, vec!["a"]);

    let at_root: Vec<&str> = collection
        .get_all_pcds_in_folder("")
        .iter()
        .map(|pcd| pcd.id())
        .collect();
    assert_eq!(at_root, vec!["e"]);
}

#[test]
fn test_remove_drops_folder_assignment() {
    let mut collection = collection_with(&[("a", "photos"), ("b", "photos")]);

    assert!(collection.remove("a"));
    assert!(!collection.remove("a"));

    assert_eq!(collection.get_folder_of_pcd("a"), None);
    assert_eq!(collection.get_all_pcds_in_folder("photos").len(), 1);
}

#[test]
fn test_set_folder_for_unknown_id_fails() {
    let mut collection = collection_with(&[("a", "")]);

    let err = collection.set_pcd_folder("ghost", "photos").unwrap_err();
    assert!(matches!(err, CollectionError::RecordNotFound(_)));

    let err = collection.bulk_set_folder(&["a", "ghost"], "photos").unwrap_err();
    assert!(matches!(err, CollectionError::RecordNotFound(_)));
    assert_eq!(collection.get_folder_of_pcd("a"), None);
}

#[test]
fn test_replace_pcds_in_folder() {
    let mut collection = collection_with(&[("a", "tickets"), ("b", "tickets"), ("c", "photos")]);

    collection.replace_pcds_in_folder("tickets", vec![json_pcd("d")]);

    assert_eq!(collection.get_all_ids(), vec!["c", "d"]);
    assert_eq!(collection.get_folder_of_pcd("d"), Some("tickets"));
}

#[tokio::test]
async fn test_verify_dispatches_to_package() {
    let collection = collection_with(&[("a", "")]);
    let pcd = collection.get_by_id("a").unwrap();

    assert!(collection.verify(pcd).await.unwrap());
}
