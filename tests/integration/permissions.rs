//! Integration tests for folder-scoped actions and permissions

use crate::integration::test_utils::{collection_with, json_pcd, serialized_json_pcd};
use pcd_collection::permission::{match_action_to_permission, permission_covers};
use pcd_collection::{PcdAction, PcdPermission, SerializedPcd};

fn append(folder: &str, ids: &[&str]) -> PcdAction {
    PcdAction::AppendToFolder {
        folder: folder.to_string(),
        pcds: ids.iter().map(|id| serialized_json_pcd(id)).collect(),
    }
}

fn replace(folder: &str, ids: &[&str]) -> PcdAction {
    PcdAction::ReplaceInFolder {
        folder: folder.to_string(),
        pcds: ids.iter().map(|id| serialized_json_pcd(id)).collect(),
    }
}

fn ids_in(collection: &pcd_collection::PcdCollection, folder: &str) -> Vec<String> {
    collection
        .get_all_pcds_in_folder(folder)
        .iter()
        .map(|pcd| pcd.id().to_string())
        .collect()
}

#[tokio::test]
async fn test_replace_refuses_records_outside_folder() {
    let mut collection = collection_with(&[("a", "X")]);
    let permissions = [PcdPermission::ReplaceInFolder {
        folder: "Y".to_string(),
    }];

    assert!(!collection.try_exec(&replace("Y", &["a"]), &permissions).await);

    assert_eq!(ids_in(&collection, "X"), vec!["a"]);
    assert!(ids_in(&collection, "Y").is_empty());
}

#[tokio::test]
async fn test_replace_overwrites_records_in_folder() {
    let mut collection = collection_with(&[("a", "X"), ("b", "")]);
    let permissions = [PcdPermission::ReplaceInFolder {
        folder: "X".to_string(),
    }];

    assert!(collection.try_exec(&replace("X", &["a", "c"]), &permissions).await);

    assert_eq!(collection.get_all_ids(), vec!["a", "b", "c"]);
    assert_eq!(ids_in(&collection, "X"), vec!["a", "c"]);
}

#[tokio::test]
async fn test_permission_covers_descendants_only() {
    let mut collection = collection_with(&[]);
    let action = append("test/sub/folder", &["a"]);

    let broad = PcdPermission::AppendToFolder {
        folder: "test".to_string(),
    };
    let deeper = PcdPermission::AppendToFolder {
        folder: "test/sub/folder/deeper".to_string(),
    };

    assert!(!collection.try_executing_action_with_permission(&action, &deeper).await);
    assert!(collection.is_empty());

    assert!(collection.try_executing_action_with_permission(&action, &broad).await);
    assert_eq!(collection.get_folder_of_pcd("a"), Some("test/sub/folder"));
}

#[tokio::test]
async fn test_append_never_overwrites() {
    let mut collection = collection_with(&[("a", "inbox")]);
    let permissions = [PcdPermission::AppendToFolder {
        folder: "inbox".to_string(),
    }];

    assert!(collection.try_exec(&append("inbox", &["b"]), &permissions).await);
    assert!(!collection.try_exec(&append("inbox", &["b"]), &permissions).await);
    assert!(!collection.try_exec(&append("inbox", &["c", "a"]), &permissions).await);
    assert!(!collection.try_exec(&append("inbox", &["d", "d"]), &permissions).await);

    assert_eq!(collection.get_all_ids(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_append_with_undeserializable_record_is_rejected() {
    let mut collection = collection_with(&[]);
    let action = PcdAction::AppendToFolder {
        folder: "inbox".to_string(),
        pcds: vec![
            serialized_json_pcd("a"),
            SerializedPcd::new("no-such-package", "{}"),
        ],
    };
    let permissions = [PcdPermission::AppendToFolder {
        folder: "inbox".to_string(),
    }];

    assert!(!collection.try_exec(&action, &permissions).await);
    assert!(collection.is_empty());
}

#[tokio::test]
async fn test_delete_folder_recursive_and_flat() {
    let mut collection = collection_with(&[("a", "test"), ("b", "test/subfolder"), ("c", "other")]);
    let permissions = [PcdPermission::DeleteFolder {
        folder: "test".to_string(),
    }];

    let flat = PcdAction::DeleteFolder {
        folder: "test".to_string(),
        recursive: false,
    };
    assert!(collection.try_exec(&flat, &permissions).await);
    assert_eq!(collection.get_all_ids(), vec!["b", "c"]);

    let recursive = PcdAction::DeleteFolder {
        folder: "test".to_string(),
        recursive: true,
    };
    assert!(collection.try_exec(&recursive, &permissions).await);
    assert_eq!(collection.get_all_ids(), vec!["c"]);
}

#[tokio::test]
async fn test_wrong_capability_family_is_denied() {
    let mut collection = collection_with(&[("a", "test")]);
    let permissions = [
        PcdPermission::AppendToFolder {
            folder: "test".to_string(),
        },
        PcdPermission::ReplaceInFolder {
            folder: "test".to_string(),
        },
    ];
    let delete = PcdAction::DeleteFolder {
        folder: "test".to_string(),
        recursive: true,
    };

    assert!(match_action_to_permission(&delete, &permissions).is_none());
    assert!(!collection.try_exec(&delete, &permissions).await);
    assert_eq!(collection.size(), 1);
}

#[tokio::test]
async fn test_actions_and_permissions_from_wire() {
    let mut collection = collection_with(&[]);
    let payload = serde_json::to_string(json_pcd("a").as_typed().unwrap()).unwrap();
    let action: PcdAction = serde_json::from_value(serde_json::json!({
        "type": "AppendToFolder_action",
        "folder": "shared/events",
        "pcds": [{ "type": "json-pcd", "pcd": payload }],
    }))
    .unwrap();
    let permission: PcdPermission = serde_json::from_str(
        r#"{"type":"AppendToFolder_permission","folder":"shared"}"#,
    )
    .unwrap();

    assert!(permission_covers(&action, &permission));
    assert!(collection.try_exec(&action, &[permission]).await);
    assert_eq!(collection.get_folder_of_pcd("a"), Some("shared/events"));
}
