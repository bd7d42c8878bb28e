//! Property-based tests for folder ancestry

use pcd_collection::folder::{
    get_all_ancestors, get_parent_folder, is_direct_descendant, is_folder_ancestor, join_path,
};
use proptest::prelude::*;

fn folder_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-c]{1,2}", 0..5).prop_map(|segments| segments.join("/"))
}

/// Ancestry is a strict partial order
#[test]
fn test_ancestry_is_strict_partial_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(folder_path(), folder_path(), folder_path()),
            |(a, b, c)| {
                prop_assert!(!is_folder_ancestor(&a, &a));

                if is_folder_ancestor(&a, &b) {
                    prop_assert!(!is_folder_ancestor(&b, &a));
                }

                if is_folder_ancestor(&a, &b) && is_folder_ancestor(&b, &c) {
                    prop_assert!(is_folder_ancestor(&a, &c));
                }

                Ok(())
            },
        )
        .unwrap();
}

/// Every listed ancestor is an ancestor, nearest first
#[test]
fn test_ancestors_agree_with_relation() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&folder_path(), |path| {
            let ancestors = get_all_ancestors(&path);
            for ancestor in &ancestors {
                prop_assert!(is_folder_ancestor(&path, ancestor));
            }
            if let Some(nearest) = ancestors.first() {
                prop_assert_eq!(nearest, &get_parent_folder(&path));
                prop_assert!(is_direct_descendant(nearest, &path));
            }
            Ok(())
        })
        .unwrap();
}

/// Joining a segment produces a direct child
#[test]
fn test_join_produces_direct_child() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(folder_path(), "[a-z]{1,4}"), |(parent, name)| {
            let child = join_path(&parent, &name);
            prop_assert!(is_direct_descendant(&parent, &child));
            prop_assert!(is_folder_ancestor(&child, &parent));
            prop_assert_eq!(get_parent_folder(&child), parent);
            Ok(())
        })
        .unwrap();
}
