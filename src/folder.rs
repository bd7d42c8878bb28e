//! Folder path algebra
//!
//! Folders are plain `/`-separated strings. A folder has no existence of its
//! own: it exists only as the assigned folder of some pcd (or as a prefix of
//! one). All functions here are pure and never touch the collection.

use std::collections::BTreeSet;

/// Path separator used by folder paths.
pub const FOLDER_SEPARATOR: char = '/';

/// Split a folder path into its non-empty segments.
///
/// Repeated, leading and trailing separators are collapsed, so `"/"`,
/// `"//////"` and `""` all denote the root (empty segment list).
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(FOLDER_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Normalize a folder path string (without consulting any collection).
///
/// The root normalizes to `""`.
pub fn normalize_path(path: &str) -> String {
    split_path(path).join("/")
}

pub fn is_root_folder(path: &str) -> bool {
    split_path(path).is_empty()
}

/// Returns true iff `candidate` lies strictly below `ancestor`, at any depth.
///
/// Equal paths are not ancestors of each other, and neither are siblings.
pub fn is_folder_ancestor(candidate: &str, ancestor: &str) -> bool {
    let candidate_parts = split_path(candidate);
    let ancestor_parts = split_path(ancestor);

    candidate_parts.len() > ancestor_parts.len()
        && candidate_parts[..ancestor_parts.len()] == ancestor_parts[..]
}

/// Returns true iff `child` is exactly one level below `parent`.
pub fn is_direct_descendant(parent: &str, child: &str) -> bool {
    split_path(child).len() == split_path(parent).len() + 1 && is_folder_ancestor(child, parent)
}

/// All ancestors of `path`, nearest first, ending with the root (`""`).
///
/// The root itself has no ancestors.
pub fn get_all_ancestors(path: &str) -> Vec<String> {
    let parts = split_path(path);
    (0..parts.len()).rev().map(|depth| parts[..depth].join("/")).collect()
}

/// Parent folder of `path`; the parent of the root is the root.
pub fn get_parent_folder(path: &str) -> String {
    let parts = split_path(path);
    match parts.split_last() {
        Some((_, rest)) => rest.join("/"),
        None => String::new(),
    }
}

/// Last segment of `path`, or `""` for the root.
pub fn get_name_from_path(path: &str) -> &str {
    split_path(path).last().copied().unwrap_or("")
}

pub fn join_path(parent: &str, name: &str) -> String {
    let mut parts = split_path(parent);
    parts.extend(split_path(name));
    parts.join("/")
}

/// Direct child folders of `parent` implied by a set of assigned folders.
///
/// Intermediate folders count: an assignment to `a/b/c` implies that `a/b`
/// is a child of `a`. The result is normalized, deduplicated and sorted.
pub fn get_folders_in_folder<'a, I>(parent: &str, all_folders: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let depth = split_path(parent).len();
    let children: BTreeSet<String> = all_folders
        .into_iter()
        .filter(|folder| is_folder_ancestor(folder, parent))
        .map(|folder| split_path(folder)[..=depth].join("/"))
        .collect();

    children.into_iter().collect()
}
