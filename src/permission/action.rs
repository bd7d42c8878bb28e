//! Actions: mutations a third party asks to perform on a collection.

use crate::pcd::SerializedPcd;
use serde::{Deserialize, Serialize};

pub const APPEND_TO_FOLDER_ACTION: &str = "AppendToFolder_action";
pub const REPLACE_IN_FOLDER_ACTION: &str = "ReplaceInFolder_action";
pub const DELETE_FOLDER_ACTION: &str = "DeleteFolder_action";

/// Capability family shared by an action and the permissions that grant it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    AppendToFolder,
    ReplaceInFolder,
    DeleteFolder,
}

/// A requested mutation, scoped to a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PcdAction {
    /// Insert new records into `folder`; never overwrites
    #[serde(rename = "AppendToFolder_action")]
    AppendToFolder {
        folder: String,
        pcds: Vec<SerializedPcd>,
    },
    /// Insert or overwrite records that live in `folder`
    #[serde(rename = "ReplaceInFolder_action")]
    ReplaceInFolder {
        folder: String,
        pcds: Vec<SerializedPcd>,
    },
    /// Remove the records of `folder`, and of its subfolders if `recursive`
    #[serde(rename = "DeleteFolder_action")]
    DeleteFolder {
        folder: String,
        #[serde(default)]
        recursive: bool,
    },
}

impl PcdAction {
    pub fn folder(&self) -> &str {
        match self {
            PcdAction::AppendToFolder { folder, .. }
            | PcdAction::ReplaceInFolder { folder, .. }
            | PcdAction::DeleteFolder { folder, .. } => folder,
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            PcdAction::AppendToFolder { .. } => CapabilityKind::AppendToFolder,
            PcdAction::ReplaceInFolder { .. } => CapabilityKind::ReplaceInFolder,
            PcdAction::DeleteFolder { .. } => CapabilityKind::DeleteFolder,
        }
    }

    /// Wire tag of this action
    pub fn type_name(&self) -> &'static str {
        match self {
            PcdAction::AppendToFolder { .. } => APPEND_TO_FOLDER_ACTION,
            PcdAction::ReplaceInFolder { .. } => REPLACE_IN_FOLDER_ACTION,
            PcdAction::DeleteFolder { .. } => DELETE_FOLDER_ACTION,
        }
    }
}
