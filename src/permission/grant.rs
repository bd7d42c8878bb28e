//! Permissions: folder-scoped capabilities granted to a third party.

use crate::permission::action::CapabilityKind;
use serde::{Deserialize, Serialize};

pub const APPEND_TO_FOLDER_PERMISSION: &str = "AppendToFolder_permission";
pub const REPLACE_IN_FOLDER_PERMISSION: &str = "ReplaceInFolder_permission";
pub const DELETE_FOLDER_PERMISSION: &str = "DeleteFolder_permission";

/// A granted capability, covering `folder` and everything below it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PcdPermission {
    #[serde(rename = "AppendToFolder_permission")]
    AppendToFolder { folder: String },
    #[serde(rename = "ReplaceInFolder_permission")]
    ReplaceInFolder { folder: String },
    #[serde(rename = "DeleteFolder_permission")]
    DeleteFolder { folder: String },
}

impl PcdPermission {
    pub fn folder(&self) -> &str {
        match self {
            PcdPermission::AppendToFolder { folder }
            | PcdPermission::ReplaceInFolder { folder }
            | PcdPermission::DeleteFolder { folder } => folder,
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            PcdPermission::AppendToFolder { .. } => CapabilityKind::AppendToFolder,
            PcdPermission::ReplaceInFolder { .. } => CapabilityKind::ReplaceInFolder,
            PcdPermission::DeleteFolder { .. } => CapabilityKind::DeleteFolder,
        }
    }

    /// Wire tag of this permission
    pub fn type_name(&self) -> &'static str {
        match self {
            PcdPermission::AppendToFolder { .. } => APPEND_TO_FOLDER_PERMISSION,
            PcdPermission::ReplaceInFolder { .. } => REPLACE_IN_FOLDER_PERMISSION,
            PcdPermission::DeleteFolder { .. } => DELETE_FOLDER_PERMISSION,
        }
    }
}
