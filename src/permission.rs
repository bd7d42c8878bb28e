//! Permission Engine
//!
//! Untrusted callers mutate a collection only by presenting an action along
//! with the permissions they were granted. A permission covers its own folder
//! and every folder below it, never a folder above it. Denials are reported
//! as `false`, not as errors, and a rejected action leaves the collection
//! exactly as it was.

pub mod action;
pub mod grant;

pub use action::{CapabilityKind, PcdAction};
pub use grant::PcdPermission;

use crate::collection::{in_folder, DeserializeOptions, PcdCollection};
use crate::error::CollectionError;
use crate::folder::is_folder_ancestor;
use crate::pcd::{Pcd, SerializedPcd};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Whether `permission` authorizes `action`
///
/// Requires the same capability family, and an action folder equal to or
/// below the permission folder.
pub fn permission_covers(action: &PcdAction, permission: &PcdPermission) -> bool {
    action.kind() == permission.kind()
        && (action.folder() == permission.folder()
            || is_folder_ancestor(action.folder(), permission.folder()))
}

/// First permission, in order, that authorizes `action`
pub fn match_action_to_permission<'a>(
    action: &PcdAction,
    permissions: &'a [PcdPermission],
) -> Option<&'a PcdPermission> {
    permissions
        .iter()
        .find(|permission| permission_covers(action, permission))
}

impl PcdCollection {
    /// Apply `action` if one of `permissions` authorizes it
    ///
    /// Only the first authorizing permission is tried.
    pub async fn try_exec(&mut self, action: &PcdAction, permissions: &[PcdPermission]) -> bool {
        match match_action_to_permission(action, permissions) {
            Some(permission) => {
                self.try_executing_action_with_permission(action, permission)
                    .await
            }
            None => {
                debug!(
                    action = action.type_name(),
                    folder = %action.folder(),
                    offered = permissions.len(),
                    "No permission authorizes action"
                );
                false
            }
        }
    }

    /// Apply `action` if `permission` authorizes it
    ///
    /// Returns `false` when unauthorized and when the action itself is
    /// rejected (undeserializable records, id collisions); never errors.
    #[instrument(skip_all, fields(action = action.type_name(), folder = %action.folder()))]
    pub async fn try_executing_action_with_permission(
        &mut self,
        action: &PcdAction,
        permission: &PcdPermission,
    ) -> bool {
        if !permission_covers(action, permission) {
            debug!(
                permission = permission.type_name(),
                permission_folder = %permission.folder(),
                "Permission does not cover action"
            );
            return false;
        }

        match self.execute_action(action).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Authorized action rejected");
                false
            }
        }
    }

    async fn execute_action(&mut self, action: &PcdAction) -> Result<(), CollectionError> {
        match action {
            PcdAction::AppendToFolder { folder, pcds } => self.append_to_folder(folder, pcds).await,
            PcdAction::ReplaceInFolder { folder, pcds } => {
                self.replace_in_folder(folder, pcds).await
            }
            PcdAction::DeleteFolder { folder, recursive } => {
                self.delete_folder(folder, *recursive);
                Ok(())
            }
        }
    }

    /// Insert-only: any id already present anywhere rejects the whole batch
    async fn append_to_folder(
        &mut self,
        folder: &str,
        serialized: &[SerializedPcd],
    ) -> Result<(), CollectionError> {
        let pcds = self
            .deserialize_all(serialized, &DeserializeOptions::default())
            .await?;

        {
            let mut batch_ids = HashSet::with_capacity(pcds.len());
            for pcd in &pcds {
                if self.has_pcd_with_id(pcd.id()) || !batch_ids.insert(pcd.id()) {
                    return Err(CollectionError::DuplicateId(pcd.id().to_string()));
                }
            }
        }

        self.place_in_folder(pcds, folder);
        Ok(())
    }

    /// Overwrites are allowed only for records already in `folder`
    async fn replace_in_folder(
        &mut self,
        folder: &str,
        serialized: &[SerializedPcd],
    ) -> Result<(), CollectionError> {
        let pcds = self
            .deserialize_all(serialized, &DeserializeOptions::default())
            .await?;

        for pcd in &pcds {
            if self.has_pcd_with_id(pcd.id())
                && !in_folder(self.get_folder_of_pcd(pcd.id()), folder)
            {
                return Err(CollectionError::OutsideFolder {
                    id: pcd.id().to_string(),
                    folder: folder.to_string(),
                });
            }
        }

        self.place_in_folder(pcds, folder);
        Ok(())
    }

    fn place_in_folder(&mut self, pcds: Vec<Pcd>, folder: &str) {
        let ids: Vec<String> = pcds.iter().map(|pcd| pcd.id().to_string()).collect();
        let mut changed = self.upsert_all(pcds);
        for id in &ids {
            changed |= self.assign_folder(id, folder);
        }

        debug!(count = ids.len(), changed, "Placed pcds in folder");
        if changed {
            self.emit_change();
        }
    }

    /// Remove the records of `folder`, plus every subfolder's if `recursive`
    fn delete_folder(&mut self, folder: &str, recursive: bool) {
        let removed = self.remove_where(|_, assigned| match assigned {
            Some(assigned) if recursive => {
                assigned == folder || is_folder_ancestor(assigned, folder)
            }
            _ => in_folder(assigned, folder),
        });

        debug!(removed, recursive, "Deleted folder");
        if removed > 0 {
            self.emit_change();
        }
    }
}
