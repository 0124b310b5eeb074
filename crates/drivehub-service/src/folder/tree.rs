//! Iterative traversals over the folder hierarchy.
//!
//! Every walk uses an explicit worklist and a visited set, so a corrupted
//! parent chain surfaces as `CycleDetected` instead of unbounded work.

use std::collections::HashSet;

use sqlx::SqliteConnection;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::BlobRef;
use drivehub_database::repositories::{
    FileRepository, FolderRepository, ShareRepository, UserRepository,
};
use drivehub_entity::file::File;
use drivehub_entity::folder::Folder;
use drivehub_entity::permission::ResourceRef;

/// Everything below (and including) a folder.
#[derive(Debug, Clone, Default)]
pub struct Subtree {
    /// Folder IDs in discovery order, root first.
    pub folder_ids: Vec<Uuid>,
    /// Every file inside the subtree.
    pub files: Vec<File>,
}

/// Outcome of removing a set of folders and files.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    /// Folders removed.
    pub folders: usize,
    /// Files removed.
    pub files: usize,
    /// Shares removed.
    pub shares: u64,
    /// Bytes freed.
    pub bytes: i64,
    /// Blob references to release after commit.
    pub blob_refs: Vec<BlobRef>,
}

/// Walks and edits folder trees.
#[derive(Debug, Clone, Copy)]
pub struct FolderTree {
    folders: FolderRepository,
    files: FileRepository,
    shares: ShareRepository,
    users: UserRepository,
    max_depth: usize,
}

impl FolderTree {
    /// Creates a tree walker bounded to `max_depth` levels.
    pub fn new(max_depth: usize) -> Self {
        Self {
            folders: FolderRepository::new(),
            files: FileRepository::new(),
            shares: ShareRepository::new(),
            users: UserRepository::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Chain of folders from the root down to `folder`, inclusive.
    pub async fn path_to(&self, conn: &mut SqliteConnection, folder: Folder) -> AppResult<Vec<Folder>> {
        let mut visited = HashSet::from([folder.id]);
        let mut next = folder.parent_id;
        let mut chain = vec![folder];

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                return Err(AppError::cycle_detected(format!(
                    "Folder {parent_id} appears twice in its own ancestry"
                )));
            }
            if chain.len() >= self.max_depth {
                return Err(AppError::cycle_detected(format!(
                    "Folder ancestry exceeds the maximum depth of {}",
                    self.max_depth
                )));
            }
            let parent = self
                .folders
                .find_by_id(conn, parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
            next = parent.parent_id;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Whether `candidate` is `folder_id` itself or one of its descendants.
    ///
    /// Walks up from the candidate rather than down from the folder, which
    /// touches only one chain.
    pub async fn is_self_or_descendant(
        &self,
        conn: &mut SqliteConnection,
        folder_id: Uuid,
        candidate: Uuid,
    ) -> AppResult<bool> {
        let mut visited = HashSet::new();
        let mut current = Some(candidate);

        while let Some(id) = current {
            if id == folder_id {
                return Ok(true);
            }
            if !visited.insert(id) || visited.len() > self.max_depth {
                return Err(AppError::cycle_detected(
                    "Folder ancestry is cyclic or too deep",
                ));
            }
            current = match self.folders.find_by_id(conn, id).await? {
                Some(folder) => folder.parent_id,
                None => None,
            };
        }
        Ok(false)
    }

    /// Collect every folder and file below `root_id`.
    pub async fn collect(&self, conn: &mut SqliteConnection, root_id: Uuid) -> AppResult<Subtree> {
        let mut subtree = Subtree::default();
        let mut visited = HashSet::new();
        let mut stack = vec![root_id];

        while let Some(folder_id) = stack.pop() {
            if !visited.insert(folder_id) {
                return Err(AppError::cycle_detected(format!(
                    "Folder {folder_id} is reachable twice below {root_id}"
                )));
            }
            subtree.folder_ids.push(folder_id);
            subtree
                .files
                .extend(self.files.find_children(conn, folder_id).await?);
            stack.extend(self.folders.find_child_ids(conn, folder_id).await?);
        }

        Ok(subtree)
    }

    /// Delete the given folders and files together with every share on
    /// them, and return the freed bytes to each file owner's quota.
    ///
    /// Must run inside a write transaction; the caller commits.
    pub async fn purge(
        &self,
        conn: &mut SqliteConnection,
        folder_ids: &[Uuid],
        files: &[File],
    ) -> AppResult<PurgeReport> {
        let mut report = PurgeReport::default();
        let mut freed_by_owner: Vec<(Uuid, i64)> = Vec::new();

        for file in files {
            report.shares += self
                .shares
                .delete_for_resource(conn, ResourceRef::file(file.id))
                .await?;
            if let Some(deleted) = self.files.delete(conn, file.id).await? {
                report.files += 1;
                report.bytes += deleted.size_bytes;
                match freed_by_owner.iter_mut().find(|(o, _)| *o == deleted.owner_id) {
                    Some((_, bytes)) => *bytes += deleted.size_bytes,
                    None => freed_by_owner.push((deleted.owner_id, deleted.size_bytes)),
                }
                report.blob_refs.push(deleted.blob_ref);
            }
        }

        // Children before parents.
        for folder_id in folder_ids.iter().rev() {
            report.shares += self
                .shares
                .delete_for_resource(conn, ResourceRef::folder(*folder_id))
                .await?;
            if self.folders.delete(conn, *folder_id).await? {
                report.folders += 1;
            }
        }

        for (owner_id, bytes) in freed_by_owner {
            self.users.release_storage(conn, owner_id, bytes).await?;
        }

        Ok(report)
    }
}
