//! Case-insensitive name search with deterministic paging.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use drivehub_auth::acl::AccessResolver;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::types::{PageMeta, PageRequest};
use drivehub_database::DatabasePool;
use drivehub_database::repositories::{FileRepository, FolderRepository};
use drivehub_entity::file::File;
use drivehub_entity::folder::Folder;
use drivehub_entity::permission::SharePermission;

use crate::context::RequestContext;

/// One page of search hits, split by kind.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// Matching files on this page.
    pub files: Vec<File>,
    /// Matching folders on this page.
    pub folders: Vec<Folder>,
    /// Paging over the combined hit list.
    pub meta: PageMeta,
}

enum Hit {
    File(File),
    Folder(Folder),
}

impl Hit {
    fn key(&self) -> (DateTime<Utc>, Uuid) {
        match self {
            Self::File(f) => (f.updated_at, f.id),
            Self::Folder(f) => (f.updated_at, f.id),
        }
    }
}

/// Newest first; ties broken by ascending ID.
fn rank(a: &Hit, b: &Hit) -> Ordering {
    let (a_time, a_id) = a.key();
    let (b_time, b_id) = b.key();
    b_time.cmp(&a_time).then_with(|| a_id.cmp(&b_id))
}

/// Searches the names of files and folders the caller can view.
///
/// Candidates are the caller's own items plus items shared with them; each
/// is then checked with the access evaluator, so a share on a PRIVATE item
/// never surfaces it.
#[derive(Debug, Clone)]
pub struct SearchService {
    db: DatabasePool,
    folder_repo: FolderRepository,
    file_repo: FileRepository,
    resolver: AccessResolver,
}

impl SearchService {
    /// Creates a new search service.
    pub fn new(db: DatabasePool) -> Self {
        Self {
            db,
            folder_repo: FolderRepository::new(),
            file_repo: FileRepository::new(),
            resolver: AccessResolver::new(),
        }
    }

    /// Runs a search.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: &str,
        page: PageRequest,
    ) -> AppResult<SearchResults> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Err(AppError::validation("Search query must not be empty"));
        }

        let principal = ctx.user_id();
        let mut conn = self.db.acquire().await?;
        let grants = self.resolver.grants_for(&mut conn, Some(principal)).await?;

        let mut folders: HashMap<Uuid, Folder> = HashMap::new();
        for folder in self
            .folder_repo
            .find_by_owner(&mut conn, principal)
            .await?
            .into_iter()
            .chain(self.folder_repo.find_shared_with(&mut conn, principal).await?)
        {
            folders.entry(folder.id).or_insert(folder);
        }
        let mut files: HashMap<Uuid, File> = HashMap::new();
        for file in self
            .file_repo
            .find_by_owner(&mut conn, principal)
            .await?
            .into_iter()
            .chain(self.file_repo.find_shared_with(&mut conn, principal).await?)
        {
            files.entry(file.id).or_insert(file);
        }
        drop(conn);

        let mut hits: Vec<Hit> = folders
            .into_values()
            .filter(|f| f.name.to_lowercase().contains(&term))
            .filter(|f| grants.can_access(f, SharePermission::View))
            .map(Hit::Folder)
            .chain(
                files
                    .into_values()
                    .filter(|f| f.name.to_lowercase().contains(&term))
                    .filter(|f| grants.can_access(f, SharePermission::View))
                    .map(Hit::File),
            )
            .collect();
        hits.sort_by(rank);

        let meta = PageMeta::new(&page, hits.len() as u64);
        let mut results = SearchResults {
            files: Vec::new(),
            folders: Vec::new(),
            meta,
        };
        for hit in page.slice(hits) {
            match hit {
                Hit::File(f) => results.files.push(f),
                Hit::Folder(f) => results.folders.push(f),
            }
        }
        Ok(results)
    }
}
