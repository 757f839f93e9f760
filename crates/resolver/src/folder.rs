use jobfiles_protocol::{compare_names, FolderDiagnostic};
use jobfiles_tree::AssetStore;
use serde::Serialize;

use crate::error::{ResolverError, Result};
use crate::identifiers::{non_blank, project_folder_name};

/// Which rule picked the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    UniquePrefix,
    NameMatch,
    FirstPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FolderResolution {
    Found {
        folder: String,
        strategy: MatchStrategy,
    },
    NotFound(FolderDiagnostic),
}

impl FolderResolution {
    pub fn folder(&self) -> Option<&str> {
        match self {
            Self::Found { folder, .. } => Some(folder),
            Self::NotFound(_) => None,
        }
    }
}

/// Locates project folders among the top-level directories of an asset store.
pub struct FolderResolver<'a> {
    store: &'a dyn AssetStore,
}

impl<'a> FolderResolver<'a> {
    pub fn new(store: &'a dyn AssetStore) -> Self {
        Self { store }
    }

    /// Visible top-level directories, sorted case-insensitively.
    ///
    /// This is the one failure that propagates: without a listing there is
    /// not even a diagnostic to return.
    pub fn project_dirs(&self) -> Result<Vec<String>> {
        let entries = self.store.list_dir("").map_err(ResolverError::AssetRoot)?;
        let mut dirs: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.is_dir && !entry.name.starts_with('.'))
            .map(|entry| entry.name)
            .collect();
        dirs.sort_by(|a, b| compare_names(a, b));
        Ok(dirs)
    }

    pub fn resolve(&self, job_number: &str, project_name: Option<&str>) -> Result<FolderResolution> {
        let dirs = self.project_dirs()?;
        let resolution = match_project_folder(&dirs, job_number, project_name);
        match &resolution {
            FolderResolution::Found { folder, strategy } => {
                log::debug!("Resolved job {job_number} to '{folder}' ({strategy:?})");
            }
            FolderResolution::NotFound(diag) => {
                log::info!(
                    "No folder for job {job_number} among {} candidates",
                    diag.available_folders.len()
                );
            }
        }
        Ok(resolution)
    }
}

/// Picks a project folder from a sorted directory listing.
///
/// Exact derived name, then a unique job-number prefix, then the prefix match
/// containing the project name, then the first prefix match.
pub fn match_project_folder(
    dirs: &[String],
    job_number: &str,
    project_name: Option<&str>,
) -> FolderResolution {
    let job_number = job_number.trim();
    if job_number.is_empty() {
        return FolderResolution::NotFound(FolderDiagnostic::folder_not_found(
            job_number,
            dirs.to_vec(),
        ));
    }

    let expected = project_folder_name(job_number, project_name);
    if let Some(dir) = dirs.iter().find(|dir| **dir == expected) {
        return found(dir, MatchStrategy::Exact);
    }

    let job_lower = job_number.to_lowercase();
    let candidates: Vec<&String> = dirs
        .iter()
        .filter(|dir| dir.to_lowercase().starts_with(&job_lower))
        .collect();

    match candidates.as_slice() {
        [] => FolderResolution::NotFound(FolderDiagnostic::folder_not_found(
            job_number,
            dirs.to_vec(),
        )),
        [only] => found(only, MatchStrategy::UniquePrefix),
        [first, ..] => {
            let by_name = non_blank(project_name).and_then(|name| {
                let name = name.to_lowercase();
                candidates
                    .iter()
                    .find(|dir| dir.to_lowercase().contains(&name))
            });
            match by_name {
                Some(dir) => found(dir, MatchStrategy::NameMatch),
                None => found(first, MatchStrategy::FirstPrefix),
            }
        }
    }
}

fn found(dir: &str, strategy: MatchStrategy) -> FolderResolution {
    FolderResolution::Found {
        folder: dir.to_string(),
        strategy,
    }
}
