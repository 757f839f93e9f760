use jobfiles_protocol::{join_public_path, FileNode, FolderDiagnostic};
use jobfiles_tree::{AssetStore, FsStore, StandardFolders, TreeBuilder, TreeOptions};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::documents::{DocumentPathResolver, DocumentRecord};
use crate::error::Result;
use crate::folder::{FolderResolution, FolderResolver, MatchStrategy};

/// A project's merged tree, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProjectTree {
    Found {
        folder: String,
        strategy: MatchStrategy,
        path: String,
        nodes: Vec<FileNode>,
    },
    NotFound(FolderDiagnostic),
}

impl ProjectTree {
    pub fn nodes(&self) -> &[FileNode] {
        match self {
            Self::Found { nodes, .. } => nodes,
            Self::NotFound(_) => &[],
        }
    }
}

/// Entry point tying folder resolution, tree building and document paths to
/// one asset store and its conventions.
pub struct ProjectFiles<S: AssetStore> {
    config: EngineConfig,
    catalog: StandardFolders,
    store: S,
}

impl ProjectFiles<FsStore> {
    /// Opens the filesystem store named by `config.asset_root`.
    pub fn open(config: EngineConfig) -> Result<Self> {
        let store = FsStore::new(&config.asset_root);
        Self::new(config, store)
    }
}

impl<S: AssetStore> ProjectFiles<S> {
    pub fn new(config: EngineConfig, store: S) -> Result<Self> {
        config.validate()?;
        let catalog = config.standard_folder_catalog()?;
        Ok(Self {
            config,
            catalog,
            store,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolve_folder(
        &self,
        job_number: &str,
        project_name: Option<&str>,
    ) -> Result<FolderResolution> {
        FolderResolver::new(&self.store).resolve(job_number, project_name)
    }

    /// Full tree for the project detail view.
    pub fn project_tree(&self, job_number: &str, project_name: Option<&str>) -> Result<ProjectTree> {
        self.tree_with_options(job_number, project_name, TreeOptions::unbounded())
    }

    /// Shallow tree for the sidebar preview.
    pub fn sidebar_tree(&self, job_number: &str, project_name: Option<&str>) -> Result<ProjectTree> {
        self.tree_with_options(job_number, project_name, self.config.sidebar_options())
    }

    pub fn tree_with_options(
        &self,
        job_number: &str,
        project_name: Option<&str>,
        options: TreeOptions,
    ) -> Result<ProjectTree> {
        let (folder, strategy) = match self.resolve_folder(job_number, project_name)? {
            FolderResolution::Found { folder, strategy } => (folder, strategy),
            FolderResolution::NotFound(diag) => return Ok(ProjectTree::NotFound(diag)),
        };

        let public_prefix = join_public_path(&self.config.asset_url_prefix, &folder);
        let nodes = TreeBuilder::new(&self.store, public_prefix.clone())
            .with_options(options)
            .build(&folder);
        let nodes = self.catalog.merge(nodes, &public_prefix);
        log::info!(
            "Built tree for '{folder}': {} nodes",
            nodes.iter().map(FileNode::node_count).sum::<usize>()
        );

        Ok(ProjectTree::Found {
            folder,
            strategy,
            path: public_prefix,
            nodes,
        })
    }

    /// Resolved path for a document, preferring locations that exist on the
    /// store.
    pub fn document_path(&self, record: &DocumentRecord) -> Option<String> {
        DocumentPathResolver::new(&self.config)
            .with_store(&self.store)
            .resolve(record)
    }

    /// Resolved path from naming conventions alone, without touching the store.
    pub fn predict_document_path(&self, record: &DocumentRecord) -> Option<String> {
        DocumentPathResolver::new(&self.config).resolve(record)
    }
}
