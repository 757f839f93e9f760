use jobfiles_protocol::path_guard::DEFAULT_ALLOWED_ROOTS;
use jobfiles_protocol::PathPolicy;
use jobfiles_tree::{StandardFolders, TreeOptions, STANDARD_FOLDERS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ResolverError, Result};

/// Conventions of one asset store deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one folder per project
    pub asset_root: PathBuf,

    /// URL prefix under which the asset root is served
    pub asset_url_prefix: String,

    /// URL prefix for record-addressed documents
    pub projects_url_prefix: String,

    /// Roots a resolved relative path may start with
    pub allowed_roots: Vec<String>,

    /// Mandatory project subfolders, in display order (exactly six)
    pub standard_folders: Vec<String>,

    /// Project subfolder holding approval drawings
    pub approval_drawings_dir: String,

    /// Project subfolder holding change orders and RFIs
    pub documents_dir: String,

    /// Levels listed in the sidebar preview
    pub sidebar_depth: usize,

    /// Name fragments hidden from the sidebar preview
    pub sidebar_exclude: Vec<String>,

    /// Longest drawing description kept in a synthesized file name
    pub description_max_chars: usize,

    /// Change-order sequence numbers start after this value
    pub change_order_sequence_base: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            asset_url_prefix: "/assets".to_string(),
            projects_url_prefix: "/projects".to_string(),
            allowed_roots: DEFAULT_ALLOWED_ROOTS.iter().map(|s| s.to_string()).collect(),
            standard_folders: STANDARD_FOLDERS.iter().map(|s| s.to_string()).collect(),
            approval_drawings_dir: "05 Approval Drawings".to_string(),
            documents_dir: "04 Documents".to_string(),
            sidebar_depth: 2,
            sidebar_exclude: vec!["rfi".to_string()],
            description_max_chars: 150,
            change_order_sequence_base: 100,
        }
    }
}

impl EngineConfig {
    /// Reads a TOML config file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&raw)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_asset_root(mut self, asset_root: impl Into<PathBuf>) -> Self {
        self.asset_root = asset_root.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (field, prefix) in [
            ("asset_url_prefix", &self.asset_url_prefix),
            ("projects_url_prefix", &self.projects_url_prefix),
        ] {
            if !prefix.starts_with('/') || prefix.trim_matches('/').is_empty() {
                return Err(ResolverError::invalid_config(format!(
                    "{field} must be a non-root path starting with '/' (got '{prefix}')"
                )));
            }
        }

        let policy = self.path_policy();
        if policy.allowed_roots().is_empty() {
            return Err(ResolverError::invalid_config(
                "allowed_roots must name at least one root",
            ));
        }
        for (field, prefix) in [
            ("asset_url_prefix", &self.asset_url_prefix),
            ("projects_url_prefix", &self.projects_url_prefix),
        ] {
            let probe = format!("{}/probe", prefix.trim_end_matches('/'));
            if policy.validate(&probe).is_none() {
                return Err(ResolverError::invalid_config(format!(
                    "{field} '{prefix}' is not under any allowed root"
                )));
            }
        }

        for (field, dir) in [
            ("approval_drawings_dir", &self.approval_drawings_dir),
            ("documents_dir", &self.documents_dir),
        ] {
            if dir.trim().is_empty() || dir.contains('/') || dir.contains("..") {
                return Err(ResolverError::invalid_config(format!(
                    "{field} must be a single folder name (got '{dir}')"
                )));
            }
        }

        if self.sidebar_depth == 0 {
            return Err(ResolverError::invalid_config("sidebar_depth must be > 0"));
        }

        if self.description_max_chars == 0 {
            return Err(ResolverError::invalid_config(
                "description_max_chars must be > 0",
            ));
        }

        self.standard_folder_catalog()?;
        Ok(())
    }

    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy::new(&self.allowed_roots)
    }

    pub fn standard_folder_catalog(&self) -> Result<StandardFolders> {
        Ok(StandardFolders::new(self.standard_folders.clone())?)
    }

    pub fn sidebar_options(&self) -> TreeOptions {
        TreeOptions::sidebar(self.sidebar_depth, &self.sidebar_exclude)
    }
}
