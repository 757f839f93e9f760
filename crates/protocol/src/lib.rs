use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod path_guard;

pub use path_guard::{is_absolute_url, normalize_path, validate_path, PathPolicy};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    File,
}

/// One entry of a project file tree as handed to UI tree renderers.
///
/// `children` distinguishes "not yet expanded" (`None`) from "known empty"
/// (`Some(vec![])`); only folders ever carry it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct FileNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    /// Set on standard-folder slots that have no directory on disk.
    #[serde(default, skip_serializing_if = "is_false")]
    pub placeholder: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FileNode {
    pub fn folder(rel_path: &str, name: impl Into<String>, public_prefix: &str) -> Self {
        Self {
            id: rel_path.to_string(),
            name: name.into(),
            kind: NodeKind::Folder,
            path: join_public_path(public_prefix, rel_path),
            extension: None,
            size: None,
            children: None,
            placeholder: false,
        }
    }

    pub fn file(rel_path: &str, name: impl Into<String>, public_prefix: &str) -> Self {
        let name = name.into();
        Self {
            id: rel_path.to_string(),
            extension: file_extension(&name),
            name,
            kind: NodeKind::File,
            path: join_public_path(public_prefix, rel_path),
            size: None,
            children: None,
            placeholder: false,
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<FileNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Count of nodes in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(FileNode::node_count)
            .sum::<usize>()
    }
}

/// Folders before files, then case-insensitive by name; raw name breaks ties so
/// the order is total.
pub fn compare_nodes(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    }
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_nodes(nodes: &mut [FileNode]) {
    nodes.sort_by(compare_nodes);
}

/// Lower-cased extension with its leading dot, if the name has one.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Joins a public URL prefix and a relative path with exactly one `/`,
/// converting host separators in the relative part.
pub fn join_public_path(prefix: &str, rel_path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let rel = rel_path.replace('\\', "/");
    let rel = rel.trim_start_matches('/');
    if rel.is_empty() {
        return if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        };
    }
    format!("{prefix}/{rel}")
}

/// Returned instead of a tree when a project's folder cannot be located.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderDiagnostic {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub available_folders: Vec<String>,
}

impl FolderDiagnostic {
    pub fn folder_not_found(job_number: &str, available_folders: Vec<String>) -> Self {
        Self {
            error: "folder_not_found".to_string(),
            message: format!("No project folder found for job number {job_number}"),
            available_folders,
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
