use jobfiles_protocol::{compare_nodes, sort_nodes, FileNode};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TreeError};

/// Subfolders every project root presents, in display order.
pub const STANDARD_FOLDERS: [&str; 6] = [
    "Commands",
    "Contract Drawings",
    "Documents",
    "Approval Drawings",
    "Field Use Files",
    "Take Order",
];

static ORDERING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[\s._-]*").expect("valid ordering prefix regex"));

/// Matching key for a folder name: case-folded, whitespace collapsed, with any
/// leading numeric ordering prefix (`"05 "`) removed.
pub fn folder_key(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = ORDERING_PREFIX.replace(&collapsed, "");
    let key = if stripped.trim().is_empty() {
        collapsed.as_str()
    } else {
        stripped.trim()
    };
    key.to_lowercase()
}

/// The ordered catalog of mandatory project subfolders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardFolders {
    names: Vec<String>,
    keys: Vec<String>,
}

impl Default for StandardFolders {
    fn default() -> Self {
        let names: Vec<String> = STANDARD_FOLDERS.iter().map(|s| s.to_string()).collect();
        let keys = names.iter().map(|name| folder_key(name)).collect();
        Self { names, keys }
    }
}

impl StandardFolders {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.len() != STANDARD_FOLDERS.len() {
            return Err(TreeError::InvalidCatalog(format!(
                "expected {} standard folders, got {}",
                STANDARD_FOLDERS.len(),
                names.len()
            )));
        }

        let keys: Vec<String> = names.iter().map(|name| folder_key(name)).collect();
        for (idx, key) in keys.iter().enumerate() {
            if key.is_empty() {
                return Err(TreeError::InvalidCatalog(format!(
                    "standard folder #{} is blank",
                    idx + 1
                )));
            }
            if keys[..idx].contains(key) {
                return Err(TreeError::InvalidCatalog(format!(
                    "standard folder '{}' is listed twice",
                    names[idx]
                )));
            }
        }

        Ok(Self { names, keys })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn slot_of(&self, folder_name: &str) -> Option<usize> {
        let key = folder_key(folder_name);
        self.keys.iter().position(|candidate| *candidate == key)
    }

    /// Forces the catalog into the first level of a project-root tree.
    ///
    /// Catalog slots come first, in order, each filled by the matching disk
    /// folder (children untouched) or an empty placeholder. Other folders
    /// follow, then files. When two disk folders claim one slot, the first in
    /// sorted order wins and the other is kept as an ordinary folder.
    pub fn merge(&self, nodes: Vec<FileNode>, public_prefix: &str) -> Vec<FileNode> {
        let mut nodes = nodes;
        sort_nodes(&mut nodes);

        let mut slots: Vec<Option<FileNode>> = vec![None; self.names.len()];
        let mut extra_folders = Vec::new();
        let mut files = Vec::new();

        for node in nodes {
            if !node.is_folder() {
                files.push(node);
                continue;
            }
            match self.slot_of(&node.name) {
                Some(idx) if slots[idx].is_none() => slots[idx] = Some(node),
                _ => extra_folders.push(node),
            }
        }

        let mut merged = Vec::with_capacity(slots.len() + extra_folders.len() + files.len());
        for (idx, slot) in slots.into_iter().enumerate() {
            merged.push(slot.unwrap_or_else(|| self.placeholder(idx, public_prefix)));
        }

        extra_folders.sort_by(compare_nodes);
        files.sort_by(compare_nodes);
        merged.extend(extra_folders);
        merged.extend(files);
        merged
    }

    fn placeholder(&self, idx: usize, public_prefix: &str) -> FileNode {
        let name = &self.names[idx];
        log::debug!("Standard folder '{name}' missing on disk; adding placeholder");
        let mut node = FileNode::folder(name, name.clone(), public_prefix).with_children(Vec::new());
        node.placeholder = true;
        node
    }
}
