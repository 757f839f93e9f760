use jobfiles_protocol::{sort_nodes, FileNode};

use crate::store::{join_rel, AssetStore};

/// Depth budget and name filters for one tree build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeOptions {
    /// Levels of entries to list below the starting directory; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Case-insensitive substrings; any entry whose name contains one is skipped.
    pub exclude: Vec<String>,
}

impl TreeOptions {
    /// Full tree for a project detail view.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Shallow preview for the sidebar.
    pub fn sidebar(depth: usize, exclude: &[String]) -> Self {
        Self {
            max_depth: Some(depth),
            exclude: exclude.to_vec(),
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let lowered = name.to_lowercase();
        self.exclude
            .iter()
            .map(|token| token.trim().to_lowercase())
            .any(|token| !token.is_empty() && lowered.contains(&token))
    }
}

/// Scans a directory of an [`AssetStore`] into a sorted [`FileNode`] tree.
pub struct TreeBuilder<'a> {
    store: &'a dyn AssetStore,
    public_prefix: String,
    options: TreeOptions,
}

struct WorkItem {
    slot: Option<usize>,
    rel: String,
    remaining: Option<usize>,
}

struct Pending {
    node: FileNode,
    parent: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a dyn AssetStore, public_prefix: impl Into<String>) -> Self {
        Self {
            store,
            public_prefix: public_prefix.into(),
            options: TreeOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the tree below `base_dir` (store-relative).
    ///
    /// Node ids are paths relative to `base_dir`, node paths are those ids
    /// joined onto the public prefix. An unreadable directory contributes an
    /// empty child list and is logged; the rest of the scan carries on.
    pub fn build(&self, base_dir: &str) -> Vec<FileNode> {
        let base_dir = base_dir.trim_matches('/');
        let mut arena: Vec<Pending> = Vec::new();
        let mut stack = vec![WorkItem {
            slot: None,
            rel: String::new(),
            remaining: self.options.max_depth,
        }];
        let mut unreadable = 0usize;

        while let Some(item) = stack.pop() {
            if item.remaining == Some(0) {
                continue;
            }

            let store_dir = join_rel(base_dir, &item.rel);
            let entries = match self.store.list_dir(&store_dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Failed to read directory '{store_dir}': {e}");
                    unreadable += 1;
                    continue;
                }
            };

            let child_budget = item.remaining.map(|remaining| remaining - 1);
            for entry in entries {
                if entry.name.starts_with('.') || self.options.is_excluded(&entry.name) {
                    continue;
                }

                let rel = join_rel(&item.rel, &entry.name);
                let slot = arena.len();
                let node = if entry.is_dir {
                    let mut node = FileNode::folder(&rel, entry.name, &self.public_prefix);
                    if child_budget != Some(0) {
                        node.children = Some(Vec::new());
                        stack.push(WorkItem {
                            slot: Some(slot),
                            rel,
                            remaining: child_budget,
                        });
                    }
                    node
                } else {
                    let mut node = FileNode::file(&rel, entry.name, &self.public_prefix);
                    match self.store.stat(&join_rel(base_dir, &rel)) {
                        Ok(meta) => node.size = Some(meta.size),
                        Err(e) => log::debug!("No size for '{rel}': {e}"),
                    }
                    node
                };
                arena.push(Pending {
                    node,
                    parent: item.slot,
                });
            }
        }

        log::debug!(
            "Scanned '{}': {} entries, {} unreadable directories",
            base_dir,
            arena.len(),
            unreadable
        );
        assemble(arena)
    }
}

/// Children are always pushed after their parent, so walking the arena
/// backwards finishes every subtree before its parent is attached.
fn assemble(arena: Vec<Pending>) -> Vec<FileNode> {
    let parents: Vec<Option<usize>> = arena.iter().map(|pending| pending.parent).collect();
    let mut slots: Vec<Option<FileNode>> = arena.into_iter().map(|p| Some(p.node)).collect();
    let mut roots = Vec::new();

    for idx in (0..slots.len()).rev() {
        let Some(mut node) = slots[idx].take() else {
            continue;
        };
        if let Some(children) = node.children.as_mut() {
            sort_nodes(children);
        }
        match parents[idx] {
            Some(parent) => {
                if let Some(parent) = slots[parent].as_mut() {
                    parent.children.get_or_insert_with(Vec::new).push(node);
                }
            }
            None => roots.push(node),
        }
    }

    sort_nodes(&mut roots);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreEntry, StoreMetadata};
    use jobfiles_protocol::NodeKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io;

    /// Listing-only store; directories missing from the map are unreadable.
    struct MapStore {
        dirs: HashMap<String, Vec<StoreEntry>>,
    }

    impl MapStore {
        fn new(dirs: &[(&str, Vec<StoreEntry>)]) -> Self {
            Self {
                dirs: dirs
                    .iter()
                    .map(|(path, entries)| (path.to_string(), entries.clone()))
                    .collect(),
            }
        }
    }

    impl AssetStore for MapStore {
        fn list_dir(&self, rel_path: &str) -> io::Result<Vec<StoreEntry>> {
            self.dirs
                .get(rel_path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn stat(&self, rel_path: &str) -> io::Result<StoreMetadata> {
            Ok(StoreMetadata {
                size: rel_path.len() as u64,
                is_dir: self.dirs.contains_key(rel_path),
            })
        }
    }

    fn names(nodes: &[FileNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn folders_precede_files_in_every_level() {
        let store = MapStore::new(&[
            (
                "P",
                vec![
                    StoreEntry::file("b.pdf"),
                    StoreEntry::dir("zoo"),
                    StoreEntry::file("A.txt"),
                    StoreEntry::dir("Apple"),
                ],
            ),
            ("P/zoo", vec![StoreEntry::file("y.PDF"), StoreEntry::dir("X")]),
            ("P/zoo/X", vec![]),
            ("P/Apple", vec![]),
        ]);
        let nodes = TreeBuilder::new(&store, "/assets/P").build("P");

        assert_eq!(names(&nodes), vec!["Apple", "zoo", "A.txt", "b.pdf"]);
        let zoo = &nodes[1];
        assert_eq!(names(zoo.children.as_ref().unwrap()), vec!["X", "y.PDF"]);
        let file = &zoo.children.as_ref().unwrap()[1];
        assert_eq!(file.kind, NodeKind::File);
        assert_eq!(file.id, "zoo/y.PDF");
        assert_eq!(file.path, "/assets/P/zoo/y.PDF");
        assert_eq!(file.extension.as_deref(), Some(".pdf"));
        assert_eq!(file.size, Some("P/zoo/y.PDF".len() as u64));
    }

    #[test]
    fn depth_budget_leaves_folders_unexpanded() {
        let store = MapStore::new(&[
            ("P", vec![StoreEntry::dir("a")]),
            ("P/a", vec![StoreEntry::dir("b")]),
            ("P/a/b", vec![StoreEntry::file("deep.pdf")]),
        ]);
        let options = TreeOptions::unbounded().with_max_depth(Some(2));
        let nodes = TreeBuilder::new(&store, "/assets/P")
            .with_options(options)
            .build("P");

        let a = &nodes[0];
        let b = &a.children.as_ref().unwrap()[0];
        assert_eq!(b.name, "b");
        assert_eq!(b.children, None);
    }

    #[test]
    fn dotfiles_and_excluded_tokens_are_skipped() {
        let store = MapStore::new(&[(
            "P",
            vec![
                StoreEntry::file(".DS_Store"),
                StoreEntry::dir(".git"),
                StoreEntry::dir("004_RFI's"),
                StoreEntry::file("rfi-log.xlsx"),
                StoreEntry::dir("Documents"),
            ],
        )]);
        let options = TreeOptions::sidebar(1, &["RFI".to_string()]);
        let nodes = TreeBuilder::new(&store, "/assets/P")
            .with_options(options)
            .build("P");
        assert_eq!(names(&nodes), vec!["Documents"]);
        assert_eq!(nodes[0].children, None);
    }

    #[test]
    fn unreadable_subtree_is_isolated() {
        let store = MapStore::new(&[
            ("P", vec![StoreEntry::dir("locked"), StoreEntry::dir("open")]),
            ("P/open", vec![StoreEntry::file("ok.pdf")]),
        ]);
        let nodes = TreeBuilder::new(&store, "/assets/P").build("P");
        assert_eq!(nodes[0].name, "locked");
        assert_eq!(nodes[0].children, Some(Vec::new()));
        assert_eq!(names(nodes[1].children.as_ref().unwrap()), vec!["ok.pdf"]);
    }

    #[test]
    fn unreadable_root_yields_empty_tree() {
        let store = MapStore::new(&[]);
        assert!(TreeBuilder::new(&store, "/assets/P").build("P").is_empty());
    }

    #[test]
    fn zero_depth_lists_nothing() {
        let store = MapStore::new(&[("P", vec![StoreEntry::file("a.pdf")])]);
        let nodes = TreeBuilder::new(&store, "/assets/P")
            .with_options(TreeOptions::unbounded().with_max_depth(Some(0)))
            .build("P");
        assert!(nodes.is_empty());
    }
}
