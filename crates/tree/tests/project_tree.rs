use jobfiles_protocol::{FileNode, NodeKind};
use jobfiles_tree::{FsStore, StandardFolders, TreeBuilder, TreeOptions, STANDARD_FOLDERS};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

const PROJECT: &str = "U2524_ Valley View";
const PREFIX: &str = "/assets/U2524_ Valley View";

fn setup_project() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path().join(PROJECT);
    fs::create_dir_all(root.join("Documents/Change Order (CO)")).unwrap();
    fs::create_dir_all(root.join("Extra Stuff")).unwrap();
    fs::create_dir_all(root.join(".hidden")).unwrap();
    fs::write(root.join("Documents/Spec.PDF"), b"%PDF-1.4").unwrap();
    fs::write(root.join("Documents/Change Order (CO)/co.pdf"), b"co").unwrap();
    fs::write(root.join("zz-notes.txt"), b"notes").unwrap();
    fs::write(root.join("Budget.xlsx"), b"1234567").unwrap();
    temp
}

fn folder_names(nodes: &[FileNode]) -> Vec<&str> {
    nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Folder)
        .map(|n| n.name.as_str())
        .collect()
}

#[test]
fn project_root_presents_catalog_then_extras_then_files() {
    let temp = setup_project();
    let store = FsStore::new(temp.path());

    let nodes = TreeBuilder::new(&store, PREFIX).build(PROJECT);
    let tree = StandardFolders::default().merge(nodes, PREFIX);

    let folders = folder_names(&tree);
    assert_eq!(&folders[..6], &STANDARD_FOLDERS[..]);
    assert_eq!(folders[6], "Extra Stuff");
    assert_eq!(folders.len(), 7);

    let documents = &tree[2];
    assert!(!documents.placeholder);
    let children = documents.children.as_ref().unwrap();
    assert_eq!(children[0].name, "Change Order (CO)");
    assert_eq!(children[1].name, "Spec.PDF");
    assert_eq!(children[1].extension.as_deref(), Some(".pdf"));
    assert_eq!(children[1].size, Some(8));
    assert_eq!(children[1].path, format!("{PREFIX}/Documents/Spec.PDF"));

    let files: Vec<&str> = tree[7..].iter().map(|n| n.name.as_str()).collect();
    assert_eq!(files, vec!["Budget.xlsx", "zz-notes.txt"]);
}

#[test]
fn sidebar_preview_is_shallow() {
    let temp = setup_project();
    let store = FsStore::new(temp.path());

    let options = TreeOptions::sidebar(2, &["co".to_string()]);
    let nodes = TreeBuilder::new(&store, PREFIX)
        .with_options(options)
        .build(PROJECT);

    let documents = nodes.iter().find(|n| n.name == "Documents").unwrap();
    let children = documents.children.as_ref().unwrap();
    // "Change Order (CO)" is filtered by the exclusion token.
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Spec.PDF");
}

#[test]
fn missing_project_folder_scans_to_nothing() {
    let temp = tempdir().unwrap();
    let store = FsStore::new(temp.path());
    let nodes = TreeBuilder::new(&store, "/assets/nope").build("nope");
    assert!(nodes.is_empty());

    let tree = StandardFolders::default().merge(nodes, "/assets/nope");
    assert_eq!(tree.len(), 6);
    assert!(tree.iter().all(|n| n.placeholder));
}

#[cfg(unix)]
#[test]
fn linked_directories_do_not_recurse() {
    let temp = setup_project();
    let root = temp.path().join(PROJECT);
    std::os::unix::fs::symlink(&root, root.join("Documents/back")).unwrap();
    std::os::unix::fs::symlink(&root, root.join("a")).unwrap();
    std::os::unix::fs::symlink("/etc", root.join("b")).unwrap();
    let store = FsStore::new(temp.path());

    let nodes = TreeBuilder::new(&store, PREFIX)
        .with_options(TreeOptions::unbounded())
        .build(PROJECT);

    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Documents", "Extra Stuff", "Budget.xlsx", "zz-notes.txt"]
    );
    let documents = nodes[0].children.as_ref().unwrap();
    assert!(documents.iter().all(|n| n.name != "back"));
    assert_eq!(nodes.iter().map(FileNode::node_count).sum::<usize>(), 7);
}
