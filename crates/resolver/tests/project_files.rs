use jobfiles_resolver::{
    ChangeOrderRecord, DocumentRecord, DrawingRecord, EngineConfig, FolderResolution,
    MatchStrategy, ProjectFiles, ProjectTree, ResolverError, RfiRecord,
};
use jobfiles_tree::STANDARD_FOLDERS;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn setup_assets() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    let project = root.join("U2524_Valley View");
    fs::create_dir_all(project.join("05 Approval Drawings")).unwrap();
    fs::create_dir_all(project.join("04 Documents/004_RFI's/PRO_RFI's")).unwrap();
    fs::create_dir_all(project.join("Site Photos/2024")).unwrap();
    fs::write(project.join("05 Approval Drawings/U2524_R-1.pdf"), b"pdf").unwrap();
    fs::write(project.join("Contract.pdf"), b"contract").unwrap();
    fs::create_dir_all(root.join("U3000_ Harbor")).unwrap();
    fs::create_dir_all(root.join(".trash")).unwrap();
    fs::write(root.join("index.txt"), b"not a project").unwrap();
    temp
}

fn open(temp: &TempDir) -> ProjectFiles<jobfiles_tree::FsStore> {
    let config = EngineConfig::default().with_asset_root(temp.path());
    ProjectFiles::open(config).expect("valid config")
}

#[test]
fn project_tree_resolves_folder_and_merges_catalog() {
    let temp = setup_assets();
    let files = open(&temp);

    let tree = files.project_tree("U2524", Some("Valley View")).unwrap();
    let ProjectTree::Found {
        folder,
        strategy,
        path,
        nodes,
    } = tree
    else {
        panic!("expected a tree");
    };
    // Derived name is "U2524_ Valley View"; the disk folder lacks the space.
    assert_eq!(folder, "U2524_Valley View");
    assert_eq!(strategy, MatchStrategy::UniquePrefix);
    assert_eq!(path, "/assets/U2524_Valley View");

    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Commands",
            "Contract Drawings",
            "04 Documents",
            "05 Approval Drawings",
            "Field Use Files",
            "Take Order",
            "Site Photos",
            "Contract.pdf",
        ]
    );
    assert_eq!(STANDARD_FOLDERS.len(), 6);
    let approvals = nodes[3].children.as_ref().unwrap();
    assert_eq!(
        approvals[0].path,
        "/assets/U2524_Valley View/05 Approval Drawings/U2524_R-1.pdf"
    );
    let photos = nodes[6].children.as_ref().unwrap();
    assert_eq!(photos[0].children, Some(Vec::new()));
}

#[test]
fn sidebar_tree_hides_rfi_and_stops_early() {
    let temp = setup_assets();
    let files = open(&temp);

    let tree = files.sidebar_tree("U2524", None).unwrap();
    let nodes = tree.nodes();
    let documents = nodes.iter().find(|n| n.name == "04 Documents").unwrap();
    assert_eq!(documents.children, Some(Vec::new()));

    let photos = nodes.iter().find(|n| n.name == "Site Photos").unwrap();
    let year = &photos.children.as_ref().unwrap()[0];
    assert_eq!(year.name, "2024");
    assert_eq!(year.children, None);
}

#[test]
fn unknown_job_returns_diagnostic() {
    let temp = setup_assets();
    let files = open(&temp);

    match files.project_tree("U9999", Some("Nowhere")).unwrap() {
        ProjectTree::NotFound(diag) => {
            assert_eq!(diag.error, "folder_not_found");
            assert_eq!(
                diag.available_folders,
                vec!["U2524_Valley View".to_string(), "U3000_ Harbor".to_string()]
            );
        }
        other => panic!("expected diagnostic, got {other:?}"),
    }
}

#[test]
fn missing_asset_root_is_the_only_hard_failure() {
    let temp = TempDir::new().unwrap();
    let config = EngineConfig::default().with_asset_root(temp.path().join("gone"));
    let files = ProjectFiles::open(config).unwrap();

    let err = files.resolve_folder("U1", None).unwrap_err();
    assert!(matches!(err, ResolverError::AssetRoot(_)));

    // Document paths still degrade to a prediction.
    let record = DocumentRecord::Rfi(RfiRecord {
        job_number: Some("U1".to_string()),
        rfi_number: Some("RFI-1".to_string()),
        ..Default::default()
    });
    assert_eq!(
        files.document_path(&record).as_deref(),
        Some("/assets/U1/04%20Documents/004_RFI's/PRO_RFI's/RFI-1.pdf")
    );
}

#[test]
fn document_path_prefers_existing_candidate() {
    let temp = setup_assets();
    let files = open(&temp);
    let record = DocumentRecord::Drawing(DrawingRecord {
        job_number: Some("U2524".to_string()),
        project_name: Some("Valley View".to_string()),
        drawing_number: Some("r1".to_string()),
        revision: Some("0".to_string()),
        description: Some("Roof Plan".to_string()),
        stored_path: None,
    });

    assert_eq!(
        files.predict_document_path(&record).as_deref(),
        Some("/assets/U2524_%20Valley%20View/05%20Approval%20Drawings/U2524_R-1_APP%200_Roof%20Plan.pdf")
    );
    assert_eq!(
        files.document_path(&record).as_deref(),
        Some("/assets/U2524_Valley%20View/05%20Approval%20Drawings/U2524_R-1.pdf")
    );
}

#[test]
fn document_path_without_hits_uses_record_addressed_fallback() {
    let temp = setup_assets();
    let files = open(&temp);

    let drawing = DocumentRecord::Drawing(DrawingRecord {
        job_number: Some("U2524".to_string()),
        drawing_number: Some("R-9".to_string()),
        ..Default::default()
    });
    assert_eq!(
        files.document_path(&drawing).as_deref(),
        Some("/projects/U2524/Drawing-Log/R-9.pdf")
    );

    let change_order = DocumentRecord::ChangeOrder(ChangeOrderRecord {
        job_number: Some("U3000".to_string()),
        change_order_id: Some("CO #2".to_string()),
        list_index: Some(1),
        ..Default::default()
    });
    assert_eq!(
        files.document_path(&change_order).as_deref(),
        Some("/assets/U3000_%20Harbor/04%20Documents/Change%20Order%20(CO)/PRO%20CO%23102_U3000_CO%232/PRO%20CO%23102_U3000_CO%232%20(1).pdf")
    );
}

#[test]
fn folder_resolution_is_deterministic() {
    let temp = setup_assets();
    let files = open(&temp);
    let first = files.resolve_folder("u2524", None).unwrap();
    let second = files.resolve_folder("u2524", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.folder(), Some("U2524_Valley View"));
    assert!(matches!(
        files.resolve_folder("U3000", Some("Harbor")).unwrap(),
        FolderResolution::Found {
            strategy: MatchStrategy::Exact,
            ..
        }
    ));
}
