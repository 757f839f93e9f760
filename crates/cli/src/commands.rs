use anyhow::{Context as AnyhowContext, Result};
use jobfiles_resolver::{
    extract_job_number, normalize_drawing_number, DocumentCategory, DocumentPathResolver,
    DocumentRecord, EngineConfig, FolderResolution, ProjectFiles, ProjectTree,
};
use serde::Serialize;

use crate::flags::TreeView;

#[derive(Debug, Serialize)]
pub(crate) struct JobNumberOutput {
    pub input: String,
    pub job_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DrawingNumberOutput {
    pub input: String,
    pub drawing_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckPathOutput {
    pub input: String,
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TreeOutput {
    pub view: &'static str,
    #[serde(flatten)]
    pub tree: ProjectTree,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocPathOutput {
    pub category: DocumentCategory,
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
}

pub(crate) fn job_number(name: &str) -> JobNumberOutput {
    JobNumberOutput {
        input: name.to_string(),
        job_number: extract_job_number(name),
    }
}

pub(crate) fn drawing_number(text: &str) -> DrawingNumberOutput {
    DrawingNumberOutput {
        input: text.to_string(),
        drawing_number: normalize_drawing_number(text),
    }
}

pub(crate) fn check_path(config: &EngineConfig, path: &str) -> CheckPathOutput {
    CheckPathOutput {
        input: path.to_string(),
        path: config.path_policy().validate(path),
    }
}

pub(crate) fn folder(
    config: EngineConfig,
    job: &str,
    name: Option<&str>,
) -> Result<FolderResolution> {
    let files = ProjectFiles::open(config)?;
    files
        .resolve_folder(job, name)
        .with_context(|| format!("Failed to resolve folder for job {job}"))
}

pub(crate) fn tree(
    config: EngineConfig,
    job: &str,
    name: Option<&str>,
    view: TreeView,
    depth: Option<usize>,
) -> Result<TreeOutput> {
    let options = view.options(&config, depth);
    let files = ProjectFiles::open(config)?;
    let tree = files
        .tree_with_options(job, name, options)
        .with_context(|| format!("Failed to build tree for job {job}"))?;
    Ok(TreeOutput {
        view: view.as_str(),
        tree,
    })
}

pub(crate) fn doc_path(
    config: EngineConfig,
    raw_record: &str,
    probe: bool,
    with_candidates: bool,
) -> Result<DocPathOutput> {
    let record: DocumentRecord =
        serde_json::from_str(raw_record).context("Failed to parse document record")?;
    let files = ProjectFiles::open(config)?;

    let path = if probe {
        files.document_path(&record)
    } else {
        files.predict_document_path(&record)
    };
    if path.is_none() {
        log::info!("No {} document available", record.category().as_str());
    }

    let candidates = with_candidates
        .then(|| DocumentPathResolver::new(files.config()).candidates(&record));

    Ok(DocPathOutput {
        category: record.category(),
        path,
        candidates,
    })
}
