use jobfiles_protocol::{is_absolute_url, PathPolicy};
use jobfiles_tree::AssetStore;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::folder::{FolderResolution, FolderResolver};
use crate::identifiers::{non_blank, normalize_drawing_number, project_folder_name};

/// Characters left alone when encoding one path segment (the
/// `encodeURIComponent` unreserved set).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const FORBIDDEN_DESCRIPTION_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const CHANGE_ORDER_DIR: &str = "Change Order (CO)";
const RFI_DIRS: [&str; 2] = ["004_RFI's", "PRO_RFI's"];
const DRAWING_LOG_DIR: &str = "Drawing-Log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Drawing,
    Invoice,
    Submission,
    ChangeOrder,
    Rfi,
}

impl DocumentCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drawing => "drawing",
            Self::Invoice => "invoice",
            Self::Submission => "submission",
            Self::ChangeOrder => "change_order",
            Self::Rfi => "rfi",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingRecord {
    pub job_number: Option<String>,
    pub project_name: Option<String>,
    pub drawing_number: Option<String>,
    pub revision: Option<String>,
    pub description: Option<String>,
    pub stored_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    pub project_id: Option<String>,
    pub invoice_id: Option<String>,
    pub stored_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionRecord {
    pub project_id: Option<String>,
    pub drawing_number: Option<String>,
    pub id: Option<String>,
    pub stored_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeOrderRecord {
    pub job_number: Option<String>,
    pub project_name: Option<String>,
    pub change_order_id: Option<String>,
    /// Explicit sequence number; wins over `list_index`.
    pub sequence: Option<u32>,
    /// Position of the change order in the project's log, zero based.
    pub list_index: Option<u32>,
    pub stored_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RfiRecord {
    pub job_number: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub rfi_number: Option<String>,
    pub stored_path: Option<String>,
}

/// Metadata for one document, as supplied by the record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DocumentRecord {
    Drawing(DrawingRecord),
    Invoice(InvoiceRecord),
    Submission(SubmissionRecord),
    ChangeOrder(ChangeOrderRecord),
    Rfi(RfiRecord),
}

impl DocumentRecord {
    pub fn category(&self) -> DocumentCategory {
        match self {
            Self::Drawing(_) => DocumentCategory::Drawing,
            Self::Invoice(_) => DocumentCategory::Invoice,
            Self::Submission(_) => DocumentCategory::Submission,
            Self::ChangeOrder(_) => DocumentCategory::ChangeOrder,
            Self::Rfi(_) => DocumentCategory::Rfi,
        }
    }

    pub fn stored_path(&self) -> Option<&str> {
        let stored = match self {
            Self::Drawing(r) => &r.stored_path,
            Self::Invoice(r) => &r.stored_path,
            Self::Submission(r) => &r.stored_path,
            Self::ChangeOrder(r) => &r.stored_path,
            Self::Rfi(r) => &r.stored_path,
        };
        non_blank(stored.as_deref())
    }
}

/// A synthesized location; `store_rel` is set when it lives on the asset
/// store and can be probed for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    url: String,
    store_rel: Option<String>,
}

/// Predicts where a document lives from its metadata.
pub struct DocumentPathResolver<'a> {
    config: &'a EngineConfig,
    policy: PathPolicy,
    store: Option<&'a dyn AssetStore>,
}

impl<'a> DocumentPathResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            policy: config.path_policy(),
            store: None,
        }
    }

    /// Probe the store: resolve the real project folder and prefer candidates
    /// that exist.
    #[must_use]
    pub fn with_store(mut self, store: &'a dyn AssetStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Stored path if there is one, otherwise the best synthesized candidate.
    /// `None` means no document is available.
    pub fn resolve(&self, record: &DocumentRecord) -> Option<String> {
        if let Some(stored) = record.stored_path() {
            let resolved = self.policy.validate(&stored_path_url(stored));
            if resolved.is_none() {
                log::warn!(
                    "Stored {} path rejected by path policy: {stored}",
                    record.category().as_str()
                );
            }
            return resolved;
        }

        let candidates = self.valid_candidates(record);
        let Some(store) = self.store else {
            return candidates.into_iter().next().map(|c| c.url);
        };

        if let Some(hit) = candidates
            .iter()
            .find(|c| c.store_rel.as_deref().is_some_and(|rel| store.exists(rel)))
        {
            return Some(hit.url.clone());
        }

        candidates
            .iter()
            .find(|c| c.store_rel.is_none())
            .or_else(|| candidates.first())
            .map(|c| c.url.clone())
    }

    /// All synthesized candidates that pass the path policy, most specific first.
    pub fn candidates(&self, record: &DocumentRecord) -> Vec<String> {
        self.valid_candidates(record)
            .into_iter()
            .map(|c| c.url)
            .collect()
    }

    fn valid_candidates(&self, record: &DocumentRecord) -> Vec<Candidate> {
        let raw = match record {
            DocumentRecord::Drawing(r) => self.drawing_candidates(r),
            DocumentRecord::Invoice(r) => self.invoice_candidates(r),
            DocumentRecord::Submission(r) => self.submission_candidates(r),
            DocumentRecord::ChangeOrder(r) => self.change_order_candidates(r),
            DocumentRecord::Rfi(r) => self.rfi_candidates(r),
        };

        raw.into_iter()
            .filter_map(|candidate| match self.policy.validate(&candidate.url) {
                Some(url) => Some(Candidate { url, ..candidate }),
                None => {
                    log::debug!("Dropping candidate rejected by path policy: {}", candidate.url);
                    None
                }
            })
            .collect()
    }

    fn drawing_candidates(&self, record: &DrawingRecord) -> Vec<Candidate> {
        let (Some(job), Some(raw_number)) = (
            non_blank(record.job_number.as_deref()),
            non_blank(record.drawing_number.as_deref()),
        ) else {
            return Vec::new();
        };
        let number = normalize_drawing_number(raw_number).unwrap_or_else(|| raw_number.to_string());
        let folder = self.project_folder(job, record.project_name.as_deref());
        let approval = self.config.approval_drawings_dir.as_str();

        let mut candidates = Vec::with_capacity(4);
        if let (Some(revision), Some(description)) = (
            non_blank(record.revision.as_deref()),
            non_blank(record.description.as_deref()),
        ) {
            let description = sanitize_description(description, self.config.description_max_chars);
            if !description.is_empty() {
                let file = format!("{job}_{number}_APP {revision}_{description}.pdf");
                candidates.push(self.asset_candidate(&[&folder, approval, &file]));
            }
        }
        candidates.push(self.asset_candidate(&[&folder, approval, &format!("{job}_{number}.pdf")]));
        candidates.push(self.asset_candidate(&[&folder, approval, &format!("{number}.pdf")]));
        candidates.push(self.projects_candidate(&[job, DRAWING_LOG_DIR, &format!("{number}.pdf")]));
        candidates
    }

    fn invoice_candidates(&self, record: &InvoiceRecord) -> Vec<Candidate> {
        let (Some(project_id), Some(invoice_id)) = (
            non_blank(record.project_id.as_deref()),
            non_blank(record.invoice_id.as_deref()),
        ) else {
            return Vec::new();
        };
        vec![self.projects_candidate(&[project_id, "invoices", &format!("{invoice_id}.pdf")])]
    }

    fn submission_candidates(&self, record: &SubmissionRecord) -> Vec<Candidate> {
        let Some(project_id) = non_blank(record.project_id.as_deref()) else {
            return Vec::new();
        };
        [record.drawing_number.as_deref(), record.id.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .map(|name| {
                self.projects_candidate(&[project_id, "submissions", &format!("{name}.pdf")])
            })
            .collect()
    }

    fn change_order_candidates(&self, record: &ChangeOrderRecord) -> Vec<Candidate> {
        let (Some(job), Some(change_order_id)) = (
            non_blank(record.job_number.as_deref()),
            non_blank(record.change_order_id.as_deref()),
        ) else {
            return Vec::new();
        };
        let sequence = record.sequence.or_else(|| {
            record
                .list_index
                .map(|idx| change_order_sequence(self.config.change_order_sequence_base, idx))
        });
        let Some(sequence) = sequence else {
            return Vec::new();
        };

        let co_number = change_order_number(change_order_id, job);
        let name = format!("PRO CO#{sequence}_{job}_CO#{co_number}");
        let file = format!("{name} (1).pdf");
        let folder = self.project_folder(job, record.project_name.as_deref());
        vec![self.asset_candidate(&[
            &folder,
            &self.config.documents_dir,
            CHANGE_ORDER_DIR,
            &name,
            &file,
        ])]
    }

    fn rfi_candidates(&self, record: &RfiRecord) -> Vec<Candidate> {
        let Some(rfi_number) = non_blank(record.rfi_number.as_deref()) else {
            return Vec::new();
        };
        let file = format!("{rfi_number}.pdf");

        let mut candidates = Vec::with_capacity(2);
        if let Some(job) = non_blank(record.job_number.as_deref()) {
            let folder = self.project_folder(job, record.project_name.as_deref());
            candidates.push(self.asset_candidate(&[
                &folder,
                &self.config.documents_dir,
                RFI_DIRS[0],
                RFI_DIRS[1],
                &file,
            ]));
        }
        if let Some(project_id) = non_blank(record.project_id.as_deref()) {
            candidates.push(self.projects_candidate(&[project_id, "rfi", &file]));
        }
        candidates
    }

    /// The folder actually on disk when a store is attached and resolution
    /// succeeds, otherwise the conventional name.
    fn project_folder(&self, job: &str, project_name: Option<&str>) -> String {
        if let Some(store) = self.store {
            match FolderResolver::new(store).resolve(job, project_name) {
                Ok(FolderResolution::Found { folder, .. }) => return folder,
                Ok(FolderResolution::NotFound(_)) => {}
                Err(e) => log::warn!("Folder lookup for job {job} failed: {e}"),
            }
        }
        project_folder_name(job, project_name)
    }

    fn asset_candidate(&self, segments: &[&str]) -> Candidate {
        Candidate {
            url: encode_path(&self.config.asset_url_prefix, segments),
            store_rel: Some(segments.join("/")),
        }
    }

    fn projects_candidate(&self, segments: &[&str]) -> Candidate {
        Candidate {
            url: encode_path(&self.config.projects_url_prefix, segments),
            store_rel: None,
        }
    }
}

/// Stored paths are trusted as locations: URLs and rooted paths pass through,
/// anything else gains a leading `/`.
pub fn stored_path_url(stored: &str) -> String {
    let stored = stored.trim();
    if is_absolute_url(stored) || stored.starts_with('/') {
        return stored.to_string();
    }
    format!("/{stored}")
}

/// Drops characters that are illegal in file names, collapses whitespace and
/// caps the length.
pub fn sanitize_description(description: &str, max_chars: usize) -> String {
    let cleaned: String = description
        .chars()
        .filter(|c| !FORBIDDEN_DESCRIPTION_CHARS.contains(c))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(max_chars).collect();
    capped.trim_end().to_string()
}

/// Change-order number without its `"<job> - CO #"`, `"CO #"` or `"CO#"`
/// prefix; `"001"` when nothing is left.
pub fn change_order_number(change_order_id: &str, job_number: &str) -> String {
    let id = change_order_id.trim();
    let job_prefix = format!("{} - CO #", job_number.trim());
    let stripped = [job_prefix.as_str(), "CO #", "CO#"]
        .into_iter()
        .find_map(|prefix| strip_prefix_ignore_case(id, prefix))
        .unwrap_or(id)
        .trim();

    if stripped.is_empty() {
        "001".to_string()
    } else {
        stripped.to_string()
    }
}

/// Placeholder sequence derived from list position: `base + index + 1`.
pub fn change_order_sequence(base: u32, list_index: u32) -> u32 {
    base.saturating_add(list_index).saturating_add(1)
}

fn strip_prefix_ignore_case<'s>(value: &'s str, prefix: &str) -> Option<&'s str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn encode_path(prefix: &str, segments: &[&str]) -> String {
    let mut path = prefix.trim_end_matches('/').to_string();
    for segment in segments {
        path.push('/');
        path.extend(utf8_percent_encode(segment, SEGMENT));
    }
    path
}
