//! # Jobfiles Resolver
//!
//! Turns loosely-structured project identifiers into folders, trees and
//! document paths on a shared asset store.
//!
//! ## Flows
//!
//! ```text
//! Project files
//!     job number + project name
//!     ├──> Folder Resolver (exact → unique prefix → name match → first prefix)
//!     ├──> Tree Builder
//!     └──> Standard-Folder Merger ──> FileNode tree
//!
//! Open document
//!     DocumentRecord
//!     ├──> stored path? ──────────────┐
//!     ├──> naming-convention templates │
//!     └──> Path Validator <────────────┘ ──> path or None
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use jobfiles_resolver::{DocumentRecord, DrawingRecord, EngineConfig, ProjectFiles};
//!
//! let config = EngineConfig::default().with_asset_root("/srv/assets");
//! let files = ProjectFiles::open(config)?;
//!
//! let tree = files.project_tree("U2524", Some("Valley View"))?;
//! println!("{} top-level entries", tree.nodes().len());
//!
//! let record = DocumentRecord::Drawing(DrawingRecord {
//!     job_number: Some("U2524".into()),
//!     drawing_number: Some("r1".into()),
//!     ..Default::default()
//! });
//! println!("{:?}", files.document_path(&record));
//! # Ok::<(), jobfiles_resolver::ResolverError>(())
//! ```

mod config;
mod documents;
mod engine;
mod error;
mod folder;
mod identifiers;

pub use config::EngineConfig;
pub use documents::{
    change_order_number, change_order_sequence, sanitize_description, stored_path_url,
    ChangeOrderRecord, DocumentCategory, DocumentPathResolver, DocumentRecord, DrawingRecord,
    InvoiceRecord, RfiRecord, SubmissionRecord,
};
pub use engine::{ProjectFiles, ProjectTree};
pub use error::{ResolverError, Result};
pub use folder::{match_project_folder, FolderResolution, FolderResolver, MatchStrategy};
pub use identifiers::{extract_job_number, normalize_drawing_number, project_folder_name};
