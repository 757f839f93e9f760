//! # Jobfiles Tree
//!
//! Project file trees over a read-only asset store.
//!
//! ## Pipeline
//!
//! ```text
//! Project folder (store-relative)
//!     │
//!     ├──> Tree Builder (explicit work stack, depth budget)
//!     │      └─> Sorted FileNode tree, dotfiles and excluded names skipped
//!     │
//!     └──> Standard-Folder Merger
//!            └─> Catalog slots first, in order, placeholders where missing
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use jobfiles_tree::{FsStore, StandardFolders, TreeBuilder, TreeOptions};
//!
//! let store = FsStore::new("/srv/assets");
//! let prefix = "/assets/U2524_ Valley View";
//! let nodes = TreeBuilder::new(&store, prefix)
//!     .with_options(TreeOptions::unbounded())
//!     .build("U2524_ Valley View");
//! let tree = StandardFolders::default().merge(nodes, prefix);
//! println!("{} top-level entries", tree.len());
//! ```

mod builder;
mod error;
mod standard;
mod store;

pub use builder::{TreeBuilder, TreeOptions};
pub use error::{Result, TreeError};
pub use standard::{folder_key, StandardFolders, STANDARD_FOLDERS};
pub use store::{join_rel, AssetStore, FsStore, StoreEntry, StoreMetadata};
