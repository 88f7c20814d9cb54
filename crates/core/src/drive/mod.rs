//! Hierarchical file metadata engine.
//!
//! Keeps a per-user tree of [`FileNode`] records consistent and coordinates it
//! with a [`BlobStore`](crate::storage::BlobStore).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 DriveService                 │
//! │  tree.rs     create_folder, rename,          │
//! │              batch_move, delete, paths       │
//! │  listing.rs  list, search                    │
//! │  transfer.rs upload, download, signed URLs   │
//! └───────────────┬──────────────────┬───────────┘
//!                 │                  │
//!      ┌──────────▼───────┐  ┌───────▼────────┐
//!      │  FileRepository  │  │   BlobStore    │
//!      │ (memory / SeaORM)│  │   (OpenDAL)    │
//!      └──────────────────┘  └────────────────┘
//! ```
//!
//! # Consistency
//!
//! There is no transaction spanning the two stores. Create writes the blob
//! before the record; delete removes the blob before the record. A failure
//! between the two steps can orphan a blob but never leaves a record
//! pointing at missing content.

mod config;
mod error;
mod listing;
mod memory;
mod naming;
mod repository;
mod service;
mod sort;
mod transfer;
mod tree;
mod types;

#[cfg(test)]
mod test_support;


pub use config::{DriveConfig, RenamePolicy};
pub use error::DriveError;
pub use memory::InMemoryFileRepository;
pub use naming::{MAX_NAME_CHARS, NameRegistry, split_extension, validate_name};
pub use repository::FileRepository;
pub use service::DriveService;
pub use sort::{SortDirection, SortField, SortKey, SortSpec, compare_nodes};
pub use transfer::{content_hash, storage_key_for};
pub use types::{DeleteSummary, FileNode, StoredBlob, UploadRequest};
