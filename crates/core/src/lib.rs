//! Core drive logic for Cumulus.
//!
//! This crate contains the hierarchical file metadata engine with ZERO web or
//! database dependencies. The metadata store and the blob store are reached
//! through traits so the engine can run against any backend.
//!
//! # Modules
//!
//! - `storage` - Blob store abstraction backed by Apache OpenDAL
//! - `drive` - File/folder tree mutations, listing, search, and upload/download orchestration

pub mod drive;
pub mod storage;
