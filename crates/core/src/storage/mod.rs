//! Blob storage for file content using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - Local filesystem
//! - S3-compatible: MinIO, AWS S3, Cloudflare R2
//! - Aliyun OSS
//! - In-process memory (development and tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 BlobStore (put/get/delete/signed_url)            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                 StorageService (deadline per call)               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   Apache OpenDAL Operator:  fs │ s3 │ oss │ memory              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The provider is chosen once from configuration; the resulting service is
//! handed to the drive engine explicitly.

mod blob;
mod config;
mod error;
mod service;

pub use blob::{BlobStore, PresignedUrl};
pub use config::StorageConfig;
pub use cumulus_shared::StorageProvider;
pub use error::StorageError;
pub use service::StorageService;
