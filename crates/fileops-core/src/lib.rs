//! fileops - file management operations over a small archive core
//!
//! This library counts, lists, copies and moves file trees, packs and
//! unpacks ZIP/TAR/TAR.GZ archives, and plans PDF page selections. Every
//! operation is also reachable by name through [`tools::Toolbox`].

pub mod archive;
pub mod config;
pub mod error;
pub mod fsops;
pub mod pages;
pub mod range;
pub mod report;
pub mod security;
pub mod tools;
pub mod walk;

pub use error::{Error, Result};

// Re-export commonly used types
pub use archive::{create, extract, ArchiveFormat, ArchiveSpec, ExtractionSpec};
pub use config::Config;
pub use report::{render, OperationResult, ReportMeta};
pub use tools::{ToolResult, Toolbox};
pub use walk::{walk, FileEntry};
