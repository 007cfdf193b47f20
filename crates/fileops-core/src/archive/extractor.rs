//! Per-format packing and extraction traits

use super::ArchiveFormat;
use crate::Result;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One item scheduled for writing into an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    /// Name inside the archive, `/`-separated, without a trailing slash
    pub name: String,
    /// Source on disk
    pub source: PathBuf,
    /// Whether this is a directory entry
    pub is_dir: bool,
    /// Source size in bytes (0 for directories)
    pub size: u64,
}

/// Writes a planned entry list into an output file
pub trait Packer {
    /// Write every entry into `output`, finishing and flushing the stream
    /// before returning.
    fn pack(&self, entries: &[PackEntry], output: File) -> Result<()>;

    /// Format produced by this packer
    fn format(&self) -> ArchiveFormat;
}

/// Unpacks an archive and reports what it wrote.
///
/// Implementations differ in how they learn about entries (tar visits each
/// entry as it unpacks it, zip is re-walked afterwards) but both return the
/// same thing: the absolute path of every regular file written. Directories
/// are never listed.
pub trait Extractor {
    /// Unpack `source` into the existing directory `destination`
    fn extract_all(&self, source: &Path, destination: &Path) -> Result<Vec<PathBuf>>;

    /// Format read by this extractor
    fn format(&self) -> ArchiveFormat;
}
