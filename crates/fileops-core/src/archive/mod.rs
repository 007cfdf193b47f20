//! Archive operations module
//!
//! [`create`] packs files and directories into ZIP, TAR or TAR.GZ;
//! [`extract`] unpacks them again. The format is resolved once into an
//! [`ArchiveFormat`] and dispatched to a [`Packer`] or [`Extractor`]
//! implementation, so the operations themselves never branch on strings.

pub mod extractor;
pub mod format;
pub mod tar;
pub mod zip;

pub use extractor::{Extractor, PackEntry, Packer};
pub use format::ArchiveFormat;

use crate::report::OperationResult;
use crate::walk::{path_size, walk_with, WalkOptions};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Highest accepted compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Default compression level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// What to pack and where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSpec {
    /// Files and directories to pack, in order
    pub inputs: Vec<PathBuf>,
    /// Archive file to write
    pub output_path: PathBuf,
    /// Archive format
    pub format: ArchiveFormat,
    /// Compression level 0-9 (deflate for ZIP, gzip for TAR.GZ, unused for TAR)
    pub compression_level: u32,
}

impl ArchiveSpec {
    /// Pack `inputs` into `output_path` with the default format and level
    pub fn new<I, P, Q>(inputs: I, output_path: Q) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output_path: output_path.into(),
            format: ArchiveFormat::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Set the archive format
    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the compression level
    pub fn with_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Check every input exists and the level is in range
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::InvalidArgument("no input files given".to_string()));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(Error::InvalidArgument(format!(
                "compression level {} is outside 0-{}",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        for input in &self.inputs {
            if fs::metadata(input).is_err() {
                return Err(Error::NotFound(input.clone()));
            }
        }
        Ok(())
    }
}

/// What to unpack and where
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSpec {
    /// Archive to read; its name decides the format
    pub archive_path: PathBuf,
    /// Directory to unpack into (created if missing)
    pub target_dir: PathBuf,
    /// Allow unpacking into a directory that already has entries
    pub overwrite: bool,
}

impl ExtractionSpec {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(archive_path: P, target_dir: Q) -> Self {
        Self {
            archive_path: archive_path.into(),
            target_dir: target_dir.into(),
            overwrite: false,
        }
    }

    /// Set the overwrite flag
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Create the packer for a format
pub fn create_packer(format: ArchiveFormat, level: u32) -> Box<dyn Packer> {
    match format {
        ArchiveFormat::Zip => Box::new(zip::ZipPacker::new(level)),
        ArchiveFormat::Tar => Box::new(tar::TarPacker::new()),
        ArchiveFormat::TarGz => Box::new(tar::TarPacker::gzip(level)),
    }
}

/// Create the extractor for a format
pub fn create_extractor(format: ArchiveFormat) -> Box<dyn Extractor> {
    match format {
        ArchiveFormat::Zip => Box::new(zip::ZipExtractor::new()),
        ArchiveFormat::Tar => Box::new(tar::TarExtractor::new()),
        ArchiveFormat::TarGz => Box::new(tar::TarExtractor::gzip()),
    }
}

/// Pack the inputs of `spec` into a new archive.
///
/// A partially written archive is left in place when packing fails.
pub fn create(spec: &ArchiveSpec) -> Result<OperationResult> {
    spec.validate()?;

    info!(
        "Packing {} inputs into {} {:?} (level {})",
        spec.inputs.len(),
        spec.format.label(),
        spec.output_path,
        spec.compression_level
    );

    let total_bytes_in = spec
        .inputs
        .iter()
        .map(path_size)
        .sum::<Result<u64>>()
        .map_err(vanished)?;

    let entries = plan_entries(
        &spec.inputs,
        spec.format.stores_directories(),
        Some(&spec.output_path),
    )?;

    if let Some(parent) = spec.output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let output = File::create(&spec.output_path).map_err(|e| {
        Error::ArchiveWrite(format!("cannot open {:?}: {}", spec.output_path, e))
    })?;

    create_packer(spec.format, spec.compression_level).pack(&entries, output)?;

    let total_bytes_out = fs::metadata(&spec.output_path)?.len();
    let files = entries.iter().filter(|e| !e.is_dir).count() as u64;

    info!("Successfully packed {} files into {:?}", files, spec.output_path);

    Ok(OperationResult {
        items_processed: files,
        total_bytes_in,
        total_bytes_out,
        output_paths: vec![spec.output_path.clone()],
    })
}

/// Unpack the archive of `spec` into its target directory
pub fn extract(spec: &ExtractionSpec) -> Result<OperationResult> {
    let archive_meta = fs::metadata(&spec.archive_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(spec.archive_path.clone()),
        _ => Error::Io(e),
    })?;
    let format = ArchiveFormat::detect(&spec.archive_path)?;

    prepare_target(&spec.target_dir, spec.overwrite)?;
    let target = std::path::absolute(&spec.target_dir)?;

    info!(
        "Extracting {} {:?} to {:?} (overwrite: {})",
        format.label(),
        spec.archive_path,
        target,
        spec.overwrite
    );

    let files = create_extractor(format).extract_all(&spec.archive_path, &target)?;

    // a file removed between unpacking and stat is simply left out
    let total_bytes_out = files
        .iter()
        .filter_map(|path| fs::metadata(path).ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum();

    Ok(OperationResult {
        items_processed: files.len() as u64,
        total_bytes_in: archive_meta.len(),
        total_bytes_out,
        output_paths: files,
    })
}

/// Ensure `target` is a directory and, without overwrite, that it is empty
fn prepare_target(target: &Path, overwrite: bool) -> Result<()> {
    if target.exists() && !target.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} exists and is not a directory",
            target.display()
        )));
    }
    fs::create_dir_all(target)?;

    if !overwrite && fs::read_dir(target)?.next().is_some() {
        return Err(Error::TargetNotEmpty(target.to_path_buf()));
    }
    Ok(())
}

/// Flatten the inputs into the list of entries to write.
///
/// Each top-level input is named by its basename; directory contents keep
/// their structure below it. When two entries end up with the same name the
/// later one replaces the earlier one. `exclude` keeps the archive being
/// written out of its own contents.
pub fn plan_entries(
    inputs: &[PathBuf],
    include_dirs: bool,
    exclude: Option<&Path>,
) -> Result<Vec<PackEntry>> {
    let exclude = exclude.map(std::path::absolute).transpose()?;
    let mut entries = Vec::new();

    for input in inputs {
        let metadata = fs::metadata(input).map_err(|_| {
            Error::ArchiveWrite(format!("input disappeared before packing: {:?}", input))
        })?;
        let absolute = std::path::absolute(input)?;
        let base_name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidPath(format!("{:?} has no file name", input)))?;

        if !metadata.is_dir() {
            entries.push(PackEntry {
                name: base_name,
                source: absolute,
                is_dir: false,
                size: metadata.len(),
            });
            continue;
        }

        if include_dirs {
            entries.push(PackEntry {
                name: base_name.clone(),
                source: absolute.clone(),
                is_dir: true,
                size: 0,
            });
        }

        let options = WalkOptions {
            include_dirs,
            ..Default::default()
        };
        for entry in walk_with(&absolute, options)? {
            if exclude.as_deref() == Some(entry.absolute_path.as_path()) {
                continue;
            }
            let relative = entry.relative_path.to_string_lossy().replace('\\', "/");
            entries.push(PackEntry {
                name: format!("{}/{}", base_name, relative),
                source: entry.absolute_path,
                is_dir: entry.is_dir,
                size: entry.size_bytes,
            });
        }
    }

    Ok(last_write_wins(entries))
}

/// Keep the last entry for every name. A later file named `N` also drops
/// earlier entries under `N/`, and later entries under `N/` drop an earlier
/// file `N`, so the plan never holds a file and a directory at one path.
fn last_write_wins(entries: Vec<PackEntry>) -> Vec<PackEntry> {
    // name -> is_dir for everything kept so far, walking from the end
    let mut kept: HashMap<String, bool> = HashMap::new();
    let mut parents: HashSet<String> = HashSet::new();
    let mut planned = Vec::with_capacity(entries.len());

    for entry in entries.into_iter().rev() {
        let same_name = kept.get(&entry.name).copied();
        let under_file = ancestors(&entry.name).any(|name| kept.get(name) == Some(&false));
        let over_dir = !entry.is_dir && parents.contains(&entry.name);

        if same_name.is_some() || under_file || over_dir {
            if !(entry.is_dir && same_name == Some(true)) {
                warn!(
                    "Duplicate archive name {}: dropping {:?} for a later input",
                    entry.name, entry.source
                );
            }
            continue;
        }

        parents.extend(ancestors(&entry.name).map(str::to_string));
        kept.insert(entry.name.clone(), entry.is_dir);
        planned.push(entry);
    }

    planned.reverse();
    planned
}

/// `a`, `a/b` for the name `a/b/c`
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    name.match_indices('/').map(move |(i, _)| &name[..i])
}

fn vanished(err: Error) -> Error {
    match err {
        Error::NotFound(path) => {
            Error::ArchiveWrite(format!("input disappeared before packing: {:?}", path))
        }
        other => other,
    }
}
