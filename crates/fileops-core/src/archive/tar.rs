//! Tar and gzip tar packing and extraction

use super::extractor::{Extractor, PackEntry, Packer};
use super::ArchiveFormat;
use crate::security::enclosed_path;
use crate::{Error, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, EntryType};
use tracing::{debug, info, warn};

/// Tar writer, optionally gzip-compressed
pub struct TarPacker {
    gzip_level: Option<u32>,
}

impl TarPacker {
    /// Plain tar
    pub fn new() -> Self {
        Self { gzip_level: None }
    }

    /// Tar wrapped in gzip at `level` (0-9)
    pub fn gzip(level: u32) -> Self {
        Self {
            gzip_level: Some(level),
        }
    }
}

impl Default for TarPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl Packer for TarPacker {
    fn pack(&self, entries: &[PackEntry], output: File) -> Result<()> {
        let output = BufWriter::new(output);

        match self.gzip_level {
            None => {
                let mut builder = Builder::new(output);
                append_entries(&mut builder, entries)?;
                let mut output = builder.into_inner().map_err(finish_error)?;
                output.flush()?;
            }
            Some(level) => {
                let encoder = GzEncoder::new(output, Compression::new(level));
                let mut builder = Builder::new(encoder);
                append_entries(&mut builder, entries)?;
                let encoder = builder.into_inner().map_err(finish_error)?;
                let mut output = encoder.finish().map_err(finish_error)?;
                output.flush()?;
            }
        }

        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        match self.gzip_level {
            None => ArchiveFormat::Tar,
            Some(_) => ArchiveFormat::TarGz,
        }
    }
}

/// Append regular files only; directories are implied by the file names
fn append_entries<W: Write>(builder: &mut Builder<W>, entries: &[PackEntry]) -> Result<()> {
    for entry in entries.iter().filter(|e| !e.is_dir) {
        debug!("Adding file: {:?} as {}", entry.source, entry.name);
        builder
            .append_path_with_name(&entry.source, &entry.name)
            .map_err(|e| {
                Error::ArchiveWrite(format!("{} ({:?}): {}", entry.name, entry.source, e))
            })?;
    }
    Ok(())
}

fn finish_error(err: std::io::Error) -> Error {
    Error::ArchiveWrite(format!("cannot finish tar stream: {}", err))
}

/// Tar extractor
pub struct TarExtractor {
    gzip: bool,
}

impl TarExtractor {
    /// Plain tar
    pub fn new() -> Self {
        Self { gzip: false }
    }

    /// Gzip-compressed tar
    pub fn gzip() -> Self {
        Self { gzip: true }
    }

    fn create_reader(&self, file: File) -> Box<dyn Read> {
        let reader = BufReader::new(file);
        if self.gzip {
            Box::new(GzDecoder::new(reader))
        } else {
            Box::new(reader)
        }
    }
}

impl Default for TarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for TarExtractor {
    fn extract_all(&self, source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(source)?;
        let mut archive = Archive::new(self.create_reader(file));
        archive.set_overwrite(true);

        let read_error = |e: std::io::Error| Error::ArchiveRead(format!("{}: {}", source.display(), e));
        let mut written = Vec::new();

        for entry in archive.entries().map_err(read_error)? {
            let mut entry = entry.map_err(read_error)?;
            let entry_path = entry.path().map_err(read_error)?.into_owned();
            let entry_type = entry.header().entry_type();

            let Some(relative) = enclosed_path(&entry_path) else {
                warn!("Skipping unsafe tar entry: {:?}", entry_path);
                continue;
            };

            debug!("Extracting: {:?} ({:?})", relative, entry_type);
            let unpacked = entry.unpack_in(destination).map_err(read_error)?;

            if unpacked && matches!(entry_type, EntryType::Regular | EntryType::Continuous) {
                written.push(destination.join(relative));
            }
        }

        info!("Extracted {} files from {}", written.len(), self.format().label());
        Ok(written)
    }

    fn format(&self) -> ArchiveFormat {
        if self.gzip {
            ArchiveFormat::TarGz
        } else {
            ArchiveFormat::Tar
        }
    }
}
