//! Zip packing and extraction

use super::extractor::{Extractor, PackEntry, Packer};
use super::ArchiveFormat;
use crate::security::enclosed_path;
use crate::walk::walk;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Zip writer with a deflate level
pub struct ZipPacker {
    level: u32,
}

impl ZipPacker {
    /// Level 0 stores entries uncompressed, 1-9 deflates at that level
    pub fn new(level: u32) -> Self {
        Self { level }
    }

    fn file_options(&self) -> SimpleFileOptions {
        if self.level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.level as i64))
        }
    }
}

impl Packer for ZipPacker {
    fn pack(&self, entries: &[PackEntry], output: File) -> Result<()> {
        let mut zip = ZipWriter::new(output);
        let options = self.file_options();

        for entry in entries {
            if entry.is_dir {
                debug!("Adding directory to ZIP: {}/", entry.name);
                zip.add_directory(
                    entry.name.as_str(),
                    SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
                )
                .map_err(|e| write_error(entry, e))?;
                continue;
            }

            debug!("Adding file to ZIP: {:?} as {}", entry.source, entry.name);
            let mut source = File::open(&entry.source).map_err(|e| write_error(entry, e))?;

            #[cfg(unix)]
            let options = {
                use std::os::unix::fs::PermissionsExt;
                let mode = source
                    .metadata()
                    .map_err(|e| write_error(entry, e))?
                    .permissions()
                    .mode();
                options.unix_permissions(mode)
            };

            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| write_error(entry, e))?;
            io::copy(&mut source, &mut zip).map_err(|e| write_error(entry, e))?;
        }

        zip.finish()
            .map_err(|e| Error::ArchiveWrite(format!("cannot finish ZIP: {}", e)))?
            .sync_all()?;
        Ok(())
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

fn write_error(entry: &PackEntry, err: impl std::fmt::Display) -> Error {
    Error::ArchiveWrite(format!("{} ({:?}): {}", entry.name, entry.source, err))
}

/// Zip extractor
#[derive(Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ZipExtractor {
    fn extract_all(&self, source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(source)?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| Error::ArchiveRead(format!("{}: {}", source.display(), e)))?;

        let mut expected = HashSet::new();

        for i in 0..archive.len() {
            let mut zip_file = archive
                .by_index(i)
                .map_err(|e| Error::ArchiveRead(format!("entry {}: {}", i, e)))?;

            let Some(relative) = enclosed_path(Path::new(zip_file.name())) else {
                warn!("Skipping unsafe ZIP entry: {}", zip_file.name());
                continue;
            };
            let dest_path = destination.join(&relative);

            if zip_file.is_dir() {
                fs::create_dir_all(&dest_path)?;
                continue;
            }

            debug!("Extracting: {:?}", relative);
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&dest_path)?;
            io::copy(&mut zip_file, &mut output)
                .map_err(|e| Error::ArchiveRead(format!("{}: {}", zip_file.name(), e)))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = zip_file.unix_mode() {
                    fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode & 0o7777))?;
                }
            }

            expected.insert(dest_path);
        }

        // the zip reader gives no per-file report, so recover it from disk
        let written: Vec<PathBuf> = walk(destination)?
            .map(|entry| entry.absolute_path)
            .filter(|path| expected.contains(path))
            .collect();

        info!("Extracted {} files from ZIP", written.len());
        Ok(written)
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}
