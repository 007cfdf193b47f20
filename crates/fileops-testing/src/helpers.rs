//! Helper utilities for archive tests

use anyhow::Result;
use fileops_core::{create, extract, ArchiveFormat, ArchiveSpec, ExtractionSpec, OperationResult};
use std::path::{Path, PathBuf};

/// File name used for an archive of `format`
pub fn archive_name(stem: &str, format: ArchiveFormat) -> String {
    match format {
        ArchiveFormat::Zip => format!("{}.zip", stem),
        ArchiveFormat::Tar => format!("{}.tar", stem),
        ArchiveFormat::TarGz => format!("{}.tar.gz", stem),
    }
}

/// Packs `inputs` into `output` with the default level
pub fn pack(inputs: &[PathBuf], output: &Path, format: ArchiveFormat) -> Result<OperationResult> {
    Ok(create(
        &ArchiveSpec::new(inputs.iter().cloned(), output).with_format(format),
    )?)
}

/// Unpacks `archive` into `target`, which must be empty or absent
pub fn unpack(archive: &Path, target: &Path) -> Result<OperationResult> {
    Ok(extract(&ExtractionSpec::new(archive, target))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::assert_dirs_equal;
    use crate::fixtures::create_test_files;
    use crate::TestDir;

    #[test]
    fn test_pack_unpack_every_format() {
        for format in [ArchiveFormat::Zip, ArchiveFormat::Tar, ArchiveFormat::TarGz] {
            let source = TestDir::new().unwrap();
            create_test_files(&source).unwrap();
            let work = TestDir::new().unwrap();

            let archive = work.join(&archive_name("bundle", format));
            let packed = pack(&[source.path().to_path_buf()], &archive, format).unwrap();
            assert_eq!(packed.items_processed, 6);

            let out = work.join("out");
            unpack(&archive, &out).unwrap();

            let root_name = source.path().file_name().unwrap().to_string_lossy().into_owned();
            assert_dirs_equal(source.path(), &out.join(root_name)).unwrap();
        }
    }
}
