//! Common assertions

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Asserts that two directory trees hold the same relative paths, entry
/// kinds and file contents
pub fn assert_dirs_equal(dir1: &Path, dir2: &Path) -> Result<()> {
    let entries1 = collect_entries(dir1)?;
    let entries2 = collect_entries(dir2)?;

    assert_eq!(
        entries1, entries2,
        "Different entries under {:?} and {:?}",
        dir1, dir2
    );

    for relative in &entries1 {
        let path1 = dir1.join(relative);
        let path2 = dir2.join(relative);
        let meta1 = std::fs::metadata(&path1)?;
        let meta2 = std::fs::metadata(&path2)?;

        assert_eq!(
            meta1.is_file(),
            meta2.is_file(),
            "File type mismatch for {:?}",
            relative
        );

        if meta1.is_file() {
            assert_eq!(
                std::fs::read(&path1)?,
                std::fs::read(&path2)?,
                "Content mismatch for {:?}",
                relative
            );
        }
    }

    Ok(())
}

/// Asserts that `path` has the same size as `original`
pub fn assert_same_size(path: &Path, original: &Path) -> Result<()> {
    let size = std::fs::metadata(path)?.len();
    let expected = std::fs::metadata(original)?.len();
    assert_eq!(size, expected, "Size mismatch for {:?}", path);
    Ok(())
}

/// Asserts that a file has specific permissions (Unix only)
#[cfg(unix)]
pub fn assert_file_permissions(path: &Path, expected: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    assert_eq!(
        mode, expected,
        "Permission mismatch for {:?}: expected {:o}, got {:o}",
        path, expected, mode
    );

    Ok(())
}

fn collect_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry?;
        entries.push(entry.path().strip_prefix(dir)?.to_path_buf());
    }
    entries.sort();
    Ok(entries)
}
