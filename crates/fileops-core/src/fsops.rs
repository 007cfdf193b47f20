//! Counting, listing, copying and moving

use crate::report::OperationResult;
use crate::walk::{path_size, walk_with, WalkOptions};
use crate::{Error, Result};
use filetime::FileTime;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One direct child of a listed folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size: u64,
}

/// Count the direct children of `folder` (files and directories alike)
/// together with the files of its whole tree.
///
/// Returns the number of direct entries; the result's `items_processed`
/// and `total_bytes_in` hold the recursive file count and size.
pub fn count_entries(folder: &Path) -> Result<(u64, OperationResult)> {
    let direct = read_dir_checked(folder)?.count() as u64;
    let summary = walk_with(folder, WalkOptions::accounting())?.summarize();

    Ok((
        direct,
        OperationResult {
            items_processed: summary.files,
            total_bytes_in: summary.bytes,
            ..Default::default()
        },
    ))
}

/// List the direct children of `folder`, sorted by name. Dot-entries are
/// left out unless `include_hidden` is set; unreadable entries are skipped.
pub fn list_entries(folder: &Path, include_hidden: bool) -> Result<Vec<ListedEntry>> {
    let mut entries = Vec::new();

    for entry in read_dir_checked(folder)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry in {:?}: {}", folder, err);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if !include_hidden && name.starts_with('.') {
            continue;
        }

        match fs::metadata(entry.path()) {
            Ok(metadata) => entries.push(ListedEntry {
                name,
                is_dir: metadata.is_dir(),
                size: if metadata.is_file() { metadata.len() } else { 0 },
            }),
            Err(err) => warn!("Skipping {:?}: {}", entry.path(), err),
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Copy a file or directory tree to `target`.
///
/// Directories are merged into an existing target when `overwrite` is set.
pub fn copy_path(
    source: &Path,
    target: &Path,
    overwrite: bool,
    preserve_timestamps: bool,
) -> Result<OperationResult> {
    stat_source(source)?;
    if target.exists() && !overwrite {
        return Err(Error::AlreadyExists(target.to_path_buf()));
    }
    reject_overlap(&resolve(source)?, &resolve(target)?, "copy")?;

    info!("Copying {:?} to {:?}", source, target);
    let total_bytes_in = path_size(source)?;
    let (files, bytes) = copy_tree(source, target, preserve_timestamps)?;

    Ok(OperationResult {
        items_processed: files,
        total_bytes_in,
        total_bytes_out: bytes,
        output_paths: vec![target.to_path_buf()],
    })
}

/// Move a file or directory tree to `target`, falling back to copy and
/// delete when a rename is not possible (e.g. across filesystems).
pub fn move_path(source: &Path, target: &Path, overwrite: bool) -> Result<OperationResult> {
    stat_source(source)?;
    let resolved_source = resolve(source)?;
    let resolved_target = resolve(target)?;
    if resolved_source == resolved_target {
        return Err(Error::InvalidArgument(
            "source and target are the same path".to_string(),
        ));
    }
    if target.exists() && !overwrite {
        return Err(Error::AlreadyExists(target.to_path_buf()));
    }
    // checked before the target is removed below
    reject_overlap(&resolved_source, &resolved_target, "move")?;

    let summary = walk_with(source, WalkOptions::default())?.summarize();
    info!("Moving {:?} to {:?}", source, target);

    if target.exists() {
        remove_path(target)?;
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(err) = fs::rename(source, target) {
        debug!("Rename failed ({}), copying instead", err);
        copy_tree(source, target, true)?;
        remove_path(source)?;
    }

    Ok(OperationResult {
        items_processed: summary.files,
        total_bytes_in: summary.bytes,
        total_bytes_out: summary.bytes,
        output_paths: vec![target.to_path_buf()],
    })
}

fn copy_tree(source: &Path, target: &Path, preserve_timestamps: bool) -> Result<(u64, u64)> {
    let metadata = fs::metadata(source)?;

    if !metadata.is_dir() {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = copy_file(source, target, &metadata, preserve_timestamps)?;
        return Ok((1, bytes));
    }

    fs::create_dir_all(target)?;
    let options = WalkOptions {
        include_dirs: true,
        ..Default::default()
    };

    let (mut files, mut bytes) = (0, 0);
    for entry in walk_with(source, options)? {
        let dest = target.join(&entry.relative_path);
        if entry.is_dir {
            fs::create_dir_all(&dest)?;
            continue;
        }
        let entry_meta = match fs::metadata(&entry.absolute_path) {
            Ok(meta) => meta,
            Err(err) => {
                warn!("Skipping {:?}: {}", entry.absolute_path, err);
                continue;
            }
        };
        bytes += copy_file(&entry.absolute_path, &dest, &entry_meta, preserve_timestamps)?;
        files += 1;
    }

    Ok((files, bytes))
}

fn copy_file(
    source: &Path,
    target: &Path,
    metadata: &fs::Metadata,
    preserve_timestamps: bool,
) -> Result<u64> {
    debug!("Copying file {:?} -> {:?}", source, target);
    let bytes = fs::copy(source, target)?;
    if preserve_timestamps {
        let atime = FileTime::from_last_access_time(metadata);
        let mtime = FileTime::from_last_modification_time(metadata);
        filetime::set_file_times(target, atime, mtime)?;
    }
    Ok(bytes)
}

fn remove_path(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Refuse a target inside the source tree, and a target that contains the
/// source. Both paths must already be resolved.
fn reject_overlap(source: &Path, target: &Path, operation: &str) -> Result<()> {
    if target.starts_with(source) {
        return Err(Error::InvalidArgument(format!(
            "cannot {} {} into itself ({})",
            operation,
            source.display(),
            target.display()
        )));
    }
    if source.starts_with(target) {
        return Err(Error::InvalidArgument(format!(
            "cannot {} {} onto {}, which contains it",
            operation,
            source.display(),
            target.display()
        )));
    }
    Ok(())
}

/// Absolute form of `path` with symlinks resolved for the part that exists
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return Ok(missing
                .iter()
                .rev()
                .fold(canonical, |resolved, name| resolved.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

fn stat_source(source: &Path) -> Result<fs::Metadata> {
    fs::metadata(source).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(source.to_path_buf()),
        _ => Error::Io(err),
    })
}

fn read_dir_checked(folder: &Path) -> Result<fs::ReadDir> {
    let metadata = stat_source(folder)?;
    if !metadata.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            folder.display()
        )));
    }
    Ok(fs::read_dir(folder)?)
}

/// Default folder for counting and listing when none is given
pub fn default_folder() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), b"aaaa").unwrap();
        fs::write(root.join(".hidden"), b"h").unwrap();
        fs::write(root.join("sub/b.txt"), b"bb").unwrap();
    }

    #[test]
    fn test_count_entries() {
        let temp_dir = TempDir::new().unwrap();
        tree(temp_dir.path());

        let (direct, result) = count_entries(temp_dir.path()).unwrap();
        assert_eq!(direct, 3);
        assert_eq!(result.items_processed, 3);
        assert_eq!(result.total_bytes_in, 7);
    }

    #[test]
    fn test_list_entries_hidden_filter() {
        let temp_dir = TempDir::new().unwrap();
        tree(temp_dir.path());

        let visible = list_entries(temp_dir.path(), false).unwrap();
        let names: Vec<_> = visible.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
        assert_eq!(visible[0].size, 4);
        assert!(visible[1].is_dir);

        assert_eq!(list_entries(temp_dir.path(), true).unwrap().len(), 3);
        assert!(matches!(
            list_entries(&temp_dir.path().join("a.txt"), false),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_copy_tree_and_refuse_existing() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        tree(&source);
        let target = temp_dir.path().join("dst");

        let result = copy_path(&source, &target, false, true).unwrap();
        assert_eq!(result.items_processed, 3);
        assert_eq!(result.total_bytes_out, 7);
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), b"bb");

        let src_mtime = fs::metadata(source.join("a.txt")).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(target.join("a.txt")).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);

        assert!(matches!(
            copy_path(&source, &target, false, true),
            Err(Error::AlreadyExists(_))
        ));
        assert!(copy_path(&source, &target, true, false).is_ok());
        assert!(matches!(
            copy_path(&source, &source.join("sub/inner"), true, false),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_move_file_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        tree(&source);

        let moved = temp_dir.path().join("nested/dir/moved");
        let result = move_path(&source, &moved, false).unwrap();
        assert_eq!(result.items_processed, 3);
        assert!(!source.exists());
        assert_eq!(fs::read(moved.join("a.txt")).unwrap(), b"aaaa");

        assert!(matches!(
            move_path(&moved, &moved, true),
            Err(Error::InvalidArgument(_))
        ));

        let other = temp_dir.path().join("other.txt");
        fs::write(&other, b"x").unwrap();
        assert!(matches!(
            move_path(&other, &moved.join("a.txt"), false),
            Err(Error::AlreadyExists(_))
        ));
        move_path(&other, &moved.join("a.txt"), true).unwrap();
        assert_eq!(fs::read(moved.join("a.txt")).unwrap(), b"x");
    }

    #[test]
    fn test_overwrite_onto_ancestor_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let parent = temp_dir.path().join("parent");
        let child = parent.join("child");
        fs::create_dir_all(&child).unwrap();
        fs::write(child.join("precious.txt"), b"keep").unwrap();
        fs::write(parent.join("other.txt"), b"other").unwrap();

        assert!(matches!(
            move_path(&child, &parent, true),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            move_path(&child.join("precious.txt"), &child, true),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            copy_path(&child, &parent, true, true),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            copy_path(&parent.join("other.txt"), &parent, true, true),
            Err(Error::InvalidArgument(_))
        ));

        assert_eq!(fs::read(child.join("precious.txt")).unwrap(), b"keep");
        assert_eq!(fs::read(parent.join("other.txt")).unwrap(), b"other");
    }

    #[test]
    fn test_move_into_own_subtree_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        tree(&source);

        assert!(matches!(
            move_path(&source, &source.join("sub/deeper/moved"), false),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            move_path(&source.join("sub/../sub"), &source, true),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(fs::read(source.join("sub/b.txt")).unwrap(), b"bb");
    }

    #[test]
    fn test_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            copy_path(&missing, &temp_dir.path().join("x"), false, true),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            move_path(&missing, &temp_dir.path().join("x"), false),
            Err(Error::NotFound(_))
        ));
    }
}
