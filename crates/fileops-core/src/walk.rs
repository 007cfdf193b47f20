//! Filesystem tree walking
//!
//! [`walk`] enumerates a subtree depth-first and yields one [`FileEntry`] per
//! regular file. Directories are descended into but only reported when
//! [`WalkOptions::include_dirs`] is set. The traversal is driven by
//! `walkdir`, which keeps its own explicit stack, so pathological trees do
//! not grow the call stack.
//!
//! Per-entry failures (permission denied, broken symlinks, symlink loops)
//! never abort a walk: they are logged and skipped, and counted in
//! [`Walk::skipped`]. Only a missing root, or a non-directory root when a
//! directory walk is requested, is an error.

use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A single entry produced by a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute location on disk
    pub absolute_path: PathBuf,
    /// Location relative to the walk base (the root itself for directory
    /// roots, the root's parent for file roots)
    pub relative_path: PathBuf,
    /// Whether this entry is a directory
    pub is_dir: bool,
    /// Size in bytes (0 for directories)
    pub size_bytes: u64,
}

/// Options controlling a walk
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Emit directory entries as well as files
    pub include_dirs: bool,
    /// Follow symbolic links (loops are detected and skipped)
    pub follow_links: bool,
    /// Include dot-files and descend into dot-directories
    pub include_hidden: bool,
    /// Fail unless the root is a directory
    pub require_dir: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_dirs: false,
            follow_links: true,
            include_hidden: true,
            require_dir: false,
        }
    }
}

impl WalkOptions {
    /// Options for size and count accounting over a directory
    pub fn accounting() -> Self {
        Self {
            include_dirs: true,
            require_dir: true,
            ..Default::default()
        }
    }
}

/// Aggregate of a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Number of file entries
    pub files: u64,
    /// Number of directory entries
    pub dirs: u64,
    /// Sum of file sizes in bytes
    pub bytes: u64,
}

impl WalkSummary {
    fn add(mut self, entry: &FileEntry) -> Self {
        if entry.is_dir {
            self.dirs += 1;
        } else {
            self.files += 1;
            self.bytes += entry.size_bytes;
        }
        self
    }
}

/// Iterator over the entries of a subtree
pub struct Walk {
    inner: walkdir::IntoIter,
    base: PathBuf,
    options: WalkOptions,
    skipped: usize,
}

impl Walk {
    /// Number of entries skipped so far because they could not be read
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Consume the walk and fold it into a summary
    pub fn summarize(self) -> WalkSummary {
        summarize(self)
    }

    fn skip(&mut self, path: Option<&Path>, reason: &dyn std::fmt::Display) {
        self.skipped += 1;
        warn!(path = ?path, "Skipping unreadable entry: {}", reason);
    }
}

impl Iterator for Walk {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if err.loop_ancestor().is_some() {
                        debug!("Symlink loop detected, not descending: {}", err);
                    }
                    let path = err.path().map(Path::to_path_buf);
                    self.skip(path.as_deref(), &err);
                    continue;
                }
            };

            if !self.options.include_hidden && entry.depth() > 0 && is_hidden(entry.file_name()) {
                if entry.file_type().is_dir() {
                    self.inner.skip_current_dir();
                }
                continue;
            }

            let path = entry.path();
            let relative_path = path.strip_prefix(&self.base).unwrap_or(path).to_path_buf();
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if self.options.include_dirs {
                    return Some(FileEntry {
                        absolute_path: path.to_path_buf(),
                        relative_path,
                        is_dir: true,
                        size_bytes: 0,
                    });
                }
                continue;
            }

            if file_type.is_symlink() {
                // only reachable when links are not followed
                debug!(path = ?path, "Not following symlink");
                continue;
            }

            if !file_type.is_file() {
                debug!(path = ?path, "Skipping special file");
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    return Some(FileEntry {
                        absolute_path: path.to_path_buf(),
                        relative_path,
                        is_dir: false,
                        size_bytes: metadata.len(),
                    })
                }
                Err(err) => {
                    let path = path.to_path_buf();
                    self.skip(Some(&path), &err);
                }
            }
        }
    }
}

/// Walk `root` with default options (files only, links followed)
pub fn walk<P: AsRef<Path>>(root: P) -> Result<Walk> {
    walk_with(root, WalkOptions::default())
}

/// Walk `root` with explicit options
pub fn walk_with<P: AsRef<Path>>(root: P, options: WalkOptions) -> Result<Walk> {
    let root = std::path::absolute(root.as_ref())?;
    let metadata = stat(&root)?;

    if options.require_dir && !metadata.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let (base, min_depth) = if metadata.is_dir() {
        (root.clone(), 1)
    } else {
        let parent = root.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        (parent, 0)
    };

    let inner = WalkDir::new(&root)
        .min_depth(min_depth)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter();

    Ok(Walk {
        inner,
        base,
        options,
        skipped: 0,
    })
}

/// Fold a sequence of entries into counts and total bytes
pub fn summarize<I: IntoIterator<Item = FileEntry>>(entries: I) -> WalkSummary {
    entries
        .into_iter()
        .fold(WalkSummary::default(), |acc, entry| acc.add(&entry))
}

/// Total size of a path in bytes: a file's own size, or the recursive sum
/// of every file under a directory
pub fn path_size<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let metadata = stat(path)?;
    if metadata.is_dir() {
        Ok(walk(path)?.summarize().bytes)
    } else {
        Ok(metadata.len())
    }
}

/// Number of non-directory entries anywhere under `dir`
pub fn count_files<P: AsRef<Path>>(dir: P) -> Result<u64> {
    Ok(walk_with(dir, WalkOptions::accounting())?.summarize().files)
}

fn stat(path: &Path) -> Result<fs::Metadata> {
    fs::metadata(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(err),
    })
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
