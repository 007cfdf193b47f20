//! Archive format classification

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArchiveFormat {
    /// ZIP with per-entry deflate
    #[default]
    #[serde(rename = "zip")]
    Zip,
    /// Uncompressed tar
    #[serde(rename = "tar")]
    Tar,
    /// Gzip-compressed tar
    #[serde(rename = "tar.gz", alias = "tgz")]
    TarGz,
}

impl ArchiveFormat {
    /// Classify an archive by its file name suffix.
    ///
    /// `.zip` is ZIP; `.tar.gz`, `.tgz` and any other `.gz` are gzip tar;
    /// `.tar` is plain tar. Matching is case-insensitive and only looks at
    /// the end of the name, so `a.b.tar.gz` is gzip tar.
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            Ok(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") || name.ends_with(".gz") {
            Ok(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Ok(ArchiveFormat::Tar)
        } else {
            Err(Error::UnsupportedFormat(format!(
                "{} (supported: ZIP, TAR, TAR.GZ, TGZ)",
                path.display()
            )))
        }
    }

    /// File name of `path` without its archive suffix, e.g. `a.b` for
    /// `a.b.tar.gz`. `None` when the name has no known suffix or nothing is
    /// left once it is removed.
    pub fn stem<P: AsRef<Path>>(path: P) -> Option<String> {
        let name = path.as_ref().file_name()?.to_string_lossy().into_owned();

        [".tar.gz", ".tgz", ".zip", ".tar", ".gz"]
            .iter()
            .find_map(|suffix| {
                let split = name.len().checked_sub(suffix.len())?;
                (name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(suffix))
                    .then(|| name[..split].to_string())
            })
            .filter(|stem| !stem.is_empty())
    }

    /// Upper-case label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "ZIP",
            ArchiveFormat::Tar => "TAR",
            ArchiveFormat::TarGz => "TAR.GZ",
        }
    }

    /// Whether the format stores directories as explicit entries
    pub fn stores_directories(&self) -> bool {
        matches!(self, ArchiveFormat::Zip)
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar" => Ok(ArchiveFormat::Tar),
            "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Zip => write!(f, "zip"),
            ArchiveFormat::Tar => write!(f, "tar"),
            ArchiveFormat::TarGz => write!(f, "tar.gz"),
        }
    }
}
