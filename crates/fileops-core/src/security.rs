//! Path safety helpers for archive extraction

use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Reduce an untrusted archive entry name to a path that stays inside the
/// extraction directory.
///
/// `.` components are ignored. A root, drive prefix or `..` component makes
/// the entry unsafe and yields `None`.
pub fn enclosed_path(untrusted: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();

    for component in untrusted.components() {
        match component {
            Component::Normal(name) => result.push(name),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                warn!(path = ?untrusted, "Path traversal attempt detected");
                return None;
            }
        }
    }

    if result.as_os_str().is_empty() {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_paths_pass_through() {
        assert_eq!(
            enclosed_path(Path::new("docs/a.txt")),
            Some(PathBuf::from("docs/a.txt"))
        );
        assert_eq!(
            enclosed_path(Path::new("./docs/./a.txt")),
            Some(PathBuf::from("docs/a.txt"))
        );
    }

    #[test]
    fn test_absolute_paths_are_rejected() {
        assert_eq!(enclosed_path(Path::new("/etc/passwd")), None);
        assert_eq!(enclosed_path(Path::new("/")), None);
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert_eq!(enclosed_path(Path::new("../evil.txt")), None);
        assert_eq!(enclosed_path(Path::new("docs/../../evil.txt")), None);
        assert_eq!(enclosed_path(Path::new(".")), None);
    }
}
