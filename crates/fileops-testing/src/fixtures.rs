//! Common test fixtures

use crate::TestDir;
use anyhow::Result;
use std::path::PathBuf;

/// Files created by [`create_docs_tree`], relative to the test directory
pub const DOCS_TREE_FILES: &[&str] = &[
    "docs/index.md",
    "docs/guide/intro.md",
    "docs/guide/assets/logo.png",
    "readme.txt",
];

/// A `docs/` tree next to a `readme.txt`; returns both top-level paths
pub fn create_docs_tree(test_dir: &TestDir) -> Result<Vec<PathBuf>> {
    test_dir.create_file("docs/index.md", b"# Documentation\n\nStart here.\n")?;
    test_dir.create_file("docs/guide/intro.md", b"An introduction.\n")?;
    test_dir.create_file(
        "docs/guide/assets/logo.png",
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
    )?;
    let readme = test_dir.create_file("readme.txt", b"Read me first.\n")?;

    Ok(vec![test_dir.join("docs"), readme])
}

/// A mixed tree with a hidden file, an empty file and a larger log
pub fn create_test_files(test_dir: &TestDir) -> Result<()> {
    test_dir.create_file("file1.txt", b"This is file 1 content.")?;
    test_dir.create_file("file2.txt", b"This is file 2 content.")?;
    test_dir.create_file("subdir/file3.txt", b"This is file 3 in subdir.")?;
    test_dir.create_file("subdir/empty.txt", b"")?;
    test_dir.create_file(".hidden", b"secret")?;

    let large_content = "x".repeat(256 * 1024);
    test_dir.create_file("large.log", large_content.as_bytes())?;

    Ok(())
}

/// A placeholder PDF; page counts come from the caller, not from its bytes
pub fn create_pdf_stub(test_dir: &TestDir, name: &str) -> Result<PathBuf> {
    test_dir.create_file(name, b"%PDF-1.7\n%%EOF\n")
}
