//! End-to-end tests for the fileops binary

use assert_cmd::Command;
use fileops_testing::assertions::{assert_dirs_equal, assert_same_size};
use fileops_testing::fixtures::{create_docs_tree, create_pdf_stub, DOCS_TREE_FILES};
use fileops_testing::TestDir;
use predicates::prelude::*;
use std::fs;

/// Command with an isolated configuration file
fn fileops(test_dir: &TestDir) -> Command {
    let mut cmd = Command::cargo_bin("fileops").unwrap();
    cmd.arg("--quiet")
        .arg("--config")
        .arg(test_dir.join("config/config.toml"));
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("fileops").unwrap();
    cmd.arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("pack")
            .and(predicate::str::contains("extract"))
            .and(predicate::str::contains("call")),
    );
}

#[test]
fn test_pack_extract_docs_scenario() {
    let test_dir = TestDir::new().unwrap();
    let inputs = create_docs_tree(&test_dir).unwrap();
    let archive = test_dir.join("out.zip");
    let fresh = test_dir.join("fresh");

    fileops(&test_dir)
        .arg("pack")
        .args(&inputs)
        .arg("--output")
        .arg(&archive)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Archive created!")
                .and(predicate::str::contains("Format: ZIP"))
                .and(predicate::str::contains("Files: 4")),
        );

    fileops(&test_dir)
        .arg("extract")
        .arg(&archive)
        .arg("--output")
        .arg(&fresh)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted: 4"));

    for relative in DOCS_TREE_FILES {
        assert_same_size(&fresh.join(relative), &test_dir.join(relative)).unwrap();
    }
    assert_dirs_equal(&test_dir.join("docs"), &fresh.join("docs")).unwrap();
}

#[test]
fn test_pack_format_follows_suffix() {
    let test_dir = TestDir::new().unwrap();
    let inputs = create_docs_tree(&test_dir).unwrap();
    let archive = test_dir.join("bundle.tgz");

    fileops(&test_dir)
        .arg("pack")
        .args(&inputs)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: TAR.GZ"));

    fileops(&test_dir)
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(test_dir.join("out"))
        .assert()
        .success();
    assert_dirs_equal(&test_dir.join("docs"), &test_dir.join("out/docs")).unwrap();
}

#[test]
fn test_extract_into_non_empty_target_fails() {
    let test_dir = TestDir::new().unwrap();
    let inputs = create_docs_tree(&test_dir).unwrap();
    let archive = test_dir.join("out.tar");
    let target = test_dir.create_dir("target").unwrap();
    test_dir.create_file("target/keep.txt", b"keep").unwrap();

    fileops(&test_dir)
        .arg("pack")
        .args(&inputs)
        .args(["-o", archive.to_str().unwrap(), "-f", "tar"])
        .assert()
        .success();

    fileops(&test_dir)
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&target)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not empty"));
    assert!(!target.join("readme.txt").exists());

    fileops(&test_dir)
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(&target)
        .arg("--overwrite")
        .assert()
        .success();
    assert!(target.join("readme.txt").exists());
    assert!(target.join("keep.txt").exists());
}

#[test]
fn test_extract_defaults_to_archive_stem() {
    let test_dir = TestDir::new().unwrap();
    let inputs = create_docs_tree(&test_dir).unwrap();
    let archive = test_dir.join("bundle.tar.gz");

    fileops(&test_dir)
        .arg("pack")
        .args(&inputs)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();

    fileops(&test_dir)
        .current_dir(test_dir.path())
        .arg("extract")
        .arg("bundle.tar.gz")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted: 4"));
    assert_dirs_equal(&test_dir.join("docs"), &test_dir.join("bundle/docs")).unwrap();
}

#[test]
fn test_move_onto_parent_is_refused() {
    let test_dir = TestDir::new().unwrap();
    create_docs_tree(&test_dir).unwrap();

    fileops(&test_dir)
        .arg("move")
        .arg(test_dir.join("docs/guide"))
        .arg(test_dir.join("docs"))
        .arg("--overwrite")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("which contains it"));
    assert!(test_dir.join("docs/guide").is_dir());
    assert!(test_dir.join("docs/index.md").is_file());
}

#[test]
fn test_exit_codes() {
    let test_dir = TestDir::new().unwrap();
    let unknown = test_dir.create_file("data.rar", b"rar").unwrap();

    fileops(&test_dir)
        .arg("extract")
        .arg(test_dir.join("missing.zip"))
        .assert()
        .code(2);

    fileops(&test_dir)
        .arg("extract")
        .arg(&unknown)
        .arg("-o")
        .arg(test_dir.join("out"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unsupported format"));

    let corrupt = test_dir.create_file("corrupt.zip", b"not a zip").unwrap();
    fileops(&test_dir)
        .arg("extract")
        .arg(&corrupt)
        .arg("-o")
        .arg(test_dir.join("out2"))
        .assert()
        .code(4);
}

#[test]
fn test_count_and_list() {
    let test_dir = TestDir::new().unwrap();
    create_docs_tree(&test_dir).unwrap();
    test_dir.create_file(".hidden", b"h").unwrap();

    fileops(&test_dir)
        .arg("count")
        .arg(test_dir.join("docs"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("contains 2 files/folders")
                .and(predicate::str::contains("Files in the whole tree: 3")),
        );

    fileops(&test_dir)
        .arg("list")
        .arg(test_dir.join("docs"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("- guide (folder, -)")
                .and(predicate::str::contains("- index.md (file, 0KB)")),
        );

    fileops(&test_dir)
        .args(["list", "-a"])
        .arg(test_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".hidden"));
}

#[test]
fn test_copy_and_move() {
    let test_dir = TestDir::new().unwrap();
    create_docs_tree(&test_dir).unwrap();
    let copy = test_dir.join("copy");
    let moved = test_dir.join("moved");

    fileops(&test_dir)
        .arg("copy")
        .arg(test_dir.join("docs"))
        .arg(&copy)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copy complete!"));
    assert_dirs_equal(&test_dir.join("docs"), &copy).unwrap();

    fileops(&test_dir)
        .arg("copy")
        .arg(test_dir.join("docs"))
        .arg(&copy)
        .assert()
        .code(3);

    fileops(&test_dir)
        .arg("move")
        .arg(&copy)
        .arg(&moved)
        .assert()
        .success()
        .stdout(predicate::str::contains("Move complete!"));
    assert!(!copy.exists());
    assert_dirs_equal(&test_dir.join("docs"), &moved).unwrap();
}

#[test]
fn test_pages_split_and_images() {
    let test_dir = TestDir::new().unwrap();
    let pdf = create_pdf_stub(&test_dir, "report.pdf").unwrap();

    fileops(&test_dir)
        .args(["pages", "split"])
        .arg(&pdf)
        .arg("-o")
        .arg(test_dir.join("parts"))
        .args(["--total-pages", "3"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("report_page_001.pdf")
                .and(predicate::str::contains("report_page_003.pdf")),
        );

    fileops(&test_dir)
        .args(["pages", "split"])
        .arg(&pdf)
        .arg("-o")
        .arg(test_dir.join("parts"))
        .args(["--total-pages", "10", "-r", "1-3", "-r", "4-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report_pages_4-10.pdf"));

    fileops(&test_dir)
        .args(["pages", "images"])
        .arg(&pdf)
        .arg("-o")
        .arg(test_dir.join("img"))
        .args(["--total-pages", "10", "--pages", "1,3,5", "-f", "png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.5.png"));

    fileops(&test_dir)
        .args(["pages", "images"])
        .arg(&pdf)
        .arg("-o")
        .arg(test_dir.join("img"))
        .args(["--total-pages", "10", "--pages", "5-2"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid range"));
}

#[test]
fn test_call_tool_json() {
    let test_dir = TestDir::new().unwrap();
    let inputs = create_docs_tree(&test_dir).unwrap();
    let args = serde_json::json!({
        "files": inputs,
        "outputPath": test_dir.join("call.tar"),
        "format": "tar",
    });

    let output = fileops(&test_dir)
        .args(["call", "create-archive", &args.to_string(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["isError"], false);
    assert!(result["text"].as_str().unwrap().contains("Format: TAR"));

    fileops(&test_dir)
        .args(["call", "compress-images", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool"));
}

#[test]
fn test_config_path_and_show() {
    let test_dir = TestDir::new().unwrap();
    let config_file = test_dir.join("config/config.toml");

    fileops(&test_dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    assert!(config_file.exists());

    fs::write(
        &config_file,
        "[archive]\ndefault_format = \"tar.gz\"\ncompression_level = 9\noverwrite = false\n",
    )
    .unwrap();

    fileops(&test_dir)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tar.gz"));

    fs::write(&config_file, "[archive]\ncompression_level = \"high\"\n").unwrap();
    fileops(&test_dir)
        .args(["config", "--show"])
        .assert()
        .code(1);
}

#[cfg(unix)]
#[test]
fn test_zip_keeps_unix_permissions() {
    use fileops_testing::assertions::assert_file_permissions;
    use std::os::unix::fs::PermissionsExt;

    let test_dir = TestDir::new().unwrap();
    let script = test_dir.create_file("tools/run.sh", b"#!/bin/sh\necho hi\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let archive = test_dir.join("tools.zip");

    fileops(&test_dir)
        .arg("pack")
        .arg(test_dir.join("tools"))
        .arg("-o")
        .arg(&archive)
        .assert()
        .success();

    fileops(&test_dir)
        .arg("extract")
        .arg(&archive)
        .arg("-o")
        .arg(test_dir.join("out"))
        .assert()
        .success();

    assert_file_permissions(&test_dir.join("out/tools/run.sh"), 0o755).unwrap();
}
