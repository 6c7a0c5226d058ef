//! Shared helpers for the git backed integration tests.
//!
//! Not every test file uses every helper.
#![allow(dead_code)]

use chrono::NaiveDate;
use incr_version::config::Config;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const VERSION_PATH: &str = "pkg/__version__.py";

/// Helper to create a temporary git repository with a committed version file
pub fn create_test_repo(version: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    let repo = git2::Repository::init(temp_dir.path()).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    fs::create_dir_all(temp_dir.path().join("pkg")).unwrap();
    fs::write(temp_dir.path().join("README.md"), "# Test Repo\n").unwrap();
    write_version(temp_dir.path(), version);

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README.md")).unwrap();
    index.add_path(Path::new(VERSION_PATH)).unwrap();
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();

    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();

    temp_dir
}

pub fn write_version(root: &Path, version: &str) {
    fs::write(
        root.join(VERSION_PATH),
        format!("__title__ = 'pkg'\n__version__ = '{version}'\n"),
    )
    .unwrap();
}

pub fn read_version(root: &Path) -> String {
    fs::read_to_string(root.join(VERSION_PATH)).unwrap()
}

pub fn stage(root: &Path, relative: &str) {
    let repo = git2::Repository::open(root).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(relative)).unwrap();
    index.write().unwrap();
}

pub fn test_config(root: &Path) -> Config {
    let mut config = Config::new(root);
    config.pipe_bypass = false;
    config
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
