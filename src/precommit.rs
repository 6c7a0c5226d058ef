//! The pre-commit framework stashes unstaged changes into `patch<timestamp>` files in its cache
//! directory before running hooks, so git itself reports a clean working tree. Those patches are
//! the only record of which files had unstaged modifications.

use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::IncrError;

static DIFF_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(.+) b/(.+)$").expect("diff header pattern is valid"));

/// Patches older than this are assumed to belong to some earlier commit.
pub const MAX_CACHE_AGE: Duration = Duration::from_secs(5);

pub fn cache_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("PRE_COMMIT_HOME") {
        return Some(PathBuf::from(home));
    }
    if let Some(cache) = std::env::var_os("XDG_CACHE_HOME") {
        return Some(PathBuf::from(cache).join("pre-commit"));
    }
    dirs::home_dir().map(|home| home.join(".cache").join("pre-commit"))
}

fn latest_patch(dir: &Path) -> Result<Option<PathBuf>, IncrError> {
    if !dir.is_dir() {
        debug!("pre-commit cache dir {} does not exist", dir.display());
        return Ok(None);
    }
    let mut latest: Option<PathBuf> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_patch = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with("patch"));
        if is_patch && latest.as_ref().is_none_or(|current| path.file_name() > current.file_name()) {
            latest = Some(path);
        }
    }
    Ok(latest)
}

/// Paths named in the `diff --git` headers of a patch.
pub fn patched_files(patch: &str) -> HashSet<String> {
    patch
        .lines()
        .filter_map(|line| DIFF_HEADER.captures(line.trim_end_matches('\r')))
        .filter(|captures| captures[1] == captures[2])
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Files with unstaged modifications according to the newest pre-commit patch in `dir`.
pub fn cached_unstaged_files(dir: &Path, ignore_age: bool) -> Result<HashSet<String>, IncrError> {
    let Some(latest) = latest_patch(dir)? else {
        debug!("No pre-commit patch files found in {}", dir.display());
        return Ok(HashSet::new());
    };

    let age = fs::metadata(&latest)?
        .modified()?
        .elapsed()
        .unwrap_or(Duration::ZERO);
    if age > MAX_CACHE_AGE && !ignore_age {
        debug!("The pre-commit cache file {} is {:.3}s old - ignoring it", latest.display(), age.as_secs_f64());
        return Ok(HashSet::new());
    }

    let bytes = fs::read(&latest)?;
    let files = patched_files(&String::from_utf8_lossy(&bytes));
    debug!("Files cached by pre-commit in {}: {:?}", latest.display(), files);
    Ok(files)
}
