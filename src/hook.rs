//! The pre-commit hook pipeline: decide whether the version needs bumping, bump it, report it,
//! and stage the result.

use chrono::NaiveDate;
use log::{debug, info};

use crate::config::Config;
use crate::error::IncrError;
use crate::git::GitTracker;
use crate::version_file::{self, VersionFile, VersionUpdate};
use crate::{output, precommit, process};

/// What git (and the processes around it) say about the version file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoState {
    pub unstaged_modified: bool,
    pub staged: bool,
    pub staged_version_changed: bool,
    pub amending: bool,
}

impl RepoState {
    pub fn gather(git: &GitTracker, file: &VersionFile, ignore_cache_age: bool) -> Result<Self, IncrError> {
        let relative = git.relative_path(file.path())?;
        let cmdlines = process::ancestor_cmdlines()?;
        let unstaged_modified = if process::running_under_precommit(&cmdlines) {
            debug!("Running under pre-commit - checking its unstaged file cache");
            match precommit::cache_dir() {
                Some(dir) => precommit::cached_unstaged_files(&dir, ignore_cache_age)?.contains(&relative),
                None => false,
            }
        } else {
            git.unstaged_modified()?.contains(&relative)
        };
        let staged = git.staged_files()?.contains(&relative);
        let staged_version_changed = staged
            && git
                .staged_added_lines(&relative)?
                .iter()
                .any(|line| version_file::is_version_line(line));
        let amending = !unstaged_modified && !staged && process::commit_is_amending(&cmdlines);

        let state = RepoState { unstaged_modified, staged, staged_version_changed, amending };
        debug!("State of {}: {:?}", relative, state);
        Ok(state)
    }
}

/// Decides whether the version in `file_name` should be bumped for the commit in progress.
pub fn should_update(file_name: &str, state: &RepoState, config: &Config) -> Result<bool, IncrError> {
    if state.unstaged_modified {
        return Err(IncrError::UnstagedChanges(file_name.to_string()));
    }

    if state.staged {
        if config.ignore_staged {
            info!("File={} is already staged in git - assuming it has correct version already", file_name);
            return Ok(false);
        }
        debug!("File={} is already staged in git - checking the staged version number", file_name);
        if state.staged_version_changed {
            info!("A version update was already staged for {} - exiting", file_name);
            return Ok(false);
        }
        debug!("File={} was already staged with changes, but it does not contain a version update", file_name);
    } else if state.amending {
        if !config.update_amended {
            info!("The current commit is using --amend - exiting");
            return Ok(false);
        }
        info!("The current commit is using --amend - updating");
    } else {
        debug!("File={} is not already staged in git", file_name);
    }

    Ok(true)
}

/// Runs the hook end to end. Returns `None` when no update was needed.
pub fn run(config: &Config, today: NaiveDate) -> Result<Option<VersionUpdate>, IncrError> {
    let file = VersionFile::find(config)?;
    debug!("Found file={}", file);

    let git = GitTracker::open(file.path().parent().unwrap_or(config.search_root.as_path()))?;
    let state = RepoState::gather(&git, &file, config.ignore_cache_age)?;
    if !should_update(&file.to_string(), &state, config)? {
        return Ok(None);
    }

    let update = file.update_version(today, config.force_suffix, config.dry_run)?;
    output::announce(&update, config.pipe_bypass)?;

    if config.no_add || config.dry_run {
        debug!("Skipping `git add {}`", file);
    } else {
        debug!("Adding updated version file to the commit...");
        git.add(file.path())?;
    }
    Ok(Some(update))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(".")
    }

    #[test]
    fn test_clean_file_is_updated() {
        assert!(should_update("v.py", &RepoState::default(), &config()).unwrap());
    }

    #[test]
    fn test_unstaged_changes_are_an_error() {
        let state = RepoState { unstaged_modified: true, staged: true, ..Default::default() };
        let err = should_update("v.py", &state, &config()).unwrap_err();
        assert!(matches!(err, IncrError::UnstagedChanges(ref name) if name == "v.py"));
    }

    #[test]
    fn test_staged_without_version_change_is_updated() {
        let state = RepoState { staged: true, ..Default::default() };
        assert!(should_update("v.py", &state, &config()).unwrap());
    }

    #[test]
    fn test_staged_version_change_is_skipped() {
        let state = RepoState { staged: true, staged_version_changed: true, ..Default::default() };
        assert!(!should_update("v.py", &state, &config()).unwrap());
    }

    #[test]
    fn test_ignore_staged_skips() {
        let mut config = config();
        config.ignore_staged = true;
        let state = RepoState { staged: true, ..Default::default() };
        assert!(!should_update("v.py", &state, &config).unwrap());
    }

    #[test]
    fn test_amend_is_skipped_unless_requested() {
        let state = RepoState { amending: true, ..Default::default() };
        assert!(!should_update("v.py", &state, &config()).unwrap());

        let mut config = config();
        config.update_amended = true;
        assert!(should_update("v.py", &state, &config).unwrap());
    }

    #[test]
    fn test_staged_takes_precedence_over_amend() {
        let state = RepoState { staged: true, amending: true, ..Default::default() };
        assert!(should_update("v.py", &state, &config()).unwrap());
    }
}
