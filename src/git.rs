use git2::{Delta, DiffFormat, DiffOptions, Repository};
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::IncrError;

pub struct GitTracker {
    pub repository: Repository,
}

impl GitTracker {
    /// Opens the repository that contains the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IncrError> {
        let path = path.as_ref();
        let repository = Repository::discover(path)?;

        debug!("Opened repository at {:?}", repository.path());

        Ok(GitTracker { repository })
    }

    fn workdir(&self) -> Result<&Path, IncrError> {
        self.repository
            .workdir()
            .ok_or_else(|| git2::Error::from_str("repository has no working directory").into())
    }

    /// Converts a path into the `/`-separated, repository-relative form git reports
    pub fn relative_path(&self, path: impl AsRef<Path>) -> Result<String, IncrError> {
        let workdir = self.workdir()?.canonicalize()?;
        let absolute = path.as_ref().canonicalize()?;
        let relative: PathBuf = absolute
            .strip_prefix(&workdir)
            .map_err(|_| {
                git2::Error::from_str(&format!(
                    "{} is outside of the repository at {}",
                    absolute.display(),
                    workdir.display()
                ))
            })?
            .to_path_buf();
        Ok(relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Files with changes staged for the next commit
    pub fn staged_files(&self) -> Result<HashSet<String>, IncrError> {
        let head_tree = match self.repository.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(_) => {
                debug!("HEAD is unborn - every indexed file counts as staged");
                None
            }
        };
        let diff = self.repository.diff_tree_to_index(head_tree.as_ref(), None, None)?;
        let files: HashSet<String> = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(to_slash)
            .collect();

        debug!("Files staged in the current commit: {:?}", files);
        Ok(files)
    }

    /// Files modified in the working tree whose changes are not staged
    pub fn unstaged_modified(&self) -> Result<HashSet<String>, IncrError> {
        let diff = self.repository.diff_index_to_workdir(None, None)?;
        let mut files = HashSet::new();
        for delta in diff.deltas() {
            let Some(path) = delta.new_file().path() else { continue };
            if delta.status() == Delta::Modified {
                files.insert(to_slash(path));
            } else {
                debug!("Ignoring file={:?} with status={:?}", path, delta.status());
            }
        }

        debug!("Modified files NOT staged in the current commit: {:?}", files);
        Ok(files)
    }

    /// Lines added to `path` by the staged changes
    pub fn staged_added_lines(&self, path: &str) -> Result<Vec<String>, IncrError> {
        let head_tree = match self.repository.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(_) => None,
        };
        let mut options = DiffOptions::new();
        options.pathspec(path).disable_pathspec_match(true).context_lines(0);
        let diff = self.repository.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut options))?;

        let mut added = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if line.origin() == '+' {
                let content = String::from_utf8_lossy(line.content());
                added.push(content.trim_end_matches(['\r', '\n']).to_string());
            }
            true
        })?;

        debug!("Staged lines added to {}: {:?}", path, added);
        Ok(added)
    }

    /// Stages a single file
    pub fn add(&self, path: impl AsRef<Path>) -> Result<(), IncrError> {
        let relative = self.relative_path(path)?;
        debug!("Executing `git add {}`", relative);

        let mut index = self.repository.index()?;
        index.add_path(Path::new(&relative))?;
        index.write()?;
        Ok(())
    }
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
