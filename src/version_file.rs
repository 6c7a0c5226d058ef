//! The `__version__.py` (or `setup.py`) file: discovery, reading, and
//! rewriting of its version assignment.

use chrono::NaiveDate;
use encoding_rs::Encoding;
use log::debug;
use regex::Regex;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::IncrError;
use crate::version::{DateVersion, next_version};

pub const VERSION_FILE_NAME: &str = "__version__.py";
pub const SETUP_FILE_NAME: &str = "setup.py";

/// Directory names never searched for a version file.
const IGNORED_DIRS: &[&str] = &["venv", ".venv", "site-packages", "build", ".git"];

/// Matches a `__version__ = '...'` assignment on a single line (without its line ending).
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*__version__\s*=\s*)(?:"([^"]*)"|'([^']*)')(\s*(?:#.*)?)$"#)
        .expect("version line pattern is valid")
});

/// A version assignment found on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLine<'a> {
    pub prefix: &'a str,
    pub quote: char,
    pub value: &'a str,
    pub rest: &'a str,
}

pub fn parse_version_line(line: &str) -> Option<VersionLine<'_>> {
    let captures = VERSION_LINE.captures(line)?;
    let prefix = captures.get(1)?.as_str();
    let (quote, value) = match (captures.get(2), captures.get(3)) {
        (Some(value), _) => ('"', value.as_str()),
        (None, Some(value)) => ('\'', value.as_str()),
        (None, None) => return None,
    };
    let rest = captures.get(4).map_or("", |m| m.as_str());
    Some(VersionLine { prefix, quote, value, rest })
}

/// True when `line` assigns a well-formed date version.
pub fn is_version_line(line: &str) -> bool {
    parse_version_line(line.trim_end_matches(['\r', '\n']))
        .is_some_and(|found| found.value.parse::<DateVersion>().is_ok())
}

/// The result of rewriting a version file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionUpdate {
    pub path: PathBuf,
    /// The raw value that was replaced, which may not have been a valid version.
    pub old: String,
    pub new: String,
}

pub struct VersionFile {
    path: PathBuf,
    encoding: &'static Encoding,
}

impl fmt::Display for VersionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl VersionFile {
    pub fn new(path: impl Into<PathBuf>, encoding: &'static Encoding) -> Self {
        Self { path: path.into(), encoding }
    }

    /// Uses the configured file if given, otherwise the first `__version__.py` under the
    /// search root, falling back to `setup.py`.
    pub fn find(config: &Config) -> Result<Self, IncrError> {
        if let Some(path) = &config.file {
            let path = if path.is_absolute() { path.clone() } else { config.search_root.join(path) };
            if path.is_file() {
                return Ok(Self::new(path, config.encoding));
            }
            return Err(IncrError::FileNotFound(format!(
                "--file / -f must be the path to a file that exists (got {})",
                path.display()
            )));
        }

        if let Some(path) = find_version_file(&config.search_root)? {
            return Ok(Self::new(path, config.encoding));
        }

        let setup_path = config.search_root.join(SETUP_FILE_NAME);
        if setup_path.is_file() {
            debug!("No {} found - falling back to {}", VERSION_FILE_NAME, setup_path.display());
            return Ok(Self::new(setup_path, config.encoding));
        }
        Err(IncrError::FileNotFound(format!(
            "Unable to find {VERSION_FILE_NAME} or {SETUP_FILE_NAME} - please specify a --file / -f to modify"
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_text(&self) -> Result<String, IncrError> {
        let bytes = fs::read(&self.path)?;
        self.encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| self.encoding_error("decode"))
    }

    /// The raw value of the first version assignment, if any.
    pub fn version(&self) -> Result<Option<String>, IncrError> {
        let text = self.read_text()?;
        Ok(lines(&text)
            .find_map(|(body, _)| parse_version_line(body))
            .map(|found| found.value.to_string()))
    }

    /// Replaces the first version assignment with the version that follows it on `today`.
    pub fn update_version(&self, today: NaiveDate, force_suffix: bool, dry_run: bool) -> Result<VersionUpdate, IncrError> {
        let text = self.read_text()?;
        let mut output = String::with_capacity(text.len() + 4);
        let mut update = None;

        for (body, ending) in lines(&text) {
            let found = if update.is_none() { parse_version_line(body) } else { None };
            match found {
                Some(found) => {
                    let new = next_version(Some(found.value), today, force_suffix)?;
                    debug!("Replacing version line {:?}", body);
                    output.push_str(found.prefix);
                    output.push(found.quote);
                    output.push_str(&new);
                    output.push(found.quote);
                    output.push_str(found.rest);
                    output.push_str(ending);
                    update = Some(VersionUpdate { path: self.path.clone(), old: found.value.to_string(), new });
                }
                None => {
                    output.push_str(body);
                    output.push_str(ending);
                }
            }
        }

        let update = update.ok_or_else(|| IncrError::NoVersionFound(self.path.clone()))?;
        if dry_run {
            debug!("[DRY RUN] Would replace original file={} with modified version", self);
        } else {
            debug!("Replacing original file={} with modified version", self);
            self.write_text(&output)?;
        }
        Ok(update)
    }

    /// Encodes `text` in the file's encoding. `encoding_rs` only decodes UTF-16, so that is
    /// encoded by hand.
    fn encode(&self, text: &str) -> Result<Vec<u8>, IncrError> {
        if self.encoding == encoding_rs::UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.encoding == encoding_rs::UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }
        if self.encoding.output_encoding() != self.encoding {
            return Err(self.encoding_error("encode"));
        }
        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(self.encoding_error("encode"));
        }
        Ok(bytes.into_owned())
    }

    fn write_text(&self, text: &str) -> Result<(), IncrError> {
        let bytes = self.encode(text)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        debug!("Writing updated file to temp file={}", tmp.path().display());
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        fs::set_permissions(tmp.path(), fs::metadata(&self.path)?.permissions())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn encoding_error(&self, action: &'static str) -> IncrError {
        IncrError::EncodingError { action, path: self.path.clone(), encoding: self.encoding.name() }
    }
}

/// Splits text into `(line, line ending)` pairs so lines can be rewritten losslessly.
fn lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split_inclusive('\n').map(|line| {
        let body = line.trim_end_matches(['\r', '\n']);
        (body, &line[body.len()..])
    })
}

fn is_ignored_dir(name: &str) -> bool {
    IGNORED_DIRS.iter().any(|ignored| ignored.eq_ignore_ascii_case(name))
}

fn find_version_file(root: &Path) -> Result<Option<PathBuf>, IncrError> {
    debug!("Searching for {} under {}", VERSION_FILE_NAME, root.display());
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_ignored_dir(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry.map_err(|e| IncrError::Io(e.into()))?;
        if entry.file_type().is_file() && entry.file_name() == VERSION_FILE_NAME {
            debug!("Found {}", entry.path().display());
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}
