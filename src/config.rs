use encoding_rs::Encoding;
use std::path::PathBuf;

use crate::arguments::Arguments;
use crate::error::IncrError;

/// Everything a single run needs, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit version file; discovered under `search_root` when unset.
    pub file: Option<PathBuf>,
    pub search_root: PathBuf,
    pub encoding: &'static Encoding,
    pub force_suffix: bool,
    pub no_add: bool,
    pub update_amended: bool,
    pub ignore_staged: bool,
    pub ignore_cache_age: bool,
    pub pipe_bypass: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn new(search_root: impl Into<PathBuf>) -> Self {
        Self {
            file: None,
            search_root: search_root.into(),
            encoding: encoding_rs::UTF_8,
            force_suffix: false,
            no_add: false,
            update_amended: false,
            ignore_staged: false,
            ignore_cache_age: false,
            pipe_bypass: true,
            dry_run: false,
        }
    }

    pub fn from_arguments(args: &Arguments) -> Result<Self, IncrError> {
        let mut config = Self::new(std::env::current_dir()?);
        config.file = args.file.as_ref().map(PathBuf::from);
        config.encoding = resolve_encoding(&args.encoding)?;
        config.force_suffix = args.force_suffix;
        config.no_add = args.no_add;
        config.update_amended = args.update_amended;
        config.ignore_staged = args.ignore_staged;
        config.ignore_cache_age = args.ignore_cache_age;
        config.pipe_bypass = !args.no_pipe_bypass;
        config.dry_run = args.dry_run;
        Ok(config)
    }
}

pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IncrError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IncrError::UnknownEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_resolve_encoding_labels() {
        assert_eq!(resolve_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_encoding("UTF8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_encoding("latin1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(resolve_encoding("utf-16le").unwrap(), encoding_rs::UTF_16LE);
    }

    #[test]
    fn test_resolve_unknown_encoding() {
        assert!(matches!(resolve_encoding("klingon"), Err(IncrError::UnknownEncoding(_))));
    }

    #[test]
    fn test_from_arguments() {
        let args = Arguments::parse_from(["incr_version", "-f", "a/__version__.py", "-s", "-B"]);
        let config = Config::from_arguments(&args).unwrap();
        assert_eq!(config.file, Some(PathBuf::from("a/__version__.py")));
        assert!(config.force_suffix);
        assert!(!config.pipe_bypass);
        assert_eq!(config.encoding, encoding_rs::UTF_8);
    }
}
