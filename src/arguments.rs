use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Python project version incrementer (to be run as a pre-commit hook)",
    bin_name = "incr_version"
)]
pub struct Arguments {
    /// The file that contains the version to be incremented
    #[arg(long, short, value_name = "PATH")]
    pub file: Option<String>,
    /// The encoding used by the version file
    #[arg(long, short, default_value = "utf-8")]
    pub encoding: String,
    /// Force use of a numeric suffix, even on the first version for a given day
    #[arg(long = "suffix", short = 's', help_heading = "Behavior Options")]
    pub force_suffix: bool,
    /// Do not add the version file to git after making changes to it
    #[arg(long, short = 'A', help_heading = "Behavior Options")]
    pub no_add: bool,
    /// Update the version even when running under `git commit --amend`
    #[arg(long, short, help_heading = "Behavior Options")]
    pub update_amended: bool,
    /// Assume an already staged version file contains the updated version
    #[arg(long, short = 'S', help_heading = "Behavior Options")]
    pub ignore_staged: bool,
    /// Ignore the age of the pre-commit unstaged file cache and assume the latest cache is for the current commit
    #[arg(long, short = 'C', help_heading = "Behavior Options")]
    pub ignore_cache_age: bool,
    /// Compute and print the new version without writing or staging the file
    #[arg(long, short = 'n', help_heading = "Behavior Options")]
    pub dry_run: bool,
    /// Do not bypass pre-commit's stdout pipe when printing the updated version number
    #[arg(long, short = 'B', help_heading = "Output Options")]
    pub no_pipe_bypass: bool,
    /// Show debug logging
    #[arg(long, short, help_heading = "Output Options")]
    pub debug: bool,
}
