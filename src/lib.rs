pub mod arguments;
pub mod config;
pub mod error;
pub mod git;
pub mod hook;
pub mod output;
pub mod precommit;
pub mod process;
pub mod version;
pub mod version_file;
