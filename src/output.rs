use log::debug;
use std::fs::OpenOptions;
use std::io::{self, Write};

use crate::version_file::VersionUpdate;

#[cfg(windows)]
const TERMINAL: &str = "CON";
#[cfg(not(windows))]
const TERMINAL: &str = "/dev/tty";

pub fn update_message(update: &VersionUpdate) -> String {
    format!("\nUpdating version from {} to {}\n", update.old, update.new)
}

/// Writes `message` to the controlling terminal so it is shown even when the hook runner captures
/// stdout, or to stdout when `pipe_bypass` is off or there is no terminal.
pub fn write_message(message: &str, pipe_bypass: bool) -> io::Result<()> {
    if pipe_bypass {
        match OpenOptions::new().write(true).open(TERMINAL) {
            Ok(mut terminal) => {
                terminal.write_all(message.as_bytes())?;
                return terminal.flush();
            }
            Err(e) => debug!("Unable to open {} ({}) - writing to stdout instead", TERMINAL, e),
        }
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()
}

pub fn announce(update: &VersionUpdate, pipe_bypass: bool) -> io::Result<()> {
    write_message(&update_message(update), pipe_bypass)
}
