//! Inspection of the processes that launched this hook.

use log::{debug, warn};
use sysinfo::{Pid, ProcessRefreshKind, System, UpdateKind};

use crate::error::IncrError;

const MAX_ANCESTORS: usize = 64;

/// Command lines of every ancestor of the current process, nearest first.
pub fn ancestor_cmdlines() -> Result<Vec<Vec<String>>, IncrError> {
    let mut system = System::new();
    // Command lines are not loaded unless asked for.
    system.refresh_processes_specifics(ProcessRefreshKind::new().with_cmd(UpdateKind::Always));

    let pid = sysinfo::get_current_pid().map_err(|e| IncrError::Process(e.to_string()))?;
    if system.process(pid).is_none() {
        warn!("Unable to find process with pid={pid} (this process) - assuming no parent processes");
        return Ok(Vec::new());
    }

    let mut cmdlines = Vec::new();
    let mut current: Option<Pid> = system.process(pid).and_then(|process| process.parent());
    while let Some(parent_pid) = current {
        if cmdlines.len() >= MAX_ANCESTORS {
            break;
        }
        let Some(parent) = system.process(parent_pid) else { break };
        cmdlines.push(parent.cmd().to_vec());
        // pid 0 / self-parented entries terminate the chain on some platforms
        current = parent.parent().filter(|next| *next != parent_pid);
    }
    Ok(cmdlines)
}

fn is_git_program(program: &str) -> bool {
    program == "git" || program.ends_with("/git") || program.ends_with("\\git.exe") || program == "git.exe"
}

/// The lower-cased command line of the `git commit` invocation running this hook, if any.
pub fn find_git_commit_cmdline(cmdlines: &[Vec<String>]) -> Option<Vec<String>> {
    cmdlines.iter().find_map(|cmdline| {
        let lowered: Vec<String> = cmdline.iter().map(|arg| arg.to_lowercase()).collect();
        match lowered.as_slice() {
            [program, subcommand, ..] if subcommand == "commit" && is_git_program(program) => Some(lowered),
            _ => None,
        }
    })
}

/// Whether the `git commit` among `cmdlines` was given `--amend`.
pub fn commit_is_amending(cmdlines: &[Vec<String>]) -> bool {
    let amending = find_git_commit_cmdline(cmdlines).is_some_and(|cmdline| cmdline.iter().any(|arg| arg == "--amend"));
    debug!("Current commit is amending: {}", amending);
    amending
}

/// Whether any of the given command lines is a git pre-commit hook script.
pub fn is_precommit_hook(cmdlines: &[Vec<String>]) -> bool {
    cmdlines.iter().any(|cmdline| {
        cmdline
            .iter()
            .take(2)
            .any(|arg| arg.replace('\\', "/").ends_with(".git/hooks/pre-commit"))
    })
}

/// Whether this process was launched by the pre-commit framework, given its ancestors' command lines.
pub fn running_under_precommit(cmdlines: &[Vec<String>]) -> bool {
    if std::env::var_os("PRE_COMMIT").is_some() {
        debug!("PRE_COMMIT is set - running under pre-commit");
        return true;
    }
    is_precommit_hook(cmdlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_find_git_commit_cmdline() {
        let cmdlines = vec![
            cmd(&["/usr/bin/python3", "-m", "pre_commit"]),
            cmd(&["/usr/bin/git", "commit", "--amend", "-m", "Msg"]),
            cmd(&["bash"]),
        ];
        assert_eq!(
            find_git_commit_cmdline(&cmdlines),
            Some(cmd(&["/usr/bin/git", "commit", "--amend", "-m", "msg"]))
        );
    }

    #[test]
    fn test_find_git_commit_cmdline_windows() {
        let cmdlines = vec![cmd(&["C:\\Program Files\\Git\\cmd\\GIT.EXE", "commit"])];
        assert!(find_git_commit_cmdline(&cmdlines).is_some());
    }

    #[test]
    fn test_find_git_commit_cmdline_ignores_other_git_commands() {
        let cmdlines = vec![cmd(&["git", "rebase", "-i"]), cmd(&["/usr/bin/gitk", "commit"])];
        assert!(find_git_commit_cmdline(&cmdlines).is_none());
    }

    #[test]
    fn test_commit_is_amending() {
        let amend = vec![cmd(&["sh", "-c", "x"]), cmd(&["git", "commit", "--AMEND", "--no-edit"])];
        assert!(commit_is_amending(&amend));
        assert!(!commit_is_amending(&[cmd(&["git", "commit", "-m", "--amend is not a flag here"])]));
        assert!(!commit_is_amending(&[cmd(&["git", "rebase", "--amend"])]));
        assert!(!commit_is_amending(&[]));
    }

    #[test]
    fn test_ancestor_cmdlines_include_command_lines() {
        // The test harness is always started by some process with a command line (cargo, a shell).
        let cmdlines = ancestor_cmdlines().unwrap();
        assert!(!cmdlines.is_empty());
        assert!(cmdlines.iter().any(|cmdline| !cmdline.is_empty()));
    }

    #[test]
    fn test_is_precommit_hook() {
        assert!(is_precommit_hook(&[cmd(&["env", ".git/hooks/pre-commit"])]));
        assert!(is_precommit_hook(&[cmd(&["/bin/sh", "/repo/.git/hooks/pre-commit"])]));
        assert!(!is_precommit_hook(&[cmd(&["git", "commit"]), cmd(&["bash"])]));
    }
}
