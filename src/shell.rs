//! Running external commands
//!
//! Commands are given as a program followed by its arguments, one element
//! per argument; nothing is interpreted by a shell. Children inherit the
//! current process environment.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::files;

fn build_command<S: AsRef<OsStr>>(cmd_and_args: &[S]) -> Result<(Command, String)> {
    let (program, args) = cmd_and_args.split_first().ok_or(Error::EmptyCommand)?;

    let command_line = cmd_and_args
        .iter()
        .map(|a| a.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");

    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok((cmd, command_line))
}

fn run(mut cmd: Command, command_line: String) -> Result<()> {
    tracing::debug!("Running: {}", command_line);

    let status = cmd.status()?;
    if !status.success() {
        tracing::warn!("`{}` exited with {}", command_line, status);
        return Err(Error::CommandFailed {
            command: command_line,
            code: status.code(),
        });
    }
    Ok(())
}

/// Run a command, letting it write to our stdout and stderr
pub fn execute_shell_cmd<S: AsRef<OsStr>>(cmd_and_args: &[S]) -> Result<()> {
    let (cmd, command_line) = build_command(cmd_and_args)?;
    run(cmd, command_line)
}

/// Run a command inside `dir` without touching our own working directory
pub fn execute_shell_cmd_in<S: AsRef<OsStr>>(dir: &Path, cmd_and_args: &[S]) -> Result<()> {
    let (mut cmd, command_line) = build_command(cmd_and_args)?;
    cmd.current_dir(dir);
    run(cmd, command_line)
}

/// Run a command and return what it printed to stdout
pub fn capture_shell_cmd<S: AsRef<OsStr>>(cmd_and_args: &[S]) -> Result<String> {
    let (mut cmd, command_line) = build_command(cmd_and_args)?;
    tracing::debug!("Running (captured): {}", command_line);

    let output = cmd.stdin(Stdio::null()).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            tracing::warn!("`{}` stderr: {}", command_line, stderr.trim_end());
        }
        return Err(Error::CommandFailed {
            command: command_line,
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Clone a git repository into `path`, replacing whatever directory is there
pub fn git_clone(url: &str, path: &Path) -> Result<()> {
    files::remove_dir(path)?;
    let path_arg = path.as_os_str();
    execute_shell_cmd(&[OsStr::new("git"), OsStr::new("clone"), OsStr::new(url), path_arg])
}

/// Pull the current branch of the repository at `path`.
///
/// Does nothing when `path` is not a directory.
pub fn git_pull(path: &Path) -> Result<()> {
    if !files::dir_exists(path) {
        tracing::debug!("Nothing to pull, no directory at {}", path.display());
        return Ok(());
    }
    execute_shell_cmd_in(path, &["git", "pull"])
}
