use crate::{EngineError, Result};
use std::ffi::OsStr;
use std::process::{Command, Output};

pub fn command(program: impl AsRef<OsStr>) -> Command {
    let mut cmd = Command::new(program);
    configure_for_background(&mut cmd);
    cmd
}

/// Runs `cmd` to completion with stdout/stderr captured.
///
/// A missing executable maps to `ExternalToolMissing`; a non-zero exit maps to
/// `ExternalToolFailed` carrying the trimmed stderr.
pub fn capture(cmd: &mut Command, tool: &str) -> Result<Output> {
    let output = cmd.output().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EngineError::ExternalToolMissing {
            tool: tool.to_string(),
        },
        _ => EngineError::Io(e),
    })?;

    if !output.status.success() {
        return Err(EngineError::ExternalToolFailed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

#[cfg(windows)]
fn configure_for_background(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    // Keep the console hidden while the GUI runs tools.
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn configure_for_background(_cmd: &mut Command) {}
