//! "Show in file manager" for a cache entry

use crate::error::{CacheDirError, Result};
use crate::path;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Program and arguments that reveal a path on a given OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealCommand {
    pub program: &'static str,
    pub args: Vec<OsString>,
}

/// Build the reveal command for `os` (as in `std::env::consts::OS`).
pub fn reveal_command(os: &str, target: &Path) -> Result<RevealCommand> {
    match os {
        "windows" => Ok(RevealCommand {
            program: "explorer",
            args: vec!["/select,".into(), target.as_os_str().to_owned()],
        }),
        "macos" => Ok(RevealCommand {
            program: "open",
            args: vec!["-R".into(), target.as_os_str().to_owned()],
        }),
        // xdg-open has no select flag, open the containing folder instead
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
            let folder = target.parent().unwrap_or(target);
            Ok(RevealCommand {
                program: "xdg-open",
                args: vec![folder.as_os_str().to_owned()],
            })
        }
        other => Err(CacheDirError::UnsupportedPlatform(other.to_string())),
    }
}

/// Launch the native file manager pointed at `raw` inside `root`.
///
/// Returns once the process has been spawned. The child is detached and its
/// exit status is never observed.
pub fn reveal(root: &Path, raw: &str) -> Result<()> {
    let target = path::resolve(root, raw)?;
    let command = reveal_command(std::env::consts::OS, &target)?;

    Command::new(command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CacheDirError::LaunchFailed(Box::new(e)))?;

    info!(path = ?target, program = command.program, "Revealed file in file manager");
    Ok(())
}
