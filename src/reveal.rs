use crate::error::Result;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Build the platform command that opens `dir` in the file browser.
pub fn reveal_command(dir: &Path) -> Command {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };
    cmd.arg(dir);
    cmd
}

/// Open `dir` in the host file browser without waiting for it.
pub fn reveal(dir: &Path) -> Result<()> {
    let child = reveal_command(dir).spawn()?;
    debug!("Opened {:?} (pid {})", dir, child.id());
    Ok(())
}
