use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tauri::AppHandle;
use tauri_plugin_shell::ShellExt;

use crate::error::LaunchError;

pub const MIN_PS_VERSION: u32 = 7;
pub const WINDOWS_POWERSHELL: &str = "powershell.exe";
const PWSH: &str = "pwsh";
const WINGET: &str = "winget";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const VERSION_QUERY: &str = "$PSVersionTable.PSVersion.Major";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellStatus {
    pub program: String,
    pub major: u32,
    pub legacy: bool,
    pub winget_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Script(PathBuf),
    Command(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLaunch {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

pub fn parse_major(output: &str) -> u32 {
    output.trim().parse().unwrap_or(0)
}

/// Picks the newest usable PowerShell. Windows PowerShell is kept as the
/// fallback even when it is older than [`MIN_PS_VERSION`].
pub fn select_shell(
    windows_major: u32,
    pwsh: Option<(String, u32)>,
    winget_available: bool,
) -> ShellStatus {
    if windows_major >= MIN_PS_VERSION {
        return ShellStatus {
            program: WINDOWS_POWERSHELL.to_string(),
            major: windows_major,
            legacy: false,
            winget_available,
        };
    }
    if let Some((program, major)) = pwsh.filter(|(_, major)| *major >= MIN_PS_VERSION) {
        return ShellStatus {
            program,
            major,
            legacy: false,
            winget_available,
        };
    }
    ShellStatus {
        program: WINDOWS_POWERSHELL.to_string(),
        major: windows_major,
        legacy: true,
        winget_available,
    }
}

pub fn quote_ps(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn login_command(tdl_exe: &Path) -> String {
    format!("& {} login", quote_ps(&tdl_exe.display().to_string()))
}

pub fn console_launch(
    shell: &str,
    target: &LaunchTarget,
    close_terminal: bool,
    launcher_dir: &Path,
) -> ConsoleLaunch {
    let mut args: Vec<String> = ["/c", "start", "", shell]
        .iter()
        .map(|s| s.to_string())
        .collect();
    if !close_terminal {
        args.push("-NoExit".to_string());
    }
    args.push("-ExecutionPolicy".to_string());
    args.push("Bypass".to_string());

    let cwd = match target {
        LaunchTarget::Script(path) => {
            args.push("-File".to_string());
            args.push(path.display().to_string());
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| launcher_dir.to_path_buf())
        }
        LaunchTarget::Command(command) => {
            args.push("-Command".to_string());
            if close_terminal {
                args.push(format!("{command}; exit"));
            } else {
                args.push(command.clone());
            }
            launcher_dir.to_path_buf()
        }
    };

    ConsoleLaunch {
        program: "cmd".to_string(),
        args,
        cwd,
    }
}

pub async fn probe_major(app_handle: &AppHandle, program: &str) -> u32 {
    let output = app_handle
        .shell()
        .command(program)
        .args(["-NoProfile", "-Command", VERSION_QUERY])
        .output();
    match tokio::time::timeout(PROBE_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            parse_major(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            tracing::debug!("{} exited with {:?}", program, output.status.code());
            0
        }
        Ok(Err(e)) => {
            tracing::debug!("Failed to run {}: {}", program, e);
            0
        }
        Err(_) => {
            tracing::warn!("{} did not report its version in time", program);
            0
        }
    }
}

pub async fn resolve_shell(app_handle: &AppHandle) -> ShellStatus {
    let windows_major = probe_major(app_handle, WINDOWS_POWERSHELL).await;
    let pwsh = if windows_major >= MIN_PS_VERSION {
        None
    } else {
        match which::which(PWSH) {
            Ok(path) => {
                let program = path.display().to_string();
                let major = probe_major(app_handle, &program).await;
                Some((program, major))
            }
            Err(_) => None,
        }
    };
    let status = select_shell(windows_major, pwsh, which::which(WINGET).is_ok());
    tracing::info!(
        "Using {} (PowerShell {}, legacy: {})",
        status.program,
        status.major,
        status.legacy
    );
    status
}

pub async fn install_core(app_handle: &AppHandle) -> Result<()> {
    tracing::info!("Installing PowerShell via winget");
    let output = app_handle
        .shell()
        .command(WINGET)
        .args([
            "install",
            "--id",
            "Microsoft.Powershell",
            "--source",
            "winget",
            "-e",
        ])
        .output()
        .await
        .context("Failed to run winget")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "winget exited with {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
    }
    Ok(())
}

pub fn spawn_console(app_handle: &AppHandle, launch: &ConsoleLaunch) -> Result<()> {
    tracing::info!("Starting console: {} {:?}", launch.program, launch.args);
    app_handle
        .shell()
        .command(&launch.program)
        .args(&launch.args)
        .current_dir(&launch.cwd)
        .spawn()
        .map_err(|e| LaunchError::Spawn(e.to_string()))?;
    Ok(())
}
