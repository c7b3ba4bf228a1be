use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Overrides the directory scripts, wrappers and `tdl.exe` live in.
pub const LAUNCHER_DIR_ENV: &str = "TDL_LAUNCHER_DIR";
pub const TDL_EXE: &str = "tdl.exe";

#[derive(Debug, Clone)]
pub struct LauncherPaths {
    pub launcher_dir: PathBuf,
    pub bundle_dir: Option<PathBuf>,
}

impl LauncherPaths {
    pub fn new(launcher_dir: impl Into<PathBuf>, bundle_dir: Option<PathBuf>) -> Self {
        Self {
            launcher_dir: launcher_dir.into(),
            bundle_dir,
        }
    }

    pub fn discover(bundle_dir: Option<PathBuf>) -> Result<Self> {
        let launcher_dir = match std::env::var_os(LAUNCHER_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let exe = std::env::current_exe().context("Failed to locate launcher executable")?;
                exe.parent()
                    .map(Path::to_path_buf)
                    .context("Launcher executable has no parent directory")?
            }
        };
        tracing::info!("Launcher directory: {}", launcher_dir.display());
        Ok(Self::new(launcher_dir, bundle_dir))
    }

    pub fn tdl_exe(&self) -> PathBuf {
        self.launcher_dir.join(TDL_EXE)
    }

    pub fn in_launcher_dir(&self, name: &str) -> PathBuf {
        self.launcher_dir.join(name)
    }

    pub fn bundled(&self, name: &str) -> Option<PathBuf> {
        self.bundle_dir
            .as_ref()
            .map(|dir| dir.join(name))
            .filter(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_only_returns_existing_files() {
        let bundle = TempDir::new().unwrap();
        std::fs::write(bundle.path().join("tdl-updater.ps1"), "Write-Host hi").unwrap();
        let paths = LauncherPaths::new("C:\\launcher", Some(bundle.path().to_path_buf()));

        assert!(paths.bundled("tdl-updater.ps1").is_some());
        assert!(paths.bundled("tdl-easy-full.ps1").is_none());
        assert!(LauncherPaths::new("x", None).bundled("tdl-updater.ps1").is_none());
    }

    #[test]
    fn test_tdl_exe_lives_in_launcher_dir() {
        let paths = LauncherPaths::new("/opt/launcher", None);
        assert_eq!(paths.tdl_exe(), PathBuf::from("/opt/launcher").join("tdl.exe"));
    }
}
