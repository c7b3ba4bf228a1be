use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tauri::{AppHandle, Manager};

use crate::error::LaunchError;
use crate::i18n::Lang;
use crate::links;
use crate::paths::LauncherPaths;
use crate::powershell::{self, LaunchTarget, ShellStatus};
use crate::scripts::{self, LegacyEncoding};
use crate::settings::{Settings, SettingsStore};
use crate::task::{self, FullChatRequest, RangeRequest, SavedTask, TaskKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerShellCheck {
    pub status: ShellStatus,
    pub offer_install: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousTask {
    pub kind: TaskKind,
    pub summary: String,
}

pub struct Launcher {
    app_handle: AppHandle,
    paths: LauncherPaths,
    store: SettingsStore,
    settings: RwLock<Settings>,
    shell: Mutex<Option<ShellStatus>>,
    install_offered: AtomicBool,
}

impl Launcher {
    pub fn new(app_handle: AppHandle) -> Result<Self> {
        let config_dir = app_handle
            .path()
            .app_config_dir()
            .context("Failed to get app config directory")?;
        let bundle_dir = app_handle
            .path()
            .resource_dir()
            .ok()
            .map(|dir| dir.join("scripts"));
        let paths = LauncherPaths::discover(bundle_dir)?;
        let store = SettingsStore::new(&config_dir);
        let settings = store.load();

        Ok(Self {
            app_handle,
            paths,
            store,
            settings: RwLock::new(settings),
            shell: Mutex::new(None),
            install_offered: AtomicBool::new(false),
        })
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    pub fn lang(&self) -> Lang {
        self.settings.read().language
    }

    pub fn launcher_dir(&self) -> PathBuf {
        self.paths.launcher_dir.clone()
    }

    pub fn update_settings(&self, change: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.settings.write();
        change(&mut settings);
        self.store.save(&settings)?;
        Ok(settings.clone())
    }

    pub async fn check_powershell(&self) -> PowerShellCheck {
        let status = self.shell_status().await;
        let offer_install = should_offer_install(&status, &self.install_offered);
        PowerShellCheck {
            status,
            offer_install,
        }
    }

    pub async fn install_powershell(&self) -> Result<ShellStatus> {
        powershell::install_core(&self.app_handle).await?;
        *self.shell.lock() = None;
        Ok(self.shell_status().await)
    }

    pub async fn install_update_tdl(&self) -> Result<()> {
        let updater = scripts::ensure_script(&self.paths, scripts::UPDATER_SCRIPT)?;
        self.launch(LaunchTarget::Script(updater)).await
    }

    pub fn require_tdl(&self) -> Result<PathBuf> {
        let tdl_exe = self.paths.tdl_exe();
        if tdl_exe.is_file() {
            Ok(tdl_exe)
        } else {
            Err(LaunchError::TdlNotFound(self.paths.launcher_dir.display().to_string()).into())
        }
    }

    pub async fn login_telegram(&self) -> Result<()> {
        let tdl_exe = self.require_tdl()?;
        self.launch(LaunchTarget::Command(powershell::login_command(&tdl_exe)))
            .await
    }

    pub async fn download_single(&self, url: &str) -> Result<()> {
        let url = links::check_single_link(url)?;
        let wrapper = scripts::write_single_wrapper(&self.paths, &url)?;
        tracing::info!("Single file download for {}", url);
        self.launch(LaunchTarget::Script(wrapper)).await
    }

    pub async fn download_range(&self, request: &RangeRequest) -> Result<()> {
        let task = request.validate(&self.paths.launcher_dir)?;
        tracing::info!(
            "Range download {} [{}..{}]",
            task.telegram_url,
            task.start_id,
            task.end_id
        );
        self.start_task(&SavedTask::Range(task)).await
    }

    pub async fn download_full_chat(&self, request: &FullChatRequest) -> Result<()> {
        let task = request.validate(&self.paths.launcher_dir)?;
        tracing::info!("Full chat download from {}", task.telegram_message_url);
        self.start_task(&SavedTask::FullChat(task)).await
    }

    pub fn previous_task(&self) -> Option<PreviousTask> {
        task::load_state(&self.paths.launcher_dir).map(|saved| PreviousTask {
            kind: saved.kind(),
            summary: saved.summary(),
        })
    }

    pub async fn continue_previous(&self) -> Result<()> {
        let wrapper = prepare_continue(&self.paths)?;
        self.launch(LaunchTarget::Script(wrapper)).await
    }

    async fn start_task(&self, saved: &SavedTask) -> Result<()> {
        task::write_state(&self.paths.launcher_dir, saved)?;
        let wrapper = scripts::write_auto_yes_wrapper(&self.paths, saved.kind())?;
        self.launch(LaunchTarget::Script(wrapper)).await
    }

    async fn shell_status(&self) -> ShellStatus {
        let cached = self.shell.lock().clone();
        if let Some(status) = cached {
            return status;
        }
        let status = powershell::resolve_shell(&self.app_handle).await;
        *self.shell.lock() = Some(status.clone());
        status
    }

    async fn launch(&self, target: LaunchTarget) -> Result<()> {
        if let LaunchTarget::Script(path) = &target {
            if !path.is_file() {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                return Err(LaunchError::ScriptNotFound(name).into());
            }
        }

        let shell = self.shell_status().await;
        let (close_terminal, encoding): (bool, LegacyEncoding) = {
            let settings = self.settings.read();
            (settings.close_terminal, settings.legacy_encoding)
        };
        if shell.legacy {
            scripts::apply_legacy_encoding(&self.paths.launcher_dir, encoding)?;
        }

        let launch = powershell::console_launch(
            &shell.program,
            &target,
            close_terminal,
            &self.paths.launcher_dir,
        );
        powershell::spawn_console(&self.app_handle, &launch)
    }
}

/// Offered only for a legacy shell with winget present, and only once.
fn should_offer_install(status: &ShellStatus, offered: &AtomicBool) -> bool {
    status.legacy && status.winget_available && !offered.swap(true, Ordering::SeqCst)
}

fn prepare_continue(paths: &LauncherPaths) -> Result<PathBuf> {
    let saved = task::load_state(&paths.launcher_dir).ok_or(LaunchError::NoSavedTask)?;
    tracing::info!("Continuing previous task: {}", saved.summary());
    scripts::write_auto_yes_wrapper(paths, saved.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::FullChatTask;
    use std::fs;
    use tempfile::TempDir;

    fn status(legacy: bool, winget_available: bool) -> ShellStatus {
        ShellStatus {
            program: powershell::WINDOWS_POWERSHELL.to_string(),
            major: if legacy { 5 } else { 7 },
            legacy,
            winget_available,
        }
    }

    #[test]
    fn test_install_offered_once_per_session() {
        let offered = AtomicBool::new(false);
        assert!(should_offer_install(&status(true, true), &offered));
        assert!(
            !should_offer_install(&status(true, true), &offered),
            "second check in the same session must not ask again"
        );
    }

    #[test]
    fn test_install_not_offered_without_legacy_shell_or_winget() {
        let offered = AtomicBool::new(false);
        assert!(!should_offer_install(&status(false, true), &offered));
        assert!(!should_offer_install(&status(true, false), &offered));
        assert!(
            !offered.load(Ordering::SeqCst),
            "skipped checks must not use up the offer"
        );
        assert!(should_offer_install(&status(true, true), &offered));
    }

    #[test]
    fn test_continue_leaves_state_file_untouched() {
        let launcher = TempDir::new().unwrap();
        let paths = LauncherPaths::new(launcher.path(), None);
        fs::write(launcher.path().join("tdl-easy-full.ps1"), "# full").unwrap();
        let saved = SavedTask::FullChat(FullChatTask {
            tdl_path: "C:\\tdl".to_string(),
            telegram_message_url: "https://t.me/username/123".to_string(),
            media_dir: "D:\\media".to_string(),
            download_limit: 2,
            threads: 4,
            max_retries: 1,
        });
        let state = task::write_state(launcher.path(), &saved).unwrap();
        let before = fs::read(&state).unwrap();

        let wrapper = prepare_continue(&paths).unwrap();
        assert_eq!(wrapper, launcher.path().join("tdl-easy-full-wrapper.ps1"));
        assert!(wrapper.is_file());
        assert_eq!(fs::read(&state).unwrap(), before, "state file must not change");
    }

    #[test]
    fn test_continue_without_saved_task() {
        let launcher = TempDir::new().unwrap();
        let paths = LauncherPaths::new(launcher.path(), None);
        let err = prepare_continue(&paths).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::NoSavedTask)
        ));
    }
}
