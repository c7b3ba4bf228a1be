// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod error;
mod i18n;
mod launcher;
mod links;
mod paths;
mod powershell;
mod scripts;
mod settings;
mod state;
mod task;

use error::{input_message, user_message};
use i18n::{Lang, Texts};
use launcher::{Launcher, PowerShellCheck, PreviousTask};
use powershell::ShellStatus;
use serde::Serialize;
use settings::Settings;
use state::AppState;
use std::sync::Arc;
use tauri::{AppHandle, Manager, State};
use task::{CountField, FullChatRequest, RangeRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UiSnapshot {
    settings: Settings,
    texts: &'static Texts,
    hint: &'static str,
    launcher_dir: String,
}

fn snapshot(launcher: &Launcher) -> UiSnapshot {
    let settings = launcher.settings();
    let texts = Texts::for_lang(settings.language);
    UiSnapshot {
        hint: texts.hint(settings.close_terminal),
        texts,
        settings,
        launcher_dir: launcher.launcher_dir().display().to_string(),
    }
}

#[tauri::command]
fn get_ui_state(state: State<'_, AppState>) -> UiSnapshot {
    snapshot(&state.launcher)
}

#[tauri::command]
fn set_language(
    lang: Lang,
    app_handle: AppHandle,
    state: State<'_, AppState>,
) -> Result<UiSnapshot, String> {
    let launcher = &state.launcher;
    launcher
        .update_settings(|s| s.language = lang)
        .map_err(|e| user_message(lang, &e))?;
    if let Some(window) = app_handle.get_webview_window("main") {
        if let Err(e) = window.set_title(Texts::for_lang(lang).title) {
            tracing::warn!("Failed to update window title: {}", e);
        }
    }
    Ok(snapshot(launcher))
}

#[tauri::command]
fn set_close_terminal(enabled: bool, state: State<'_, AppState>) -> Result<UiSnapshot, String> {
    let launcher = &state.launcher;
    launcher
        .update_settings(|s| s.close_terminal = enabled)
        .map_err(|e| user_message(launcher.lang(), &e))?;
    Ok(snapshot(launcher))
}

#[tauri::command]
fn check_single_link(url: String, state: State<'_, AppState>) -> Result<String, String> {
    links::check_single_link(&url).map_err(|e| input_message(state.launcher.lang(), &e))
}

#[tauri::command]
fn check_base_link(link: String, state: State<'_, AppState>) -> Result<String, String> {
    links::normalize_base_link(&link).map_err(|e| input_message(state.launcher.lang(), &e))
}

#[tauri::command]
fn check_message_link(link: String, state: State<'_, AppState>) -> Result<String, String> {
    links::check_message_link(&link).map_err(|e| input_message(state.launcher.lang(), &e))
}

#[tauri::command]
fn check_path(raw: String, state: State<'_, AppState>) -> Result<String, String> {
    let launcher = &state.launcher;
    task::resolve_path(&raw, &launcher.launcher_dir())
        .map(|path| path.display().to_string())
        .map_err(|e| input_message(launcher.lang(), &e))
}

#[tauri::command]
fn check_count(field: CountField, raw: String, state: State<'_, AppState>) -> Result<u32, String> {
    field
        .parse(&raw)
        .map_err(|e| input_message(state.launcher.lang(), &e))
}

#[tauri::command]
async fn check_powershell(state: State<'_, AppState>) -> Result<PowerShellCheck, String> {
    Ok(state.launcher.check_powershell().await)
}

#[tauri::command]
async fn install_powershell(state: State<'_, AppState>) -> Result<ShellStatus, String> {
    let launcher = &state.launcher;
    launcher.install_powershell().await.map_err(|e| {
        tracing::error!("PowerShell install failed: {:#}", e);
        user_message(launcher.lang(), &e)
    })
}

#[tauri::command]
async fn install_update_tdl(state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .install_update_tdl()
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
fn require_tdl(state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .require_tdl()
        .map(|_| ())
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
async fn login_telegram(state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .login_telegram()
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
async fn download_single(url: String, state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .download_single(&url)
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
async fn download_range(request: RangeRequest, state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .download_range(&request)
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
async fn download_full_chat(
    request: FullChatRequest,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .download_full_chat(&request)
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
fn previous_task(state: State<'_, AppState>) -> Option<PreviousTask> {
    state.launcher.previous_task()
}

#[tauri::command]
async fn continue_previous_task(state: State<'_, AppState>) -> Result<(), String> {
    let launcher = &state.launcher;
    launcher
        .continue_previous()
        .await
        .map_err(|e| user_message(launcher.lang(), &e))
}

#[tauri::command]
fn exit_app(app_handle: AppHandle) {
    app_handle.exit(0);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let launcher = Launcher::new(app.handle().clone())?;
            app.manage(AppState {
                launcher: Arc::new(launcher),
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_ui_state,
            set_language,
            set_close_terminal,
            check_single_link,
            check_base_link,
            check_message_link,
            check_path,
            check_count,
            check_powershell,
            install_powershell,
            install_update_tdl,
            require_tdl,
            login_telegram,
            download_single,
            download_range,
            download_full_chat,
            previous_task,
            continue_previous_task,
            exit_app
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
