use thiserror::Error;

use crate::i18n::Lang;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("URL must start with http:// or https://")]
    NotHttp,
    #[error("not a Telegram message link: {0}")]
    BadMessageLink(String),
    #[error("not a Telegram base link: {0}")]
    BadBaseLink(String),
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("'{0}' is not a whole number")]
    NotANumber(String),
    #[error("value {value} is below the minimum {min}")]
    BelowMin { value: i64, min: u32 },
    #[error("value {value} is above the maximum {max}")]
    AboveMax { value: i64, max: u32 },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("script not found: {0}")]
    ScriptNotFound(String),
    #[error("tdl.exe not found in {0}")]
    TdlNotFound(String),
    #[error("failed to start console: {0}")]
    Spawn(String),
    #[error("no saved task to continue")]
    NoSavedTask,
}

/// Renders an error for a dialog. Known domain errors are localized; anything
/// else shows the full context chain behind a localized prefix.
pub fn user_message(lang: Lang, err: &anyhow::Error) -> String {
    if let Some(input) = err.downcast_ref::<InputError>() {
        return input_message(lang, input);
    }
    if let Some(launch) = err.downcast_ref::<LaunchError>() {
        return launch_message(lang, launch);
    }
    match lang {
        Lang::En => format!("Error: {err:#}"),
        Lang::Ru => format!("Ошибка: {err:#}"),
    }
}

pub fn input_message(lang: Lang, err: &InputError) -> String {
    match (lang, err) {
        (Lang::En, InputError::NotHttp) => {
            "URL must start with http:// or https://".to_string()
        }
        (Lang::Ru, InputError::NotHttp) => {
            "Ссылка должна начинаться с http:// или https://".to_string()
        }
        (Lang::En, InputError::BadMessageLink(_)) => "Expected a link like https://t.me/username/123, \
             https://t.me/c/12345678/123 or https://t.me/c/12345678/456/123"
            .to_string(),
        (Lang::Ru, InputError::BadMessageLink(_)) => "Ожидается ссылка вида https://t.me/username/123, \
             https://t.me/c/12345678/123 или https://t.me/c/12345678/456/123"
            .to_string(),
        (Lang::En, InputError::BadBaseLink(_)) => "Expected https://t.me/c/12345678/, \
             https://t.me/c/12345678/123/ or https://t.me/username/ with trailing slash"
            .to_string(),
        (Lang::Ru, InputError::BadBaseLink(_)) => "Ожидается https://t.me/c/12345678/, \
             https://t.me/c/12345678/123/ или https://t.me/username/ со слешем в конце"
            .to_string(),
        (Lang::En, InputError::PathNotFound(path)) => format!("Path not found: {path}"),
        (Lang::Ru, InputError::PathNotFound(path)) => format!("Путь не найден: {path}"),
        (Lang::En, InputError::NotANumber(raw)) => format!("'{raw}' is not a whole number"),
        (Lang::Ru, InputError::NotANumber(raw)) => format!("'{raw}' не является целым числом"),
        (Lang::En, InputError::BelowMin { min, .. }) => format!("Value must be at least {min}"),
        (Lang::Ru, InputError::BelowMin { min, .. }) => format!("Значение должно быть не меньше {min}"),
        (Lang::En, InputError::AboveMax { max, .. }) => format!("Value must be at most {max}"),
        (Lang::Ru, InputError::AboveMax { max, .. }) => format!("Значение должно быть не больше {max}"),
    }
}

fn launch_message(lang: Lang, err: &LaunchError) -> String {
    match (lang, err) {
        (Lang::En, LaunchError::ScriptNotFound(name)) => format!("Script not found: {name}"),
        (Lang::Ru, LaunchError::ScriptNotFound(name)) => format!("Скрипт не найден: {name}"),
        (Lang::En, LaunchError::TdlNotFound(dir)) => {
            format!("tdl.exe not found in {dir}. Please install/update TDL first.")
        }
        (Lang::Ru, LaunchError::TdlNotFound(dir)) => {
            format!("tdl.exe не найден в папке {dir}. Сначала установите/обновите TDL.")
        }
        (Lang::En, LaunchError::Spawn(reason)) => format!("Launch error: {reason}"),
        (Lang::Ru, LaunchError::Spawn(reason)) => format!("Ошибка запуска: {reason}"),
        (Lang::En, LaunchError::NoSavedTask) => "There is no saved task to continue.".to_string(),
        (Lang::Ru, LaunchError::NoSavedTask) => "Нет сохранённой задачи для продолжения.".to_string(),
    }
}
