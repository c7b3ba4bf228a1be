use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lang {
    #[default]
    En,
    Ru,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Texts {
    pub title: &'static str,
    pub menu: &'static str,
    pub install_update: &'static str,
    pub telegram_login: &'static str,
    pub download_single: &'static str,
    pub download_range: &'static str,
    pub download_full: &'static str,
    pub exit: &'static str,
    pub close_terminal: &'static str,
    pub hint_close: &'static str,
    pub hint_no_close: &'static str,
    pub ok: &'static str,
    pub cancel: &'static str,
    pub browse: &'static str,
    pub error_title: &'static str,
    pub invalid_title: &'static str,
    pub login_info: &'static str,
    pub single_prompt: &'static str,
    pub tdl_path_title: &'static str,
    pub tdl_path_prompt: &'static str,
    pub media_dir_title: &'static str,
    pub media_dir_prompt: &'static str,
    pub base_link_title: &'static str,
    pub base_link_prompt: &'static str,
    pub message_link_title: &'static str,
    pub message_link_prompt: &'static str,
    pub start_id_title: &'static str,
    pub start_id_prompt: &'static str,
    pub end_id_title: &'static str,
    pub end_id_prompt: &'static str,
    pub task_limit_title: &'static str,
    pub task_limit_prompt: &'static str,
    pub threads_title: &'static str,
    pub threads_prompt: &'static str,
    pub continue_title: &'static str,
    pub continue_range_prompt: &'static str,
    pub continue_full_prompt: &'static str,
    pub install_pwsh_prompt: &'static str,
    pub install_pwsh_failed: &'static str,
}

const EN: Texts = Texts {
    title: "TDL Easy Launcher",
    menu: "Menu:",
    install_update: "INSTALL/UPDATE TDL",
    telegram_login: "TELEGRAM LOGIN",
    download_single: "DOWNLOAD SINGLE FILE",
    download_range: "DOWNLOAD POSTS RANGE",
    download_full: "DOWNLOAD FULL CHAT",
    exit: "EXIT",
    close_terminal: "Close terminal",
    hint_close: "PowerShell windows will auto-close after execution.",
    hint_no_close: "PowerShell windows will stay open after execution.",
    ok: "OK",
    cancel: "Cancel",
    browse: "Browse...",
    error_title: "Error",
    invalid_title: "Invalid input",
    login_info: "A console window will open. Manually choose user id,\n\
                 then at the prompt 'Do you want to logout existing desktop session?' answer N.",
    single_prompt: "Paste the message link (https://t.me/...):",
    tdl_path_title: "TDL path",
    tdl_path_prompt: "Path to TDL:",
    media_dir_title: "Media directory",
    media_dir_prompt: "Directory to save into:",
    base_link_title: "Base Telegram URL",
    base_link_prompt: "Enter base link (https://t.me/c/12345678/ or https://t.me/username/ \
                       or https://t.me/c/12345678/166/):",
    message_link_title: "Message URL",
    message_link_prompt: "Enter Telegram message URL (https://t.me/c/12345678/123 or \
                          https://t.me/username/123 or https://t.me/c/12345678/166/4771):",
    start_id_title: "Start Index",
    start_id_prompt: "Enter startId (positive integer, default 1):",
    end_id_title: "End Index",
    end_id_prompt: "Enter endId (>= {start}, default {default}):",
    task_limit_title: "Task Limit",
    task_limit_prompt: "Max concurrent download tasks (1-10) [default 2]:",
    threads_title: "Threads",
    threads_prompt: "Max threads per task (1-8) [default 4]:",
    continue_title: "Previous task",
    continue_range_prompt: "A saved range task was found. Continue it?",
    continue_full_prompt: "A saved full chat task was found. Continue it?",
    install_pwsh_prompt: "PowerShell {version} or newer was not found. Install it with winget?",
    install_pwsh_failed: "PowerShell installation failed",
};

const RU: Texts = Texts {
    title: "TDL Easy Launcher",
    menu: "Меню:",
    install_update: "УСТАНОВИТЬ/ОБНОВИТЬ TDL",
    telegram_login: "ЛОГИН В TELEGRAM",
    download_single: "СКАЧАТЬ ОДИНОЧНЫЙ ФАЙЛ",
    download_range: "СКАЧАТЬ ДИАПАЗОН ПОСТОВ",
    download_full: "СКАЧАТЬ ВСЁ ИЗ ЧАТА",
    exit: "ВЫХОД",
    close_terminal: "Закрыть терминал",
    hint_close: "PowerShell-окна авто-закрываются по завершении.",
    hint_no_close: "PowerShell-окна остаются открытыми после выполнения.",
    ok: "ОК",
    cancel: "Отмена",
    browse: "Обзор...",
    error_title: "Ошибка",
    invalid_title: "Неверный ввод",
    login_info: "Откроется консоль: выберите user ID, затем ответьте 'N' на запрос \
                 'Do you want to logout existing desktop session?'.",
    single_prompt: "Вставьте ссылку на сообщение (https://t.me/...):",
    tdl_path_title: "Путь к TDL",
    tdl_path_prompt: "Путь к TDL:",
    media_dir_title: "Папка для медиа",
    media_dir_prompt: "Папка для сохранения:",
    base_link_title: "Базовая ссылка Telegram",
    base_link_prompt: "Введите базовую ссылку (https://t.me/c/12345678/ или https://t.me/username/ \
                       или https://t.me/c/12345678/166/):",
    message_link_title: "Ссылка на сообщение",
    message_link_prompt: "Введите ссылку на сообщение (https://t.me/c/12345678/123 или \
                          https://t.me/username/123 или https://t.me/c/12345678/166/4771):",
    start_id_title: "Начальный индекс",
    start_id_prompt: "Введите startId (целое положительное, по умолчанию 1):",
    end_id_title: "Конечный индекс",
    end_id_prompt: "Введите endId (>= {start}, по умолчанию {default}):",
    task_limit_title: "Лимит задач",
    task_limit_prompt: "Макс. одновременных загрузок (1-10) [по умолчанию 2]:",
    threads_title: "Потоки",
    threads_prompt: "Макс. потоков на задачу (1-8) [по умолчанию 4]:",
    continue_title: "Предыдущая задача",
    continue_range_prompt: "Найдена сохранённая задача диапазона. Продолжить её?",
    continue_full_prompt: "Найдена сохранённая задача полного чата. Продолжить её?",
    install_pwsh_prompt: "PowerShell ≥{version} не найден. Установить через winget?",
    install_pwsh_failed: "Не удалось установить PowerShell",
};

impl Texts {
    pub fn for_lang(lang: Lang) -> &'static Texts {
        match lang {
            Lang::En => &EN,
            Lang::Ru => &RU,
        }
    }

    pub fn hint(&self, close_terminal: bool) -> &'static str {
        if close_terminal {
            self.hint_close
        } else {
            self.hint_no_close
        }
    }
}
