use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::error::LaunchError;
use crate::paths::LauncherPaths;
use crate::task::TaskKind;

pub const UPDATER_SCRIPT: &str = "tdl-updater.ps1";
pub const SINGLE_SCRIPT: &str = "tdl-easy-single.ps1";
pub const SINGLE_WRAPPER: &str = "tdl-easy-single-wrapper.ps1";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

// `$telegramUrl = Read-Host` plus its optional prompt argument, stopping
// before anything else on the line.
static URL_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\$telegramUrl\s*=\s*Read-Host\b(?:[ \t]+(?:-Prompt[ \t]+)?(?:"[^"\r\n]*"|'[^'\r\n]*'|[^\s;}"']+))?"#,
    )
    .expect("URL prompt regex is valid")
});

impl TaskKind {
    pub fn script(self) -> &'static str {
        match self {
            Self::Range => "tdl-easy-range.ps1",
            Self::FullChat => "tdl-easy-full.ps1",
        }
    }

    pub fn wrapper(self) -> &'static str {
        match self {
            Self::Range => "tdl-easy-range-wrapper.ps1",
            Self::FullChat => "tdl-easy-full-wrapper.ps1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyEncoding {
    #[default]
    Utf16,
    Ascii,
}

/// Puts a stock script into the launcher directory, refreshing it from the
/// bundle when the bundle carries it.
pub fn ensure_script(paths: &LauncherPaths, name: &str) -> Result<PathBuf> {
    let dest = paths.in_launcher_dir(name);
    match paths.bundled(name) {
        Some(src) => {
            fs::copy(&src, &dest).with_context(|| format!("Failed to copy {name}"))?;
            tracing::debug!("Copied {} to {}", src.display(), dest.display());
            Ok(dest)
        }
        None if dest.is_file() => Ok(dest),
        None => Err(LaunchError::ScriptNotFound(name.to_string()).into()),
    }
}

pub fn decode_script(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        let units = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    let rest = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(rest).into_owned()
}

pub fn read_script(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(decode_script(&bytes))
}

pub fn prefill_url(script: &str, url: &str) -> String {
    let literal = format!("$telegramUrl = '{}'", url.replace('\'', "''"));
    URL_PROMPT
        .replace_all(script, NoExpand(&literal))
        .into_owned()
}

pub fn write_single_wrapper(paths: &LauncherPaths, url: &str) -> Result<PathBuf> {
    let original = ensure_script(paths, SINGLE_SCRIPT)?;
    let script = read_script(&original)?;
    if !URL_PROMPT.is_match(&script) {
        tracing::warn!(
            "{} has no URL prompt to pre-fill; the console will ask for it",
            SINGLE_SCRIPT
        );
    }
    let wrapper = paths.in_launcher_dir(SINGLE_WRAPPER);
    fs::write(&wrapper, prefill_url(&script, url))
        .with_context(|| format!("Failed to write {SINGLE_WRAPPER}"))?;
    Ok(wrapper)
}

pub fn auto_yes_wrapper(script_name: &str) -> String {
    format!(
        "# Auto wrapper: answer Yes to saved parameters prompt and invoke original\n\
         function Read-Host {{\n    param($prompt)\n    return 'Yes'\n}}\n\
         & '.\\{script_name}'\n"
    )
}

pub fn write_auto_yes_wrapper(paths: &LauncherPaths, kind: TaskKind) -> Result<PathBuf> {
    ensure_script(paths, kind.script())?;
    let wrapper = paths.in_launcher_dir(kind.wrapper());
    fs::write(&wrapper, auto_yes_wrapper(kind.script()))
        .with_context(|| format!("Failed to write {}", kind.wrapper()))?;
    Ok(wrapper)
}

fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut out = UTF16LE_BOM.to_vec();
    out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    out
}

fn legacy_bytes(bytes: &[u8], mode: LegacyEncoding) -> Option<Vec<u8>> {
    match mode {
        LegacyEncoding::Utf16 if bytes.starts_with(UTF16LE_BOM) => None,
        LegacyEncoding::Utf16 => Some(encode_utf16le(&decode_script(bytes))),
        LegacyEncoding::Ascii if bytes.is_ascii() => None,
        LegacyEncoding::Ascii => {
            let ascii: String = decode_script(bytes).chars().filter(char::is_ascii).collect();
            Some(ascii.into_bytes())
        }
    }
}

/// Rewrites every `.ps1` in `dir` for Windows PowerShell 5.x. Files that fail
/// are logged and skipped. Returns how many files were rewritten.
pub fn apply_legacy_encoding(dir: &Path, mode: LegacyEncoding) -> Result<usize> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut rewritten = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_script = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ps1"));
        if !is_script || !path.is_file() {
            continue;
        }
        let result = fs::read(&path).and_then(|bytes| match legacy_bytes(&bytes, mode) {
            Some(out) => fs::write(&path, out).map(|()| true),
            None => Ok(false),
        });
        match result {
            Ok(true) => rewritten += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!("Skipping re-encode of {}: {}", path.display(), e),
        }
    }
    tracing::info!("Re-encoded {} script(s) as {:?}", rewritten, mode);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STOCK_SINGLE: &str = "Write-Host 'Скачивание'\n$telegramUrl = Read-Host \"Link\"\ntdl dl -u $telegramUrl\n";

    fn fixture() -> (TempDir, TempDir, LauncherPaths) {
        let launcher = TempDir::new().unwrap();
        let bundle = TempDir::new().unwrap();
        let paths = LauncherPaths::new(launcher.path(), Some(bundle.path().to_path_buf()));
        (launcher, bundle, paths)
    }

    #[test]
    fn test_ensure_script_refreshes_from_bundle() {
        let (launcher, bundle, paths) = fixture();
        fs::write(bundle.path().join(UPDATER_SCRIPT), "new").unwrap();
        fs::write(launcher.path().join(UPDATER_SCRIPT), "old").unwrap();

        let dest = ensure_script(&paths, UPDATER_SCRIPT).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), "new");
    }

    #[test]
    fn test_ensure_script_falls_back_to_launcher_copy() {
        let (launcher, _bundle, paths) = fixture();
        fs::write(launcher.path().join(UPDATER_SCRIPT), "local").unwrap();
        let dest = ensure_script(&paths, UPDATER_SCRIPT).unwrap();
        assert_eq!(dest, launcher.path().join(UPDATER_SCRIPT));
    }

    #[test]
    fn test_ensure_script_reports_missing_script() {
        let (_launcher, _bundle, paths) = fixture();
        let err = ensure_script(&paths, UPDATER_SCRIPT).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::ScriptNotFound(name)) if name == UPDATER_SCRIPT
        ));
    }

    #[test]
    fn test_prefill_url_escapes_single_quotes() {
        let out = prefill_url("$telegramUrl = Read-Host 'x'\r\nnext", "https://t.me/it's/1");
        assert_eq!(out, "$telegramUrl = 'https://t.me/it''s/1'\r\nnext");
    }

    #[test]
    fn test_prefill_url_keeps_rest_of_line() {
        let url = "https://t.me/c/1/2";
        assert_eq!(
            prefill_url("while (-not $telegramUrl) { $telegramUrl = Read-Host \"Link\" }", url),
            "while (-not $telegramUrl) { $telegramUrl = 'https://t.me/c/1/2' }"
        );
        assert_eq!(
            prefill_url("$telegramUrl = Read-Host -Prompt 'Link'; Write-Host $telegramUrl", url),
            "$telegramUrl = 'https://t.me/c/1/2'; Write-Host $telegramUrl"
        );
        assert_eq!(
            prefill_url("if ($true) { $telegramUrl = Read-Host }", url),
            "if ($true) { $telegramUrl = 'https://t.me/c/1/2' }"
        );
        assert_eq!(
            prefill_url("$telegramUrl = Read-Host Link\n", url),
            "$telegramUrl = 'https://t.me/c/1/2'\n"
        );
    }

    #[test]
    fn test_single_wrapper_replaces_prompt() {
        let (launcher, bundle, paths) = fixture();
        fs::write(bundle.path().join(SINGLE_SCRIPT), STOCK_SINGLE).unwrap();

        let wrapper = write_single_wrapper(&paths, "https://t.me/c/1/2").unwrap();
        assert_eq!(wrapper, launcher.path().join(SINGLE_WRAPPER));
        let text = fs::read_to_string(wrapper).unwrap();
        assert!(text.contains("$telegramUrl = 'https://t.me/c/1/2'\ntdl dl"));
        assert!(!text.contains("Read-Host"));
        assert!(text.contains("Скачивание"));
    }

    #[test]
    fn test_single_wrapper_reads_reencoded_stock_script() {
        let (launcher, _bundle, paths) = fixture();
        fs::write(launcher.path().join(SINGLE_SCRIPT), encode_utf16le(STOCK_SINGLE)).unwrap();

        let wrapper = write_single_wrapper(&paths, "https://t.me/c/1/2").unwrap();
        let text = fs::read_to_string(wrapper).unwrap();
        assert!(text.starts_with("Write-Host 'Скачивание'"));
        assert!(text.contains("$telegramUrl = 'https://t.me/c/1/2'"));
    }

    #[test]
    fn test_auto_yes_wrapper_content() {
        let expected = "# Auto wrapper: answer Yes to saved parameters prompt and invoke original\n\
                        function Read-Host {\n    param($prompt)\n    return 'Yes'\n}\n\
                        & '.\\tdl-easy-range.ps1'\n";
        assert_eq!(auto_yes_wrapper("tdl-easy-range.ps1"), expected);
    }

    #[test]
    fn test_write_auto_yes_wrapper_requires_stock_script() {
        let (launcher, bundle, paths) = fixture();
        assert!(write_auto_yes_wrapper(&paths, TaskKind::FullChat).is_err());

        fs::write(bundle.path().join("tdl-easy-full.ps1"), "# full").unwrap();
        let wrapper = write_auto_yes_wrapper(&paths, TaskKind::FullChat).unwrap();
        assert_eq!(wrapper, launcher.path().join("tdl-easy-full-wrapper.ps1"));
        assert!(launcher.path().join("tdl-easy-full.ps1").is_file());
    }

    #[test]
    fn test_utf16_reencode_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.ps1"), STOCK_SINGLE).unwrap();
        fs::write(dir.path().join("notes.txt"), "Привет").unwrap();

        assert_eq!(apply_legacy_encoding(dir.path(), LegacyEncoding::Utf16).unwrap(), 1);
        let bytes = fs::read(dir.path().join("a.ps1")).unwrap();
        assert!(bytes.starts_with(UTF16LE_BOM));
        assert_eq!(decode_script(&bytes), STOCK_SINGLE);

        assert_eq!(apply_legacy_encoding(dir.path(), LegacyEncoding::Utf16).unwrap(), 0);
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "Привет");
    }

    #[test]
    fn test_ascii_mode_strips_non_ascii() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.PS1"), "Write-Host 'ok ✅ готово'").unwrap();

        assert_eq!(apply_legacy_encoding(dir.path(), LegacyEncoding::Ascii).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("b.PS1")).unwrap(),
            "Write-Host 'ok  '"
        );
        assert_eq!(apply_legacy_encoding(dir.path(), LegacyEncoding::Ascii).unwrap(), 0);
    }

    #[test]
    fn test_decode_script_strips_utf8_bom() {
        assert_eq!(decode_script(b"\xEF\xBB\xBFabc"), "abc");
    }
}
