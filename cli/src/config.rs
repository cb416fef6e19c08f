use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use mention_editor::DEFAULT_BLUR_CLOSE_DELAY;
use mention_editor::DEFAULT_SEARCH_DEBOUNCE;
use mention_user_search::DEFAULT_LIMIT;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;

const MIN_BLUR_CLOSE_DELAY_MS: u64 = 50;
const MAX_BLUR_CLOSE_DELAY_MS: u64 = 1000;

/// Settings read from `config.toml`, with defaults for anything missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub blur_close_delay: Duration,
    pub search_debounce: Duration,
    pub max_results: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blur_close_delay: DEFAULT_BLUR_CLOSE_DELAY,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            max_results: DEFAULT_LIMIT,
        }
    }
}

impl Settings {
    pub fn with_blur_close_delay_ms(mut self, ms: u64) -> Self {
        self.blur_close_delay = clamp_blur_close_delay(ms);
        self
    }

    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce = Duration::from_millis(ms);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing file yields the defaults; a file that
    /// is not valid TOML is scanned line by line for the known keys.
    pub fn load(&self) -> anyhow::Result<Settings> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(Settings::default());
        };

        let doc = content.parse::<DocumentMut>().ok();
        let lookup = |table: Option<&str>, key: &str| -> Option<i64> {
            match &doc {
                Some(doc) => read_integer(doc, table, key),
                None => parse_integer_fallback(&content, table, key),
            }
        };

        let mut settings = Settings::default();
        if let Some(ms) = lookup(None, "blur_close_delay_ms").and_then(non_negative) {
            settings = settings.with_blur_close_delay_ms(ms);
        }
        if let Some(ms) = lookup(Some("search"), "debounce_ms").and_then(non_negative) {
            settings = settings.with_search_debounce_ms(ms);
        }
        if let Some(max) = lookup(Some("search"), "max_results").and_then(non_negative) {
            settings = settings.with_max_results(usize::try_from(max).unwrap_or(usize::MAX));
        }
        tracing::debug!(path = %self.path.display(), ?settings, "loaded config");
        Ok(settings)
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".mention-editor").join("config.toml")
}

fn clamp_blur_close_delay(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_BLUR_CLOSE_DELAY_MS, MAX_BLUR_CLOSE_DELAY_MS))
}

fn non_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

fn read_integer(doc: &DocumentMut, table: Option<&str>, key: &str) -> Option<i64> {
    let item = match table {
        Some(table) => doc
            .get(table)
            .and_then(TomlItem::as_table)
            .and_then(|table| table.get(key)),
        None => doc.get(key),
    };
    item.and_then(TomlItem::as_value).and_then(|v| v.as_integer())
}

/// Last assignment of `key` inside `table` (or before the first header when
/// `table` is `None`).
fn parse_integer_fallback(contents: &str, table: Option<&str>, key: &str) -> Option<i64> {
    let mut current: Option<&str> = None;
    let mut result = None;

    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            current = parse_table_header_name(trimmed);
            continue;
        }

        if current != table {
            continue;
        }

        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        if name.trim() != key {
            continue;
        }

        let token = value.split_whitespace().next().unwrap_or_default();
        if let Ok(parsed) = token.replace('_', "").parse::<i64>() {
            result = Some(parsed);
        }
    }

    result
}

fn parse_table_header_name(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if !line.starts_with('[') {
        return None;
    }
    let end = line.find(']')?;
    if end <= 1 {
        return None;
    }
    let name = line[1..end].trim();
    if name.is_empty() {
        return None;
    }
    Some(name)
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
