//! Config directory resolution and `console.conf`.
//!
//! All config files share one flat `key = value` format with `#` comments.
//! Missing files are created with defaults so users have something to edit.

use std::path::{Path, PathBuf};

use crate::screens::user_list::DEFAULT_PAGE_SIZE;

pub const APP_DIR: &str = "user-center-tui";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `$XDG_CONFIG_HOME/user-center-tui`, falling back to `~/.config/user-center-tui`,
/// then the working directory.
pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }
    PathBuf::from(".")
}

/// Iterate the `key = value` pairs of a config file body.
pub fn key_values(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (lhs, rhs) = line.split_once('=')?;
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if lhs.is_empty() || rhs.is_empty() { None } else { Some((lhs, rhs)) }
    })
}

/// Backend connection settings from `console.conf`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    /// Load `path`, or write the defaults there if it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let cfg = Self::default();
        let _ = cfg.write_file(path);
        cfg
    }

    /// Parse a config file; unknown keys and unparsable values are skipped.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = Self::default();
        for (key, val) in key_values(&contents) {
            match key {
                "base_url" => cfg.base_url = val.to_string(),
                "page_size" => {
                    if let Ok(n) = val.parse::<u32>() {
                        cfg.page_size = n.max(1);
                    }
                }
                "timeout_secs" => {
                    if let Ok(n) = val.parse::<u64>() {
                        cfg.timeout_secs = n.max(1);
                    }
                }
                _ => {}
            }
        }
        Some(cfg)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-center-tui backend settings\n");
        buf.push_str("# Command-line flags and USER_CENTER_* variables override these.\n\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        let _ = writeln!(&mut buf, "page_size = {}", self.page_size);
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout_secs);
        std::fs::write(path, buf)
    }
}
