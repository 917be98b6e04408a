//! Configuration loading and parsing.
//!
//! Reads `quill.toml` (or an override path provided by the binary). Every
//! section and field is optional; unknown fields are ignored so older files
//! keep loading. A missing file yields defaults, and so does a file that fails
//! to parse, after a warning on the `config` target.
//!
//! ```toml
//! [keys]
//! use_defaults = true
//! bindings = [ { keys = "C-x u", command = "undo" } ]
//!
//! [io]
//! load_progress_bytes = 1048576
//! save_progress_lines = 26214
//!
//! [runtime]
//! shutdown_grace_ms = 2000
//! ```
//!
//! User bindings replace default bindings with the same key sequence. Any
//! other conflict is a configuration error reported by [`Config::key_map`].

use anyhow::{Context, Result};
use core_events::{KeySeq, parse_key_seq};
use core_keymap::{DEFAULT_BINDINGS, KeyMap};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "quill.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    pub keys: String,
    pub command: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeysConfig {
    #[serde(default = "KeysConfig::default_use_defaults")]
    pub use_defaults: bool,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            use_defaults: Self::default_use_defaults(),
            bindings: Vec::new(),
        }
    }
}

impl KeysConfig {
    const fn default_use_defaults() -> bool {
        true
    }
}

/// Progress reporting granularity of load/save workers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct IoConfig {
    /// Bytes read between two load progress reports.
    #[serde(default = "IoConfig::default_load_progress_bytes")]
    pub load_progress_bytes: u64,
    /// Lines written between two save progress reports.
    #[serde(default = "IoConfig::default_save_progress_lines")]
    pub save_progress_lines: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            load_progress_bytes: Self::default_load_progress_bytes(),
            save_progress_lines: Self::default_save_progress_lines(),
        }
    }
}

impl IoConfig {
    const fn default_load_progress_bytes() -> u64 {
        1 << 20
    }
    const fn default_save_progress_lines() -> usize {
        (1 << 20) / 40
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// How long shutdown waits for in-flight saves/loads before cancelling them.
    #[serde(default = "RuntimeConfig::default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: Self::default_shutdown_grace_ms(),
        }
    }
}

impl RuntimeConfig {
    const fn default_shutdown_grace_ms() -> u64 {
        2000
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File the configuration came from, when one was read.
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                bindings = file.keys.bindings.len(),
                use_defaults = file.keys.use_defaults,
                "config_loaded"
            );
            Ok(Config {
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn io(&self) -> IoConfig {
        self.file.io
    }

    pub fn runtime(&self) -> RuntimeConfig {
        self.file.runtime
    }

    /// Build the validated key map: defaults (unless disabled) overlaid with
    /// the user bindings.
    pub fn key_map(&self) -> Result<KeyMap> {
        let user = self
            .file
            .keys
            .bindings
            .iter()
            .map(|b| {
                parse_key_seq(&b.keys)
                    .map(|seq| (seq, b.command.clone()))
                    .with_context(|| format!("invalid key sequence `{}` in [keys]", b.keys))
            })
            .collect::<Result<Vec<(KeySeq, String)>>>()?;

        let mut table: Vec<(KeySeq, String)> = Vec::new();
        if self.file.keys.use_defaults {
            for (notation, command) in DEFAULT_BINDINGS {
                let seq = parse_key_seq(notation)
                    .with_context(|| format!("invalid default key sequence `{notation}`"))?;
                if user.iter().any(|(u, _)| *u == seq) {
                    info!(target: "config", keys = notation, default = command, "default_binding_overridden");
                    continue;
                }
                table.push((seq, command.to_string()));
            }
        }
        table.extend(user);
        KeyMap::build(table).context("invalid key bindings")
    }
}
