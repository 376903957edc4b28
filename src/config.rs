/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from an
/// explicit path given on the command line. Falls back to sensible defaults
/// if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AppError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
    /// Problems met while loading; logged once logging is up.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub next: Vec<String>,
    pub skip: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    /// Fixed seed for the simulated players; random when absent.
    pub seed: Option<u64>,
    pub skip_intro: bool,
    pub log_file: PathBuf,
    pub log_level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_next")]
    next: Vec<String>,
    #[serde(default = "default_skip")]
    skip: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    skip_intro: bool,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_next() -> Vec<String> { vec!["R1".into(), "X".into()] }
fn default_skip() -> Vec<String> { vec!["Y".into()] }
fn default_log_file() -> String { "borderland.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            next: default_next(),
            skip: default_skip(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            skip_intro: false,
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let mut warnings = vec![];
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        Self::from_toml(toml_cfg, warnings)
    }

    /// Load from a path the user named. Unlike the search, a file that
    /// cannot be read or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let toml_cfg = toml::from_str::<TomlConfig>(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml(toml_cfg, vec![]))
    }

    fn from_toml(toml_cfg: TomlConfig, mut warnings: Vec<String>) -> Self {
        let tick_rate_ms = if toml_cfg.speed.tick_rate_ms == 0 {
            warnings.push("speed.tick_rate_ms must be positive; using default".into());
            default_tick_rate()
        } else {
            toml_cfg.speed.tick_rate_ms
        };

        GameConfig {
            speed: SpeedConfig { tick_rate_ms },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                next: toml_cfg.gamepad.next,
                skip: toml_cfg.gamepad.skip,
            },
            general: GeneralConfig {
                seed: toml_cfg.general.seed,
                skip_intro: toml_cfg.general.skip_intro,
                log_file: PathBuf::from(toml_cfg.general.log_file),
                log_level: toml_cfg.general.log_level,
            },
            warnings,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), vec![])
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        warnings.push(format!("{}: parse error, using defaults: {e}", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GameConfig {
        GameConfig::from_toml(toml::from_str(text).unwrap(), vec![])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.speed.tick_rate_ms, 50);
        assert_eq!(cfg.general.seed, None);
        assert!(!cfg.general.skip_intro);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.gamepad.confirm, vec!["A", "Start"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse(
            r#"
            [general]
            seed = 1234
            skip_intro = true

            [gamepad]
            next = ["L1"]
            "#,
        );
        assert_eq!(cfg.general.seed, Some(1234));
        assert!(cfg.general.skip_intro);
        assert_eq!(cfg.general.log_file, PathBuf::from("borderland.log"));
        assert_eq!(cfg.gamepad.next, vec!["L1"]);
        assert_eq!(cfg.gamepad.cancel, vec!["B", "Select"]);
    }

    #[test]
    fn zero_tick_rate_falls_back_with_warning() {
        let cfg = parse("[speed]\ntick_rate_ms = 0\n");
        assert_eq!(cfg.speed.tick_rate_ms, 50);
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = GameConfig::load_from(Path::new("/nonexistent/borderland.toml")).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }

    #[test]
    fn malformed_search_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("borderland-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[speed\ntick_rate_ms = ").unwrap();
        let mut warnings = vec![];
        let cfg = load_toml(&[dir.clone()], &mut warnings);
        assert_eq!(cfg.speed.tick_rate_ms, 50);
        assert_eq!(warnings.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
