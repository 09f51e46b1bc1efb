/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// ```toml
/// [display]
/// viewport_width = 960
/// viewport_height = 640
///
/// [timing]
/// tick_rate_hz = 60
///
/// [physics]
/// gravity = 1
/// player_speed = 5
/// jump_power = 20
/// enemy_speed = -2
///
/// [general]
/// level_file = ""          # empty = built-in level
/// log_file = "skyhop.log"
///
/// [gamepad]
/// jump = ["A", "B"]
/// quit = ["Select"]
/// ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub tick_rate_hz: u32,
    pub physics: PhysicsConfig,
    pub gamepad: GamepadConfig,
    /// `None` = play the built-in level.
    pub level_file: Option<PathBuf>,
    pub log_file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub viewport_width: i32,
    pub viewport_height: i32,
}

/// Per-tick physics constants. Not scaled by wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsConfig {
    pub gravity: i32,
    pub player_speed: i32,
    pub jump_power: i32,
    /// Initial patrol `vx` for every enemy (negative = leftward).
    pub enemy_speed: i32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_power: default_jump_power(),
            enemy_speed: default_enemy_speed(),
        }
    }
}

impl GameConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_viewport_width")]
    viewport_width: i32,
    #[serde(default = "default_viewport_height")]
    viewport_height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_hz: u32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: i32,
    #[serde(default = "default_player_speed")]
    player_speed: i32,
    #[serde(default = "default_jump_power")]
    jump_power: i32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    level_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_viewport_width() -> i32 { 960 }
fn default_viewport_height() -> i32 { 640 }
fn default_tick_rate() -> u32 { 60 }
fn default_gravity() -> i32 { 1 }
fn default_player_speed() -> i32 { 5 }
fn default_jump_power() -> i32 { 20 }
fn default_enemy_speed() -> i32 { -2 }
fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "skyhop.log".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { tick_rate_hz: default_tick_rate() }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            player_speed: default_player_speed(),
            jump_power: default_jump_power(),
            enemy_speed: default_enemy_speed(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { jump: default_pad_jump(), quit: default_pad_quit() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { level_file: String::new(), log_file: default_log_file() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly (no file search).
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(cfg, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let level_file = if cfg.general.level_file.trim().is_empty() {
            None
        } else {
            Some(resolve_path(&cfg.general.level_file, search_dirs))
        };

        GameConfig {
            display: DisplayConfig {
                viewport_width: cfg.display.viewport_width,
                viewport_height: cfg.display.viewport_height,
            },
            tick_rate_hz: cfg.timing.tick_rate_hz,
            physics: PhysicsConfig {
                gravity: cfg.physics.gravity,
                player_speed: cfg.physics.player_speed,
                jump_power: cfg.physics.jump_power,
                enemy_speed: cfg.physics.enemy_speed,
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                quit: cfg.gamepad.quit,
            },
            level_file,
            log_file: PathBuf::from(cfg.general.log_file),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths are taken as-is; relative ones are looked up in the
/// candidate dirs, falling back to CWD-relative.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let p = Path::new(raw);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|c| c.is_file())
        .unwrap_or_else(|| p.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds data next to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/skyhop");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
///
/// Runs before the logger exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.display, DisplayConfig { viewport_width: 960, viewport_height: 640 });
        assert_eq!(cfg.tick_rate_hz, 60);
        assert_eq!(cfg.physics, PhysicsConfig::default());
        assert_eq!(cfg.physics.jump_power, 20);
        assert_eq!(cfg.physics.enemy_speed, -2);
        assert!(cfg.level_file.is_none());
        assert_eq!(cfg.log_file, PathBuf::from("skyhop.log"));
        assert_eq!(cfg.gamepad.jump, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[physics]\njump_power = 15\n\n[display]\nviewport_width = 1280\n",
        ).unwrap();
        assert_eq!(cfg.physics.jump_power, 15);
        assert_eq!(cfg.physics.gravity, 1);
        assert_eq!(cfg.display.viewport_width, 1280);
        assert_eq!(cfg.display.viewport_height, 640);
    }

    #[test]
    fn level_file_is_optional() {
        let cfg = GameConfig::parse("[general]\nlevel_file = \"/tmp/level.txt\"\n").unwrap();
        assert_eq!(cfg.level_file, Some(PathBuf::from("/tmp/level.txt")));

        let cfg = GameConfig::parse("[general]\nlevel_file = \"  \"\n").unwrap();
        assert!(cfg.level_file.is_none());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[physics]\ngravity = \"lots\"\n").is_err());
    }

    #[test]
    fn tick_duration_from_rate() {
        let cfg = GameConfig::default();
        let d = cfg.tick_duration();
        assert!(d > Duration::from_millis(16) && d < Duration::from_millis(17));
    }
}
