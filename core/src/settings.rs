use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, LayerVisibility};

const SETTINGS_DIR: &str = ".isomap";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted view preferences. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,

    pub show_floor: bool,
    pub show_left_walls: bool,
    pub show_right_walls: bool,

    /// Additive blending for walls flagged as light sources.
    pub transparency: bool,
    pub draw_empty_walls: bool,
    pub collision_overlay: bool,

    /// Directory holding the game's tileset and archive files.
    pub data_path: Option<PathBuf>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_DISPLAY_WIDTH,
            viewport_height: DEFAULT_DISPLAY_HEIGHT,

            show_floor: true,
            show_left_walls: true,
            show_right_walls: true,

            transparency: false,
            draw_empty_walls: false,
            collision_overlay: false,

            data_path: None,
        }
    }
}

impl ViewSettings {
    pub fn layers(&self) -> LayerVisibility {
        let mut layers = LayerVisibility::empty();
        layers.set(LayerVisibility::FLOOR, self.show_floor);
        layers.set(LayerVisibility::LEFT_WALL, self.show_left_walls);
        layers.set(LayerVisibility::RIGHT_WALL, self.show_right_walls);
        layers
    }

    pub fn set_layers(&mut self, layers: LayerVisibility) {
        self.show_floor = layers.contains(LayerVisibility::FLOOR);
        self.show_left_walls = layers.contains(LayerVisibility::LEFT_WALL);
        self.show_right_walls = layers.contains(LayerVisibility::RIGHT_WALL);
    }
}

/// `$HOME/.isomap/settings.json`, then `%APPDATA%`, then the working directory.
pub fn default_settings_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        log::info!("Using settings path under: {home}");
        return PathBuf::from(home).join(SETTINGS_DIR).join(SETTINGS_FILE);
    } else if let Ok(appdata) = std::env::var("APPDATA") {
        log::info!("Using settings path under: {appdata}");
        return PathBuf::from(appdata).join(SETTINGS_DIR).join(SETTINGS_FILE);
    }

    log::info!("Using fallback settings path: ./{SETTINGS_FILE}");
    PathBuf::from(SETTINGS_FILE)
}

/// Reads settings from `path`, or defaults if the file is missing or invalid.
pub fn load_settings(path: &Path) -> ViewSettings {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return ViewSettings::default(),
    };

    match serde_json::from_slice::<ViewSettings>(&bytes) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to parse settings file {:?}: {e}", path);
            ViewSettings::default()
        }
    }
}

/// Writes `settings` as pretty JSON, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &ViewSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings dir {:?}", parent))?;
    }

    let json =
        serde_json::to_string_pretty(settings).context("Failed to serialize settings to JSON")?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write settings file {:?}", path))?;

    log::info!("Saved settings to {:?}", path);
    Ok(())
}
