use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

const QUALIFIER: &str = "net.roblillack";
const ORGANIZATION: &str = "Piki";
const APPLICATION: &str = "piki-controls";
const CONFIG_FILE_NAME: &str = "controls.toml";

/// Editor-wide settings for control rendering and popup placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    /// Text colour of placeholder elements
    pub placeholder_color: String,
    /// Default sentinel text for controls that set none
    pub prefix: String,
    pub postfix: String,
    /// Controls are never disabled while designing
    pub design_mode: bool,
    pub line_height: f32,
    pub char_width: f32,
    /// Vertical offset added when placing the option popup
    pub popup_offset_y: f32,
}

impl Default for ControlOptions {
    fn default() -> Self {
        ControlOptions {
            placeholder_color: "#9c9b9b".to_string(),
            prefix: "{".to_string(),
            postfix: "}".to_string(),
            design_mode: false,
            line_height: 20.0,
            char_width: 8.0,
            popup_offset_y: 0.0,
        }
    }
}

impl ControlOptions {
    /// Options from `path`, or from the per-user config file when no path is
    /// given. Missing or malformed files yield the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(config_file_path);
        path.and_then(|path| load_options(&path)).unwrap_or_default()
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn load_options(path: &Path) -> Option<ControlOptions> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<ControlOptions>(&contents) {
        Ok(options) => Some(options),
        Err(err) => {
            tracing::warn!("Failed to parse control options {}: {err}", path.display());
            None
        }
    }
}

pub fn save_options(path: &Path, options: &ControlOptions) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml = toml::to_string_pretty(options).map_err(|err| {
        io::Error::new(ErrorKind::Other, format!("toml serialization error: {err}"))
    })?;

    fs::write(path, toml)
}
