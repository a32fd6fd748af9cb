use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    /// Ledger file used when neither --ledger nor WBAM_LEDGER is given
    #[serde(default)]
    pub(crate) ledger: Option<PathBuf>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) compact: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    /// File this config was read from
    #[serde(skip)]
    pub(crate) source: Option<PathBuf>,
}

impl Config {
    pub(crate) fn load() -> Self {
        Self::load_from(&Self::get_config_paths())
    }

    fn load_from(paths: &[PathBuf]) -> Self {
        for path in paths {
            if let Some(config) = Self::read(path) {
                return config;
            }
        }
        Self::default()
    }

    // Runs before logging is initialized, so problems go straight to stderr.
    fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str::<Config>(&content) {
            Ok(mut config) => {
                config.source = Some(path.to_path_buf());
                Some(config)
            }
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/wbam/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("wbam").join("config.toml"));
        }

        // 2. Platform config dir, e.g. ~/Library/Application Support/wbam/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("wbam").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.wbam.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".wbam.toml"));
        }

        paths
    }
}
