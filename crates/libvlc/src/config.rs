// libvlc instance configuration

use once_cell::sync::Lazy;
use std::ffi::CString;
use std::path::PathBuf;
use vlcmedia_core::{MediaError, Result};

/// Extra instance arguments, whitespace separated
pub const ARGS_ENV: &str = "VLCMEDIA_ARGS";

/// Directory holding libvlc's plugins
pub const PLUGIN_PATH_ENV: &str = "VLCMEDIA_PLUGIN_PATH";

/// Environment variable libvlc itself reads to locate plugins
const VLC_PLUGIN_PATH: &str = "VLC_PLUGIN_PATH";

static DEFAULT_ARGS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "--ignore-config",
        "--no-media-library",
        "--no-osd",
        "--no-video-title-show",
        "--no-stats",
        "--quiet",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
});

/// Settings used to create the libvlc instance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VlcConfig {
    /// Command line style arguments handed to `libvlc_new`
    pub args: Vec<String>,
    /// Overrides libvlc's plugin search path
    pub plugin_path: Option<PathBuf>,
}

impl Default for VlcConfig {
    fn default() -> Self {
        Self {
            args: DEFAULT_ARGS.clone(),
            plugin_path: None,
        }
    }
}

impl VlcConfig {
    /// Defaults extended by `VLCMEDIA_ARGS` and `VLCMEDIA_PLUGIN_PATH`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(extra) = std::env::var(ARGS_ENV) {
            config.push_args(&extra);
        }

        if let Some(path) = std::env::var_os(PLUGIN_PATH_ENV) {
            if !path.is_empty() {
                config.plugin_path = Some(PathBuf::from(path));
            }
        }

        config
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| MediaError::InvalidInput(format!("Invalid VLC config: {}", e)))
    }

    /// Append whitespace separated arguments
    pub fn push_args(&mut self, extra: &str) {
        self.args
            .extend(extra.split_whitespace().map(|arg| arg.to_string()));
    }

    /// Arguments as C strings, in order.
    pub fn c_args(&self) -> Result<Vec<CString>> {
        self.args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| {
                    MediaError::InvalidInput(format!("Argument contains NUL: {:?}", arg))
                })
            })
            .collect()
    }

    /// Export the plugin path for libvlc to pick up on instance creation.
    pub fn apply_plugin_path(&self) {
        if let Some(path) = &self.plugin_path {
            log::info!("Using VLC plugin path {}", path.display());
            std::env::set_var(VLC_PLUGIN_PATH, path);
        }
    }
}
