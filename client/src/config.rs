use log::Level;
use thiserror::Error;
use url::form_urlencoded;
use web_sys::Window;

use sketchsolve_shared::SOLVE_ENDPOINT;

/// Element ids the host page must provide.
pub mod ids {
    pub const CANVAS: &str = "drawingCanvas";
    pub const PENCIL: &str = "pencilBtn";
    pub const ERASER: &str = "eraserBtn";
    pub const UNDO: &str = "undoBtn";
    pub const REDO: &str = "redoBtn";
    pub const CLEAR: &str = "clearBtn";
    pub const SOLVE: &str = "solveBtn";
    pub const OUTPUT: &str = "solutionOutput";
    pub const SPINNER: &str = "loadingSpinner";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("endpoint override must be a same-origin absolute path, got {0:?}")]
    InvalidEndpoint(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: SOLVE_ENDPOINT.to_string(),
            debug: false,
        }
    }
}

impl Config {
    /// Reads `debug`/`log` switches and an `endpoint` override from a
    /// location search string such as `?debug=1&endpoint=/api/solve`.
    pub fn from_query(search: &str) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        let query = search.trim_start_matches('?');
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "debug" | "log" => {
                    config.debug = config.debug || value == "1" || value == "true";
                }
                "endpoint" => {
                    if !value.starts_with('/') || value.starts_with("//") {
                        return Err(ConfigError::InvalidEndpoint(value.to_string()));
                    }
                    config.endpoint = value.into_owned();
                }
                _ => {}
            }
        }
        Ok(config)
    }

    pub fn from_window(window: &Window) -> Result<Self, ConfigError> {
        let search = window.location().search().ok().unwrap_or_default();
        Self::from_query(&search)
    }

    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::Debug
        } else {
            Level::Info
        }
    }
}
