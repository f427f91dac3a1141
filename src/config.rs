//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::navigation::DEFAULT_MAX_REDIRECTS;
use crate::routing::{ConfigurationError, RouteDefinition, RouteTable};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,

    /// Route definitions in priority order
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Navigation controller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Location resolved when the application starts
    #[serde(default = "default_initial_path")]
    pub initial_path: String,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_initial_path() -> String {
    "/".to_string()
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            initial_path: default_initial_path(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        // Try default config locations
        let config_paths = [
            dirs::config_dir().map(|p| p.join("waypoint").join("routes.toml")),
            Some(PathBuf::from("/etc/waypoint/routes.toml")),
            Some(PathBuf::from("./routes.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Compile the configured routes
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        Ok(RouteTable::build(self.routes.clone())?)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Router overrides
        if let Ok(path) = std::env::var("WAYPOINT_INITIAL_PATH") {
            self.router.initial_path = path;
        }
        if let Ok(hops) = std::env::var("WAYPOINT_MAX_REDIRECTS") {
            if let Ok(h) = hops.parse() {
                self.router.max_redirects = h;
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("WAYPOINT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WAYPOINT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            routes: default_routes(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Routes used when no configuration file is found
fn default_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::new("/", "Home")
            .named("home")
            .meta("title", "Home"),
        RouteDefinition::new("/queue", "Queue").named("queue"),
        RouteDefinition::new("/songs", "Songs").named("songs"),
        RouteDefinition::new("/albums", "Albums").named("albums"),
        RouteDefinition::new("/albums/:id", "Album").named("album"),
        RouteDefinition::new("/album/:id", "Album")
            .named("legacy-album")
            .redirect("/albums/:id"),
        RouteDefinition::new("/artists/:id", "Artist").named("artist"),
        RouteDefinition::new("/playlists/:id", "Playlist").named("playlist"),
        RouteDefinition::new("/search", "Search").named("search"),
        RouteDefinition::new("/settings", "Settings")
            .named("settings")
            .meta("requires_admin", true),
    ]
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid route configuration: {0}")]
    Routes(#[from] ConfigurationError),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Waypoint Configuration
#
# Environment variables override these settings:
# - WAYPOINT_INITIAL_PATH
# - WAYPOINT_MAX_REDIRECTS
# - WAYPOINT_LOG_LEVEL
# - WAYPOINT_LOG_FORMAT

[router]
# Location resolved at startup
initial_path = "/"

# Redirect hops allowed per navigation before giving up with "not found"
max_redirects = 8

# Routes are matched in the order they appear: the first match wins.
# Parameters are written ":name" or "{name}" and span a whole segment.

[[routes]]
name = "home"
pattern = "/"
view = "Home"
meta = { title = "Home" }

[[routes]]
name = "queue"
pattern = "/queue"
view = "Queue"

[[routes]]
name = "songs"
pattern = "/songs"
view = "Songs"

[[routes]]
name = "albums"
pattern = "/albums"
view = "Albums"

[[routes]]
name = "album"
pattern = "/albums/:id"
view = "Album"

[[routes]]
name = "legacy-album"
pattern = "/album/:id"
view = "Album"
redirect = "/albums/:id"

[[routes]]
name = "artist"
pattern = "/artists/:id"
view = "Artist"

[[routes]]
name = "playlist"
pattern = "/playlists/:id"
view = "Playlist"

[[routes]]
name = "search"
pattern = "/search"
view = "Search"

[[routes]]
name = "settings"
pattern = "/settings"
view = "Settings"
meta = { requires_admin = true }

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config.router.initial_path, "/");
        assert_eq!(config.router.max_redirects, 8);
        assert_eq!(config.routes.len(), 10);
        assert_eq!(config.logging.format, "pretty");

        let table = config.route_table().unwrap();
        assert_eq!(table.get("legacy-album").unwrap().redirect().unwrap().canonical(), "/albums/:id");
        assert_eq!(
            table.get("settings").unwrap().meta()["requires_admin"],
            serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn test_generated_matches_builtin_defaults() {
        let generated = Config::from_toml(&generate_default_config()).unwrap();
        assert_eq!(generated.routes, Config::default().routes);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [[routes]]
            pattern = "/"
            view = "Home"
            "#,
        )
        .unwrap();
        assert_eq!(config.router.initial_path, "/");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.routes.len(), 1);
        assert!(config.routes[0].name.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [router]
            initial_path = "/songs"

            [[routes]]
            pattern = "/songs"
            view = "Songs"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.router.initial_path, "/songs");
        assert_eq!(config.routes[0].view.as_str(), "Songs");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[routes]]\npattern = 42").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("WAYPOINT_INITIAL_PATH", "/queue");
        std::env::set_var("WAYPOINT_MAX_REDIRECTS", "not-a-number");
        std::env::set_var("WAYPOINT_LOG_FORMAT", "json");

        let config = Config::from_env();

        std::env::remove_var("WAYPOINT_INITIAL_PATH");
        std::env::remove_var("WAYPOINT_MAX_REDIRECTS");
        std::env::remove_var("WAYPOINT_LOG_FORMAT");

        assert_eq!(config.router.initial_path, "/queue");
        // Unparseable values leave the default in place
        assert_eq!(config.router.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.routes.len(), 10);
    }

    #[test]
    fn test_invalid_routes_surface_as_config_error() {
        let config = Config::from_toml(
            r#"
            [[routes]]
            pattern = "/users/:id"
            view = "User"

            [[routes]]
            pattern = "/users/{uid}"
            view = "Other"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.route_table().unwrap_err(),
            ConfigError::Routes(ConfigurationError::DuplicatePattern { .. })
        ));
    }
}
