//! Configuration loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROJECT_CONFIG_FILES: [&str; 2] = ["dbrain.toml", ".dbrain.toml"];
const ENV_PREFIX: &str = "DBRAIN_";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}

/// What the caller asked for on the command line
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    /// Skip every config file; defaults and `DBRAIN_*` env still apply
    pub no_config: bool,
    /// Overrides `provider.name`
    pub provider: Option<String>,
}

/// One place configuration may come from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. `--provider` override
    /// 2. `DBRAIN_*` environment variables (`__` separates sections)
    /// 3. Explicit `--config` path
    /// 4. Project root: `./dbrain.toml` or `./.dbrain.toml`
    /// 5. Global: `$XDG_CONFIG_HOME/dbrain/config.toml`
    /// 6. Default values
    pub fn load(options: &LoadOptions) -> Result<FileConfig, LoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if !options.no_config {
            if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
                figment = figment.merge(Toml::file(global));
            }
            if let Some(project) = Self::project_config_path() {
                figment = figment.merge(Toml::file(project));
            }
            if let Some(path) = &options.config_path {
                if !path.exists() {
                    return Err(LoadError::MissingFile(path.clone()));
                }
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: FileConfig = figment.extract().map_err(Box::new)?;
        if let Some(provider) = &options.provider {
            config.provider.name = provider.clone();
        }
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dbrain").join("config.toml"))
    }

    /// First project-level config file present in the current directory
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Config locations in priority order, for `check-config`
    pub fn sources(options: &LoadOptions) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = &options.config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: !options.no_config && path.exists(),
            });
        }
        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: !options.no_config,
            },
            None => ConfigSource {
                label: "Project",
                location: "./dbrain.toml or ./.dbrain.toml".to_string(),
                found: false,
            },
        });
        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: !options.no_config && path.exists(),
                location: path.display().to_string(),
            });
        }
        sources.push(ConfigSource {
            label: "Env",
            location: format!("{}*", ENV_PREFIX),
            found: std::env::vars().any(|(k, _)| k.starts_with(ENV_PREFIX)),
        });
        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_global_config_path() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("dbrain/config.toml"));
    }

    #[test]
    fn test_explicit_file_and_provider_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[vault]\npath = \"/data/vault\"\n\n[execution]\nmax_iterations = 4\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&LoadOptions {
            config_path: Some(path),
            no_config: false,
            provider: Some("openai".to_string()),
        })
        .unwrap();

        assert_eq!(config.vault.path, PathBuf::from("/data/vault"));
        assert_eq!(config.execution.max_iterations, 4);
        assert_eq!(config.execution.timeout_secs, 1200);
        assert_eq!(config.provider.name, "openai");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ConfigLoader::load(&LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/dbrain.toml")),
            ..LoadOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingFile(_)));
    }

    #[test]
    fn test_no_config_ignores_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[execution]\nmax_iterations = 2\n").unwrap();

        let config = ConfigLoader::load(&LoadOptions {
            config_path: Some(path),
            no_config: true,
            provider: None,
        })
        .unwrap();
        assert_eq!(config.execution.max_iterations, 8);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[execution]\nmax_iterations = \"many\"\n").unwrap();

        let err = ConfigLoader::load(&LoadOptions {
            config_path: Some(path),
            ..LoadOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, LoadError::Figment(_)));
    }

    #[test]
    fn test_project_config_lookup() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigLoader::project_config_in(dir.path()).is_none());

        std::fs::write(dir.path().join(".dbrain.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_in(dir.path()),
            Some(dir.path().join(".dbrain.toml"))
        );

        std::fs::write(dir.path().join("dbrain.toml"), "").unwrap();
        assert_eq!(
            ConfigLoader::project_config_in(dir.path()),
            Some(dir.path().join("dbrain.toml"))
        );
    }

    #[test]
    fn test_sources_end_with_defaults() {
        let sources = ConfigLoader::sources(&LoadOptions::default());
        let last = sources.last().unwrap();
        assert_eq!(last.label, "Default");
        assert!(last.found);
    }
}
