use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    models::{
        DEFAULT_CHUNK_SIZE, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_IN_FLIGHT,
        DEFAULT_PAGE_SIZE, RankingConfig,
    },
    sources::{EnvConfig, FileConfig},
};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["forecourt.toml", "config/forecourt.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RankingConfigLoader {
    options: ConfigLoaderOptions,
}

/// Outcome of a successful load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: RankingConfig,
    /// File the values came from, if any.
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    pub warnings: Vec<String>,
}

impl RankingConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let (config, warnings) = compose(file_config, env_config)?;

        for warning in &warnings {
            warn!(%warning, "ranking configuration adjusted");
        }
        debug!(
            page_size = config.page_size,
            chunk_size = config.chunk_size,
            max_in_flight = config.max_in_flight,
            fetch_timeout = ?config.fetch_timeout,
            path = ?config_path,
            "ranking configuration loaded"
        );

        Ok(ConfigLoad {
            config,
            config_path,
            env_file_loaded,
            warnings,
        })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let required = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match required {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Merge file and environment values; environment wins.
pub(crate) fn compose(
    file_config: Option<FileConfig>,
    env: EnvConfig,
) -> Result<(RankingConfig, Vec<String>), ConfigLoadError> {
    let mut warnings = Vec::new();
    let file = file_config.unwrap_or_default().ranking;

    let page_size = env
        .page_size
        .or(file.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ConfigLoadError::Invalid {
            field: "page_size",
            reason: "must be at least 1".into(),
        });
    }

    let chunk_size = env
        .chunk_size
        .or(file.chunk_size)
        .unwrap_or(DEFAULT_CHUNK_SIZE);
    if chunk_size == 0 {
        return Err(ConfigLoadError::Invalid {
            field: "chunk_size",
            reason: "must be at least 1".into(),
        });
    }

    let mut max_in_flight = env
        .max_in_flight
        .or(file.max_in_flight)
        .unwrap_or(DEFAULT_MAX_IN_FLIGHT);
    if max_in_flight == 0 {
        warnings.push("max_in_flight of 0 raised to 1".to_string());
        max_in_flight = 1;
    }

    let fetch_timeout = match env.fetch_timeout.or(file.fetch_timeout) {
        Some(raw) => parse_timeout(&raw)?,
        None => DEFAULT_FETCH_TIMEOUT,
    };

    Ok((
        RankingConfig {
            page_size,
            chunk_size,
            max_in_flight,
            fetch_timeout,
        },
        warnings,
    ))
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigLoadError> {
    let timeout = humantime::parse_duration(raw.trim()).map_err(|err| {
        ConfigLoadError::Invalid {
            field: "fetch_timeout",
            reason: format!("{raw:?}: {err}"),
        }
    })?;
    if timeout.is_zero() {
        return Err(ConfigLoadError::Invalid {
            field: "fetch_timeout",
            reason: "must be greater than zero".into(),
        });
    }
    Ok(timeout)
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::FileRankingConfig;
    use std::io::Write;

    fn file(ranking: FileRankingConfig) -> Option<FileConfig> {
        Some(FileConfig { ranking })
    }

    #[test]
    fn defaults_apply_without_sources() {
        let (config, warnings) = compose(None, EnvConfig::default()).unwrap();
        assert_eq!(config, RankingConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn environment_overrides_file() {
        let env = EnvConfig {
            chunk_size: Some(500),
            fetch_timeout: Some("5s".into()),
            ..EnvConfig::default()
        };
        let (config, _) = compose(
            file(FileRankingConfig {
                page_size: Some(24),
                chunk_size: Some(100),
                max_in_flight: Some(4),
                fetch_timeout: Some("1m".into()),
            }),
            env,
        )
        .unwrap();

        assert_eq!(config.page_size, 24);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.max_in_flight, 4);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = compose(
            file(FileRankingConfig {
                page_size: Some(0),
                ..FileRankingConfig::default()
            }),
            EnvConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid {
                field: "page_size",
                ..
            }
        ));

        let env = EnvConfig {
            chunk_size: Some(0),
            ..EnvConfig::default()
        };
        let err = compose(None, env).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid {
                field: "chunk_size",
                ..
            }
        ));
    }

    #[test]
    fn zero_in_flight_is_raised_with_warning() {
        let env = EnvConfig {
            max_in_flight: Some(0),
            ..EnvConfig::default()
        };
        let (config, warnings) = compose(None, env).unwrap();
        assert_eq!(config.max_in_flight, 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["soon", "0s"] {
            let env = EnvConfig {
                fetch_timeout: Some(raw.into()),
                ..EnvConfig::default()
            };
            let err = compose(None, env).unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigLoadError::Invalid {
                        field: "fetch_timeout",
                        ..
                    }
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn reads_toml_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "[ranking]\npage_size = 20\nchunk_size = 250\nfetch_timeout = \"45s\""
        )
        .unwrap();

        let parsed = read_file_config(tmp.path()).unwrap();
        assert_eq!(parsed.ranking.page_size, Some(20));
        assert_eq!(parsed.ranking.chunk_size, Some(250));
        assert_eq!(parsed.ranking.fetch_timeout.as_deref(), Some("45s"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[ranking\npage_size = ").unwrap();

        let err = read_file_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader =
            RankingConfigLoader::new().with_config_path(dir.path().join("nope.toml"));
        let err = loader.load_file_config(&EnvConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecourt.toml");
        fs::write(&path, "[ranking]\nmax_in_flight = 3\n").unwrap();

        let loader = RankingConfigLoader::new().with_config_path(&path);
        let (file, resolved) =
            loader.load_file_config(&EnvConfig::default()).unwrap();
        assert_eq!(resolved.as_deref(), Some(path.as_path()));
        assert_eq!(file.unwrap().ranking.max_in_flight, Some(3));
    }
}
