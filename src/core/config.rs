//! Configuration resolution
//!
//! Settings come from three places with a fixed precedence: command-line
//! flags override environment variables, which override the config file.
//! Everything is folded into one immutable [`Session`] before any
//! network code runs, so the request path never consults the
//! environment on its own.

use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::SayError;
use crate::utils::url::normalize_base_url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// On-disk configuration, `config.toml` in the platform config
/// directory.
///
/// ```toml
/// model = "gpt-4o-mini"
/// base_url = "https://ai-gateway.example.com"
///
/// [headers]
/// x-provider = "bedrock"
/// x-model = "anthropic.claude-3-haiku-20240307-v1:0"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Static headers attached to the request, typically gateway
    /// routing headers that an intermediary interprets.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub insecure: Option<bool>,
}

impl ConfigFile {
    /// Load the config file, or an empty default when none exists.
    ///
    /// An explicit `path` must exist; the implicit default location may
    /// be absent.
    pub fn load(path: Option<&Path>) -> Result<ConfigFile, SayError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SayError::configuration(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from_path(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_path(&path),
                _ => Ok(ConfigFile::default()),
            },
        }
    }

    pub fn load_from_path(path: &Path) -> Result<ConfigFile, SayError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SayError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents)
            .map_err(|e| SayError::configuration(format!("invalid config {}: {e}", path.display())))
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sayonce").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Values gathered at process start that take precedence over the
/// config file: CLI flags plus the two environment variables.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// `--base-url`.
    pub base_url: Option<String>,
    /// `OPENAI_BASE_URL`.
    pub base_url_env: Option<String>,
    /// `--model`.
    pub model: Option<String>,
    /// `--header NAME=VALUE`, already split.
    pub headers: Vec<(String, String)>,
    /// `--insecure`.
    pub insecure: bool,
}

/// Everything the request path needs, resolved once and then immutable.
#[derive(Debug, Clone)]
pub struct Session {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub headers: Vec<(String, String)>,
    /// When true, TLS certificate verification is turned off on the
    /// HTTP client. Never set by default; requires an explicit opt-in.
    pub insecure: bool,
}

impl Session {
    pub fn resolve(overrides: Overrides, file: ConfigFile) -> Result<Session, SayError> {
        let api_key = match overrides.api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(SayError::configuration(
                    "OPENAI_API_KEY environment variable not set\n\n\
                     Please set your API key:\n\
                     export OPENAI_API_KEY=\"your-api-key-here\"",
                ))
            }
        };

        let base_url = overrides
            .base_url
            .or(overrides.base_url_env)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url);
        if base_url.is_empty() {
            return Err(SayError::configuration("base URL must not be empty"));
        }

        let model = match overrides.model.or(file.model) {
            Some(model) if !model.trim().is_empty() => model,
            _ => {
                return Err(SayError::configuration(
                    "no model configured\n\n\
                     Pass one with --model, or set `model` in config.toml",
                ))
            }
        };

        // File headers first, flags override entries with the same name.
        let mut headers = file.headers;
        for (name, value) in overrides.headers {
            headers.insert(name, value);
        }

        Ok(Session {
            api_key,
            base_url,
            model,
            headers: headers.into_iter().collect(),
            insecure: overrides.insecure || file.insecure.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn key_overrides() -> Overrides {
        Overrides {
            api_key: Some("sk-test".to_string()),
            model: Some("test-model".to_string()),
            ..Overrides::default()
        }
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let overrides = Overrides {
            model: Some("test-model".to_string()),
            ..Overrides::default()
        };
        let err = Session::resolve(overrides, ConfigFile::default()).unwrap_err();
        assert!(matches!(err, SayError::Configuration { .. }));
    }

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let overrides = Overrides {
            api_key: Some("   ".to_string()),
            model: Some("test-model".to_string()),
            ..Overrides::default()
        };
        let err = Session::resolve(overrides, ConfigFile::default()).unwrap_err();
        assert!(matches!(err, SayError::Configuration { .. }));
    }

    #[test]
    fn missing_model_is_a_configuration_error() {
        let overrides = Overrides {
            api_key: Some("sk-test".to_string()),
            ..Overrides::default()
        };
        let err = Session::resolve(overrides, ConfigFile::default()).unwrap_err();
        assert!(matches!(err, SayError::Configuration { .. }));
        assert!(err.to_string().contains("--model"));
    }

    #[test]
    fn base_url_defaults_to_openai() {
        let session = Session::resolve(key_overrides(), ConfigFile::default()).unwrap();
        assert_eq!(session.base_url, DEFAULT_BASE_URL);
        assert!(!session.insecure);
    }

    #[test]
    fn flag_base_url_beats_env_and_file() {
        let mut overrides = key_overrides();
        overrides.base_url = Some("https://flag.example.com/".to_string());
        overrides.base_url_env = Some("https://env.example.com".to_string());
        let file = ConfigFile {
            base_url: Some("https://file.example.com".to_string()),
            ..ConfigFile::default()
        };
        let session = Session::resolve(overrides, file).unwrap();
        assert_eq!(session.base_url, "https://flag.example.com");
    }

    #[test]
    fn env_base_url_beats_file() {
        let mut overrides = key_overrides();
        overrides.base_url_env = Some("https://env.example.com".to_string());
        let file = ConfigFile {
            base_url: Some("https://file.example.com".to_string()),
            ..ConfigFile::default()
        };
        let session = Session::resolve(overrides, file).unwrap();
        assert_eq!(session.base_url, "https://env.example.com");
    }

    #[test]
    fn model_flag_beats_file() {
        let mut overrides = key_overrides();
        overrides.model = Some("flag-model".to_string());
        let file = ConfigFile {
            model: Some("file-model".to_string()),
            ..ConfigFile::default()
        };
        let session = Session::resolve(overrides, file).unwrap();
        assert_eq!(session.model, "flag-model");
    }

    #[test]
    fn header_flags_override_file_headers_by_name() {
        let mut overrides = key_overrides();
        overrides.headers = vec![("x-provider".to_string(), "openai".to_string())];
        let mut file = ConfigFile::default();
        file.headers
            .insert("x-provider".to_string(), "bedrock".to_string());
        file.headers
            .insert("x-model".to_string(), "claude-3-haiku".to_string());
        let session = Session::resolve(overrides, file).unwrap();
        assert_eq!(
            session.headers,
            vec![
                ("x-model".to_string(), "claude-3-haiku".to_string()),
                ("x-provider".to_string(), "openai".to_string()),
            ]
        );
    }

    #[test]
    fn insecure_comes_from_flag_or_file() {
        let mut file = ConfigFile::default();
        file.insecure = Some(true);
        let session = Session::resolve(key_overrides(), file).unwrap();
        assert!(session.insecure);

        let mut overrides = key_overrides();
        overrides.insecure = true;
        let session = Session::resolve(overrides, ConfigFile::default()).unwrap();
        assert!(session.insecure);
    }

    #[test]
    fn load_parses_toml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "model = \"gpt-4o-mini\"\nbase_url = \"https://gw.example.com\"\n\n\
             [headers]\n\"x-provider\" = \"bedrock\""
        )
        .unwrap();

        let config = ConfigFile::load(Some(file.path())).unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.base_url.as_deref(), Some("https://gw.example.com"));
        assert_eq!(
            config.headers.get("x-provider").map(String::as_str),
            Some("bedrock")
        );
        assert_eq!(config.insecure, None);
    }

    #[test]
    fn load_rejects_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigFile::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, SayError::Configuration { .. }));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = [not toml").unwrap();
        let err = ConfigFile::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, SayError::Configuration { .. }));
    }
}
