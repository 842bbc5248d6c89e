mod file_config;

pub use file_config::{FileConfig, GeminiFileConfig};

use crate::ai::{
    GeminiSettings, DEFAULT_API_BASE_URL, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VOICE,
};
use crate::server::RequestsLoggingLevel;
use crate::studio::{
    default_search_index, load_search_index, Language, StudioSettings, DEFAULT_LIVE_MODEL,
    DEFAULT_PRODUCER_COUNT,
};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_METRICS_PORT: u16 = 9091;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub default_language: Option<String>,
    pub search_index_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub speech_model: Option<String>,
    pub live_model: Option<String>,
    pub voice: Option<String>,
    pub request_timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub default_language: Language,
    pub search_index_path: Option<PathBuf>,

    // Model endpoint
    pub gemini: GeminiConfig,
}

/// Listeners and request logging of the HTTP front.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub port: u16,
    /// Separate listener serving `/metrics`.
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// When set, static files are served at `/` instead of the stats page.
    pub frontend_dir_path: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Missing keys are tolerated; every feature call then fails at the API.
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub speech_model: String,
    pub live_model: String,
    pub voice: String,
    pub request_timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or(cli.logging_level);

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let default_language = match file
            .default_language
            .or_else(|| cli.default_language.clone())
        {
            Some(code) => code.parse::<Language>().map_err(anyhow::Error::msg)?,
            None => Language::default(),
        };

        let search_index_path = file
            .search_index_path
            .map(PathBuf::from)
            .or_else(|| cli.search_index_path.clone());
        if let Some(path) = &search_index_path {
            if !path.is_file() {
                bail!("Search index file does not exist: {:?}", path);
            }
        }

        // Model endpoint settings - [gemini] section over CLI over defaults
        let gemini_file = file.gemini.unwrap_or_default();
        let api_key = gemini_file
            .api_key
            .or_else(|| cli.api_key.clone())
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("API_KEY is not set. AI features will not work.");
        }
        let request_timeout_sec = gemini_file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);

        let gemini = GeminiConfig {
            api_key,
            api_base_url: gemini_file
                .api_base_url
                .or_else(|| cli.api_base_url.clone())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            model: gemini_file
                .model
                .or_else(|| cli.model.clone())
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            speech_model: gemini_file
                .speech_model
                .or_else(|| cli.speech_model.clone())
                .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            live_model: gemini_file
                .live_model
                .or_else(|| cli.live_model.clone())
                .unwrap_or_else(|| DEFAULT_LIVE_MODEL.to_string()),
            voice: gemini_file
                .voice
                .or_else(|| cli.voice.clone())
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            request_timeout: (request_timeout_sec > 0)
                .then(|| Duration::from_secs(request_timeout_sec)),
        };

        Ok(Self {
            http: HttpConfig {
                port,
                metrics_port,
                logging_level,
                frontend_dir_path,
            },
            default_language,
            search_index_path,
            gemini,
        })
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.gemini.api_base_url.clone(),
            api_key: self.gemini.api_key.clone().unwrap_or_default(),
            model: self.gemini.model.clone(),
            speech_model: self.gemini.speech_model.clone(),
            voice: self.gemini.voice.clone(),
            request_timeout: self.gemini.request_timeout,
        }
    }

    /// Studio settings, reading the custom search index if one is configured.
    pub fn studio_settings(&self) -> Result<StudioSettings> {
        let search_index = match &self.search_index_path {
            Some(path) => load_search_index(path)?,
            None => default_search_index(),
        };
        Ok(StudioSettings {
            default_language: self.default_language,
            live_model: self.gemini.live_model.clone(),
            search_index,
            producer_count: DEFAULT_PRODUCER_COUNT,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_cli() -> CliConfig {
        CliConfig {
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("headers"),
            Some(RequestsLoggingLevel::Headers)
        ));
        // Case insensitive
        assert!(matches!(
            parse_logging_level("PATH"),
            Some(RequestsLoggingLevel::Path)
        ));
        assert!(parse_logging_level("invalid").is_none());
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::Headers,
            frontend_dir_path: Some("/frontend".to_string()),
            default_language: Some("ar".to_string()),
            api_key: Some("secret".to_string()),
            model: Some("gemini-2.5-pro".to_string()),
            request_timeout_sec: 45,
            ..base_cli()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.http.port, 3001);
        assert_eq!(config.http.metrics_port, 9091);
        assert_eq!(config.http.logging_level, RequestsLoggingLevel::Headers);
        assert_eq!(config.http.frontend_dir_path, Some("/frontend".to_string()));
        assert_eq!(config.default_language, Language::Ar);
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.speech_model, DEFAULT_SPEECH_MODEL);
        assert_eq!(config.gemini.live_model, DEFAULT_LIVE_MODEL);
        assert_eq!(config.gemini.request_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::Path,
            api_key: Some("cli-key".to_string()),
            voice: Some("Puck".to_string()),
            ..base_cli()
        };

        let file_config = FileConfig {
            port: Some(4000),
            logging_level: Some("body".to_string()),
            default_language: Some("fa".to_string()),
            gemini: Some(GeminiFileConfig {
                api_key: Some("file-key".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.http.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.default_language, Language::Fa);
        assert_eq!(config.gemini.api_key.as_deref(), Some("file-key"));
        // CLI value used when TOML doesn't specify
        assert_eq!(config.http.metrics_port, 9091);
        assert_eq!(config.gemini.voice, "Puck");
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&base_cli(), None).unwrap();
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.gemini.model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.gemini.voice, DEFAULT_VOICE);
        assert!(config.gemini.request_timeout.is_none());
        assert_eq!(config.default_language, Language::En);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_resolve_blank_api_key_is_missing() {
        let cli = CliConfig {
            api_key: Some("  ".to_string()),
            ..base_cli()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini_settings().api_key, "");
    }

    #[test]
    fn test_resolve_invalid_language_error() {
        let cli = CliConfig {
            default_language: Some("de".to_string()),
            ..base_cli()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("Unsupported language"));
    }

    #[test]
    fn test_resolve_same_ports_error() {
        let cli = CliConfig {
            port: 3001,
            metrics_port: 3001,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_nonexistent_search_index_error() {
        let cli = CliConfig {
            search_index_path: Some(PathBuf::from("/nonexistent/index.txt")),
            ..base_cli()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_studio_settings_reads_custom_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Only one page: the tutor.").unwrap();
        let cli = CliConfig {
            search_index_path: Some(file.path().to_path_buf()),
            live_model: Some("live-test".to_string()),
            ..base_cli()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();
        let settings = config.studio_settings().unwrap();
        assert_eq!(settings.search_index, "Only one page: the tutor.");
        assert_eq!(settings.live_model, "live-test");

        let default = AppConfig::resolve(&base_cli(), None)
            .unwrap()
            .studio_settings()
            .unwrap();
        assert!(default.search_index.starts_with("Services available"));
    }
}
