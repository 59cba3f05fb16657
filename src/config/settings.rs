use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the rating service; `/api/rate/upload` is appended.
    pub url: String,
    /// Upper bound for the whole upload request, including server processing.
    pub timeout_secs: u64,
    pub skip_rag: bool,
    pub skip_db: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
            skip_rag: false,
            skip_db: false,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/rate/upload", self.url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileSettings {
    pub dedupe: bool,
    /// Lower-case extensions without the dot. Empty accepts every file.
    pub extensions: Vec<String>,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            dedupe: true,
            extensions: vec!["pdf".to_string()],
        }
    }
}

impl FileSettings {
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResultSettings {
    pub paginate: bool,
    pub page_size: usize,
    /// Show decoded scores and metadata instead of bare status lines.
    pub rich: bool,
}

impl Default for ResultSettings {
    fn default() -> Self {
        Self {
            paginate: true,
            page_size: 5,
            rich: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `paperate=debug`.
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogSettings {
    pub fn file_path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("paperate")
                .join("paperate.log")
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub files: FileSettings,
    pub results: ResultSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.server.url).map_err(|e| ConfigError::Invalid {
            key: "server.url",
            reason: e.to_string(),
        })?;
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "server.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.results.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "results.page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            dedupe: self.files.dedupe,
            paginate: self.results.paginate,
            page_size: self.results.page_size,
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paperate")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nurl = \"https://rater.example.org/\"\nskip_db = true\n\n[results]\npage_size = 10\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(
            settings.server.upload_url(),
            "https://rater.example.org/api/rate/upload"
        );
        assert!(settings.server.skip_db);
        assert!(!settings.server.skip_rag);
        assert_eq!(settings.results.page_size, 10);
        assert!(settings.results.paginate);
        assert_eq!(settings.files, FileSettings::default());
    }

    #[test]
    fn save_then_load_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.files.extensions = vec!["pdf".to_string(), "docx".to_string()];
        settings.log.file = Some(dir.path().join("x.log"));

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[results]\npage_size = 0\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Invalid { key: "results.page_size", .. })
        ));

        fs::write(&path, "[server]\nurl = \"not a url\"\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Invalid { key: "server.url", .. })
        ));

        fs::write(&path, "[server\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn extension_filter() {
        let files = FileSettings::default();
        assert!(files.accepts(Path::new("/a/Paper.PDF")));
        assert!(!files.accepts(Path::new("/a/notes.txt")));
        assert!(!files.accepts(Path::new("/a/README")));

        let any = FileSettings {
            extensions: Vec::new(),
            ..FileSettings::default()
        };
        assert!(any.accepts(Path::new("/a/README")));
    }
}
