use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use config::{Config, FileFormat};
use error_stack::{report, Result, ResultExt};
use regex::Regex;
use thiserror::Error;

use super::{bash_config::BashConfig, sheets_config::SheetsConfig};
use crate::sheets::domain::a1_notation::CellReference;

pub const DEFAULT_CONFIG_PATH: &str = "config.ini";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

const DEFAULT_TOKEN_FILE: &str = "token.json";
const DEFAULT_CLIENT_SECRET_FILE: &str = "client_secret.json";
const DEFAULT_RC_FILE: &str = ".bashrc";

static ALIAS_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.:@%+,-]+$").expect("alias name pattern should compile")
});

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file")]
    Unreadable,
    #[error("Missing config property: {0}")]
    MissingProperty(&'static str),
    #[error("Invalid value for config property: {0}")]
    InvalidProperty(&'static str),
    #[error("Could not resolve the home directory")]
    NoHomeDirectory,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub google: SheetsConfig,
    #[serde(default)]
    pub bash: BashConfig,
}

/// Flat, validated view of the config file. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sheet_id: String,
    pub cell: CellReference,
    pub alias_name: String,
    pub token_file_path: PathBuf,
    pub client_secret_file_path: PathBuf,
    pub rc_file_path: PathBuf,
}

/// `CONFIG_PATH` if set, `config.ini` otherwise.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Reading config file {}", path.display());
        let source = config::File::from(path)
            .format(FileFormat::Ini)
            .required(true);

        Self::build(Config::builder().add_source(source))
            .attach_printable_lazy(|| format!("Config file: {}", path.display()))
    }

    #[cfg(test)]
    pub fn from_ini_str(contents: &str) -> Result<Self, ConfigError> {
        Self::build(
            Config::builder().add_source(config::File::from_str(contents, FileFormat::Ini)),
        )
    }

    fn build(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .build()
            .change_context(ConfigError::Unreadable)?
            .try_deserialize()
            .change_context(ConfigError::Unreadable)
    }

    /// Validates required keys and resolves the fallback file names.
    /// `home` is only consulted when `[bash] rc_file` is absent or starts
    /// with `~/`.
    pub fn into_settings(self, home: Option<PathBuf>) -> Result<Settings, ConfigError> {
        let sheet_id = required(self.google.sheet_id, "google.sheet_id")?;
        let cell = required(self.google.cell, "google.cell")?;
        let alias_name = required(self.bash.alias_name, "bash.alias_name")?;

        let cell = cell
            .parse::<CellReference>()
            .change_context(ConfigError::InvalidProperty("google.cell"))?;

        if !ALIAS_NAME_PATTERN.is_match(&alias_name) {
            return Err(report!(ConfigError::InvalidProperty("bash.alias_name")))
                .attach_printable(format!("{:?} is not a usable alias name", alias_name));
        }

        let token_file_path = optional(self.google.token_file)
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
            .into();
        let client_secret_file_path = optional(self.google.client_secret_file)
            .unwrap_or_else(|| DEFAULT_CLIENT_SECRET_FILE.to_string())
            .into();
        let rc_file_path = resolve_rc_file(optional(self.bash.rc_file), home)?;

        Ok(Settings {
            sheet_id,
            cell,
            alias_name,
            token_file_path,
            client_secret_file_path,
            rc_file_path,
        })
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        AppConfig::load(path)?.into_settings(dirs::home_dir())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(value: Option<String>, property: &'static str) -> Result<String, ConfigError> {
    optional(value).ok_or_else(|| report!(ConfigError::MissingProperty(property)))
}

fn resolve_rc_file(
    rc_file: Option<String>,
    home_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    let home = || {
        home_dir
            .clone()
            .ok_or_else(|| report!(ConfigError::NoHomeDirectory))
    };

    match rc_file {
        Some(path) => match path.strip_prefix("~/") {
            Some(relative) => Ok(home()?.join(relative)),
            None => Ok(PathBuf::from(path)),
        },
        None => Ok(home()?.join(DEFAULT_RC_FILE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = "\
[google]
sheet_id = 1AbCdEf
cell = B2
token_file = creds/token.json
client_secret_file = creds/secret.json

[bash]
alias_name = standup
";

    fn settings_from(contents: &str) -> Result<Settings, ConfigError> {
        AppConfig::from_ini_str(contents)?.into_settings(Some(PathBuf::from("/home/user")))
    }

    #[test]
    fn test_full_config() {
        let settings = settings_from(FULL_CONFIG).unwrap();

        assert_eq!(settings.sheet_id, "1AbCdEf");
        assert_eq!(settings.cell.to_string(), "B2");
        assert_eq!(settings.alias_name, "standup");
        assert_eq!(settings.token_file_path, PathBuf::from("creds/token.json"));
        assert_eq!(
            settings.client_secret_file_path,
            PathBuf::from("creds/secret.json")
        );
        assert_eq!(settings.rc_file_path, PathBuf::from("/home/user/.bashrc"));
    }

    #[test]
    fn test_fallback_file_names() {
        let settings = settings_from(
            "[google]\nsheet_id = abc\ncell = A1\n[bash]\nalias_name = today\n",
        )
        .unwrap();

        assert_eq!(settings.token_file_path, PathBuf::from("token.json"));
        assert_eq!(
            settings.client_secret_file_path,
            PathBuf::from("client_secret.json")
        );
    }

    #[test]
    fn test_missing_required_keys() {
        let cases = [
            ("[google]\ncell = A1\n[bash]\nalias_name = x\n", "google.sheet_id"),
            ("[google]\nsheet_id = abc\n[bash]\nalias_name = x\n", "google.cell"),
            ("[google]\nsheet_id = abc\ncell = A1\n", "bash.alias_name"),
            ("[google]\nsheet_id =\ncell = A1\n[bash]\nalias_name = x\n", "google.sheet_id"),
        ];

        for (contents, property) in cases {
            let report = settings_from(contents).unwrap_err();
            match report.current_context() {
                ConfigError::MissingProperty(missing) => assert_eq!(*missing, property),
                other => panic!("unexpected error {:?} for {}", other, property),
            }
        }
    }

    #[test]
    fn test_invalid_cell() {
        let report =
            settings_from("[google]\nsheet_id = abc\ncell = A1:B2\n[bash]\nalias_name = x\n")
                .unwrap_err();

        assert!(matches!(
            report.current_context(),
            ConfigError::InvalidProperty("google.cell")
        ));
    }

    #[test]
    fn test_invalid_alias_name() {
        let report =
            settings_from("[google]\nsheet_id = abc\ncell = A1\n[bash]\nalias_name = rm -rf\n")
                .unwrap_err();

        assert!(matches!(
            report.current_context(),
            ConfigError::InvalidProperty("bash.alias_name")
        ));
    }

    fn with_alias_name(alias_name: &str) -> Result<Settings, ConfigError> {
        AppConfig {
            google: SheetsConfig {
                sheet_id: Some("abc".to_string()),
                cell: Some("A1".to_string()),
                ..SheetsConfig::default()
            },
            bash: BashConfig {
                alias_name: Some(alias_name.to_string()),
                rc_file: None,
            },
        }
        .into_settings(Some(PathBuf::from("/home/user")))
    }

    #[test]
    fn test_alias_name_rejects_shell_metacharacters() {
        for name in ["foo;date;x", "a|b", "a&b", "f(x)", "a<b", "a>b", "a`b", "$x", "a b"] {
            let report = with_alias_name(name).unwrap_err();
            assert!(
                matches!(
                    report.current_context(),
                    ConfigError::InvalidProperty("bash.alias_name")
                ),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_alias_name_accepts_usual_names() {
        for name in ["standup", "git-st", "ll", "k8s_ctx", "v1.2", "a+b"] {
            assert_eq!(with_alias_name(name).unwrap().alias_name, name);
        }
    }

    #[test]
    fn test_rc_file_override_expands_home() {
        let settings = settings_from(
            "[google]\nsheet_id = abc\ncell = A1\n[bash]\nalias_name = x\nrc_file = ~/.bash_aliases\n",
        )
        .unwrap();

        assert_eq!(
            settings.rc_file_path,
            PathBuf::from("/home/user/.bash_aliases")
        );
    }

    #[test]
    fn test_missing_home_without_override() {
        let report = AppConfig::from_ini_str(FULL_CONFIG)
            .unwrap()
            .into_settings(None)
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            ConfigError::NoHomeDirectory
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.google.sheet_id.as_deref(), Some("1AbCdEf"));
        assert_eq!(config.bash.alias_name.as_deref(), Some("standup"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = AppConfig::load(&dir.path().join("nope.ini")).unwrap_err();

        assert!(matches!(report.current_context(), ConfigError::Unreadable));
    }
}
