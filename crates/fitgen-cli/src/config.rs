//! Configuration file management for fitgen.
//!
//! Provides a TOML-based config file at `~/.config/fitgen/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use fitgen_core::generator::config::DEFAULT_TIMEOUT_SECS;
use fitgen_core::generator::{GeneratorConfig, Provider};
use fitgen_db::config::{DATABASE_URL_ENV, DbConfig};

pub const PROVIDER_ENV: &str = "FITGEN_LLM_PROVIDER";
pub const MODEL_ENV: &str = "FITGEN_LLM_MODEL";
pub const TIMEOUT_ENV: &str = "FITGEN_LLM_TIMEOUT_SECS";
pub const BASE_URL_ENV: &str = "FITGEN_LLM_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmSection {
    /// "gemini" or "openai".
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::default().to_string(),
            model: None,
            api_key: None,
            timeout_secs: None,
            base_url: None,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitgen config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitgen` or `~/.config/fitgen`,
/// ignoring the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitgen");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitgen")
}

/// Return the path to the fitgen config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FitgenConfig {
    pub db_config: DbConfig,
    file: Option<ConfigFile>,
}

impl FitgenConfig {
    /// Resolve the database URL: `cli_db_url` > `FITGEN_DATABASE_URL` env >
    /// `config_file.database.url` > `DbConfig::DEFAULT_URL`.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Some(url) = non_empty_env(DATABASE_URL_ENV) {
            url
        } else if let Some(ref cfg) = file {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            file,
        })
    }

    /// Resolve generator settings. Each field follows env var > config file
    /// > default; a missing API key is an error.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let llm = self.file.as_ref().map(|f| &f.llm);

        let provider: Provider = match non_empty_env(PROVIDER_ENV) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid {PROVIDER_ENV}"))?,
            None => match llm {
                Some(section) => section
                    .provider
                    .parse()
                    .context("invalid llm.provider in config file")?,
                None => Provider::default(),
            },
        };

        let api_key = non_empty_env(provider.api_key_env())
            .or_else(|| llm.and_then(|s| s.api_key.clone()))
            .filter(|k| !k.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!(
                "API key for {provider} not found; set {} or add llm.api_key to {}",
                provider.api_key_env(),
                config_path().display()
            );
        };

        let timeout_secs = match non_empty_env(TIMEOUT_ENV) {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds"))?,
            None => llm
                .and_then(|s| s.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            bail!("LLM timeout must be at least one second");
        }

        let mut config = GeneratorConfig::new(provider, api_key);
        config.model = non_empty_env(MODEL_ENV).or_else(|| llm.and_then(|s| s.model.clone()));
        config.base_url =
            non_empty_env(BASE_URL_ENV).or_else(|| llm.and_then(|s| s.base_url.clone()));
        config.timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    const LLM_VARS: [&str; 6] = [
        PROVIDER_ENV,
        MODEL_ENV,
        TIMEOUT_ENV,
        BASE_URL_ENV,
        "GEMINI_API_KEY",
        "OPENAI_API_KEY",
    ];

    fn clear_llm_env() {
        for var in LLM_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    /// Run `f` with `XDG_CONFIG_HOME` pointed at a fresh temp dir.
    fn with_temp_config_home<T>(f: impl FnOnce(&std::path::Path) -> T) -> T {
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let out = f(tmp.path());

        // Restore before the caller asserts, to avoid poisoning the mutex.
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
        out
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();

        let (loaded, mode) = with_temp_config_home(|_| {
            let original = ConfigFile {
                database: DatabaseSection {
                    url: "postgresql://testhost:5432/testdb".to_string(),
                },
                llm: LlmSection {
                    provider: "openai".to_string(),
                    model: Some("gpt-4o-mini".to_string()),
                    api_key: Some("sk-test".to_string()),
                    timeout_secs: Some(15),
                    base_url: None,
                },
            };
            save_config(&original).unwrap();
            let mode = {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::metadata(config_path()).unwrap().permissions().mode() & 0o777
                }
                #[cfg(not(unix))]
                {
                    0o600
                }
            };
            (load_config().unwrap(), mode)
        });

        assert_eq!(loaded.database.url, "postgresql://testhost:5432/testdb");
        assert_eq!(loaded.llm.provider, "openai");
        assert_eq!(loaded.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(loaded.llm.timeout_secs, Some(15));
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn config_without_llm_section_parses() {
        let parsed: ConfigFile =
            toml::from_str("[database]\nurl = \"postgresql://x:5432/y\"\n").unwrap();
        assert_eq!(parsed.llm.provider, "gemini");
        assert!(parsed.llm.api_key.is_none());
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();

        unsafe { std::env::set_var(DATABASE_URL_ENV, "postgresql://env:5432/envdb") };
        let config = FitgenConfig::resolve(Some("postgresql://cli:5432/clidb")).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
        unsafe { std::env::remove_var(DATABASE_URL_ENV) };
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();

        let url = with_temp_config_home(|_| {
            save_config(&ConfigFile {
                database: DatabaseSection {
                    url: "postgresql://file:5432/filedb".to_string(),
                },
                llm: LlmSection::default(),
            })
            .unwrap();
            unsafe { std::env::set_var(DATABASE_URL_ENV, "postgresql://env:5432/envdb") };
            let url = FitgenConfig::resolve(None).unwrap().db_config.database_url;
            unsafe { std::env::remove_var(DATABASE_URL_ENV) };
            url
        });
        assert_eq!(url, "postgresql://env:5432/envdb");
    }

    #[test]
    fn resolve_defaults_db_url_when_nothing_set() {
        let _lock = lock_env();

        let url = with_temp_config_home(|_| {
            unsafe { std::env::remove_var(DATABASE_URL_ENV) };
            FitgenConfig::resolve(None).unwrap().db_config.database_url
        });
        assert_eq!(url, DbConfig::DEFAULT_URL);
    }

    #[test]
    fn generator_config_from_env() {
        let _lock = lock_env();

        let result = with_temp_config_home(|_| {
            clear_llm_env();
            unsafe { std::env::set_var(PROVIDER_ENV, "openai") };
            unsafe { std::env::set_var("OPENAI_API_KEY", "sk-env") };
            unsafe { std::env::set_var(TIMEOUT_ENV, "15") };
            unsafe { std::env::set_var(MODEL_ENV, "gpt-4o-mini") };
            let result = FitgenConfig::resolve(None).unwrap().generator_config();
            clear_llm_env();
            result
        });

        let config = result.unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.effective_model(), "gpt-4o-mini");
    }

    #[test]
    fn generator_config_falls_back_to_file() {
        let _lock = lock_env();

        let result = with_temp_config_home(|_| {
            clear_llm_env();
            save_config(&ConfigFile {
                database: DatabaseSection {
                    url: DbConfig::DEFAULT_URL.to_string(),
                },
                llm: LlmSection {
                    api_key: Some("file-key".to_string()),
                    base_url: Some("http://localhost:8089".to_string()),
                    ..LlmSection::default()
                },
            })
            .unwrap();
            FitgenConfig::resolve(None).unwrap().generator_config()
        });

        let config = result.unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8089"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn generator_config_errors_without_api_key() {
        let _lock = lock_env();

        let result = with_temp_config_home(|_| {
            clear_llm_env();
            FitgenConfig::resolve(None).unwrap().generator_config()
        });

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("GEMINI_API_KEY"), "unexpected error: {msg}");
    }

    #[test]
    fn generator_config_rejects_bad_timeout() {
        let _lock = lock_env();

        let result = with_temp_config_home(|_| {
            clear_llm_env();
            unsafe { std::env::set_var("GEMINI_API_KEY", "k") };
            unsafe { std::env::set_var(TIMEOUT_ENV, "soon") };
            let result = FitgenConfig::resolve(None).unwrap().generator_config();
            clear_llm_env();
            result
        });

        assert!(result.is_err());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("fitgen/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
