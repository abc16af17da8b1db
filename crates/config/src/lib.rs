use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "loginreg.toml",
    "config/loginreg.toml",
    "crates/config/loginreg.toml",
    "../loginreg.toml",
    "../config/loginreg.toml",
    "../crates/config/loginreg.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://loginreg.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Session cookie and lifetime settings.
///
/// ```
/// use loginreg_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.session_ttl_seconds, 86_400);
/// assert_eq!(auth.session_cookie_name, "loginreg_session");
/// assert!(!auth.secure_cookie);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default)]
    pub secure_cookie: bool,
    #[serde(default = "AuthConfig::default_sweep_interval")]
    pub session_sweep_interval_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            session_cookie_name: Self::default_cookie_name(),
            secure_cookie: false,
            session_sweep_interval_seconds: Self::default_sweep_interval(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }

    fn default_cookie_name() -> String {
        "loginreg_session".to_string()
    }

    const fn default_sweep_interval() -> u64 {
        300
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let defaults = AppConfig::default();

    let builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", defaults.auth.session_ttl_seconds)?
        .set_default(
            "auth.session_cookie_name",
            defaults.auth.session_cookie_name.clone(),
        )?
        .set_default("auth.secure_cookie", defaults.auth.secure_cookie)?
        .set_default(
            "auth.session_sweep_interval_seconds",
            defaults.auth.session_sweep_interval_seconds,
        )?;

    Ok(builder)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use loginreg_config::load;
///
/// std::env::remove_var("LOGINREG_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let mut builder = builder_with_defaults()?;
    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("LOGINREG_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via LOGINREG_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    finish(builder)
}

/// Load configuration from an explicit file, still honouring environment overrides.
pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() {
        anyhow::bail!("configuration file {} does not exist", path.display());
    }

    debug!(path = %path.display(), "loading configuration file");
    let builder = builder_with_defaults()?.add_source(config::File::from(path));
    finish(builder)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppConfig> {
    let environment_overrides = config::Environment::with_prefix("LOGINREG").separator("__");

    let cfg = builder
        .add_source(environment_overrides)
        .build()
        .context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded configuration");
    Ok(config)
}
