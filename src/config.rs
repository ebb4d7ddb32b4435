use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Listen port used when `PORT` is unset or not a valid port number.
pub const DEFAULT_PORT: u16 = 5035;

pub const ENV_ALLOWED_ORIGINS: &str = "AllowedOrigins";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SQLITE_PATH: &str = "SQLITE_PATH";
pub const ENV_JWT_KEY: &str = "Jwt__Key";
pub const ENV_JWT_ISSUER: &str = "Jwt__Issuer";
pub const ENV_JWT_AUDIENCE: &str = "Jwt__Audience";
pub const ENV_PORT: &str = "PORT";
pub const ENV_CONFIG_PATH: &str = "CODEX_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Jwt:Key (or env Jwt__Key) is not configured")]
    MissingJwtKey,
    #[error("invalid server.host '{0}'")]
    InvalidHost(String),
    #[error("database.max_connections must be > 0")]
    InvalidPoolSize,
    #[error("failed to read configuration: {0}")]
    Source(#[from] ::config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub sqlite_file_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwtFileConfig {
    pub key: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: Option<u64>,
}

/// Structured configuration as read from the layered TOML sources.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub allowed_origins: Option<String>,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtFileConfig,
}

/// Which relational backend the process talks to. Decided once at boot.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseSelection {
    Networked(String),
    LocalFile(PathBuf),
}

// Connection strings carry credentials; keep them out of logs.
impl fmt::Debug for DatabaseSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseSelection::Networked(_) => f.write_str("Networked(<redacted>)"),
            DatabaseSelection::LocalFile(path) => f.debug_tuple("LocalFile").field(path).finish(),
        }
    }
}

#[derive(Clone)]
pub struct JwtSettings {
    pub key: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Fully resolved, immutable process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub allowed_origins: Vec<String>,
    pub database: DatabaseSelection,
    pub pool: DatabaseConfig,
    pub jwt: JwtSettings,
    pub server: ServerSettings,
}

/// Loads `.env` from the working directory (or a parent) if there is one.
///
/// Returns the path that was loaded so the caller can log it once logging is up.
pub fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Reads the layered TOML configuration and resolves it against the process environment.
pub fn load() -> Result<AppConfig, ConfigError> {
    let file = build_file_config(true)?;
    resolve(file, |key| std::env::var(key).ok())
}

/// Layers the embedded defaults and, when `include_external` is set, the
/// optional `codex.toml` and `CODEX_CONFIG` files.
pub(crate) fn build_file_config(include_external: bool) -> Result<FileConfig, ::config::ConfigError> {
    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml));

    if include_external {
        // Optional local file: codex.toml (in CWD)
        builder = builder.add_source(::config::File::with_name("codex").required(false));
        if let Ok(custom_path) = std::env::var(ENV_CONFIG_PATH) {
            builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
        }
    }

    builder.build()?.try_deserialize()
}

/// Combines structured configuration with environment lookups.
///
/// Environment variables are layered last and override their structured
/// counterparts, even when set to an empty value.
pub fn resolve<F>(file: FileConfig, env: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let allowed_origins =
        parse_origin_list(env(ENV_ALLOWED_ORIGINS).or(file.allowed_origins).as_deref());

    let database = select_database(&env, &file.database.sqlite_file_name);

    let key = env(ENV_JWT_KEY).or(file.jwt.key);
    let key = match key {
        Some(k) if !k.trim().is_empty() => k,
        _ => return Err(ConfigError::MissingJwtKey),
    };
    let jwt = JwtSettings {
        key,
        issuer: non_blank(env(ENV_JWT_ISSUER).or(file.jwt.issuer)),
        audience: non_blank(env(ENV_JWT_AUDIENCE).or(file.jwt.audience)),
        leeway_seconds: file.jwt.leeway_seconds.unwrap_or(300),
    };

    let host: IpAddr = file
        .server
        .host
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidHost(file.server.host.clone()))?;
    let server = ServerSettings { host, port: parse_port(env(ENV_PORT).as_deref()) };

    if file.database.max_connections == 0 {
        return Err(ConfigError::InvalidPoolSize);
    }

    Ok(AppConfig { allowed_origins, database, pool: file.database, jwt, server })
}

/// Splits a `;`-separated origin list, trimming entries and dropping empty ones.
pub fn parse_origin_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|p| p.trim().parse::<u16>().ok()).unwrap_or(DEFAULT_PORT)
}

fn select_database<F>(env: &F, sqlite_file_name: &str) -> DatabaseSelection
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_DATABASE_URL).filter(|u| !u.trim().is_empty()) {
        return DatabaseSelection::Networked(url);
    }
    let path = env(ENV_SQLITE_PATH)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| base_directory().join(sqlite_file_name));
    DatabaseSelection::LocalFile(path)
}

/// Directory containing the running executable, `.` if it cannot be determined.
pub fn base_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
