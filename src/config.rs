use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Error rendering mode.
///
/// `dev` shows real error messages to the client; `dev` plus `debug` lets
/// server faults escape the pipeline entirely.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppModeConfig {
    pub dev: bool,
    pub debug: bool,
}

/// Per-user storage quota bounds, in megabytes.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub default_size_mb: i64,
    pub min_size_mb: i64,
    pub max_size_mb: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub app: AppModeConfig,
    pub storage: StorageConfig,
    pub security: Option<SecurityConfig>,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl StorageConfig {
    pub fn default_size_kb(&self) -> i64 {
        self.default_size_mb * 1024
    }

    pub fn min_size_kb(&self) -> i64 {
        self.min_size_mb * 1024
    }

    pub fn max_size_kb(&self) -> i64 {
        self.max_size_mb * 1024
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: ablage.toml (in CWD)
        .add_source(::config::File::with_name("ablage").required(false));

    if let Ok(custom_path) = std::env::var("ABLAGE_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("ABLAGE").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.body_limit_bytes == 0 {
        return Err(anyhow::anyhow!("server.body_limit_bytes must be > 0"));
    }

    // Storage quota
    let s = &cfg.storage;
    if s.min_size_mb <= 0 {
        return Err(anyhow::anyhow!("storage.min_size_mb must be > 0"));
    }
    if s.min_size_mb > s.max_size_mb {
        return Err(anyhow::anyhow!("storage.min_size_mb must be <= storage.max_size_mb"));
    }
    if s.default_size_mb < s.min_size_mb || s.default_size_mb > s.max_size_mb {
        return Err(anyhow::anyhow!(
            "storage.default_size_mb must be in {}..={}",
            s.min_size_mb,
            s.max_size_mb
        ));
    }

    if cfg.app.debug && !cfg.app.dev {
        tracing::warn!("app.debug has no effect unless app.dev is set");
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            return Ok(());
        }
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
