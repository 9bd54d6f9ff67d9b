use std::env;
use std::fmt;

use anyhow::{Context, Result, bail};

/// Coordinates of the Spanner database backing the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

/// Which key-value store the gateway talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Spanner(SpannerConfig),
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub auth_password: String,
    pub backend: StoreBackend,
    pub service_port: u16,
    pub service_host: String,
    pub swagger_ui: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("auth_password", &"<redacted>")
            .field("backend", &self.backend)
            .field("service_port", &self.service_port)
            .field("service_host", &self.service_host)
            .field("swagger_ui", &self.swagger_ui)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_password = lookup("AUTH_PASSWORD")
            .context("AUTH_PASSWORD environment variable is required")?;
        if auth_password.is_empty() {
            bail!("AUTH_PASSWORD environment variable must not be empty");
        }

        let backend = match lookup("KV_BACKEND")
            .unwrap_or_else(|| "spanner".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "spanner" => StoreBackend::Spanner(SpannerConfig {
                emulator_host: lookup("SPANNER_EMULATOR_HOST"),
                project: lookup("SPANNER_PROJECT")
                    .context("SPANNER_PROJECT environment variable is required")?,
                instance: lookup("SPANNER_INSTANCE")
                    .context("SPANNER_INSTANCE environment variable is required")?,
                database: lookup("SPANNER_DATABASE")
                    .context("SPANNER_DATABASE environment variable is required")?,
            }),
            "memory" => StoreBackend::Memory,
            other => bail!("KV_BACKEND must be one of: spanner, memory, got '{}'", other),
        };

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let swagger_ui = match lookup("ENABLE_SWAGGER_UI") {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("ENABLE_SWAGGER_UI must be true or false, got '{}'", value))?,
            None => false,
        };

        Ok(Config {
            auth_password,
            backend,
            service_port,
            service_host,
            swagger_ui,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.backend {
            StoreBackend::Spanner(spanner) => {
                tracing::info!("  Store backend: spanner");
                tracing::info!("  Spanner emulator: {}",
                    spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
                tracing::info!("  Spanner project: {}", spanner.project);
                tracing::info!("  Spanner instance: {}", spanner.instance);
                tracing::info!("  Spanner database: {}", spanner.database);
            }
            StoreBackend::Memory => {
                tracing::info!("  Store backend: memory (entries are lost on restart)");
            }
        }
        tracing::info!("  Swagger UI: {}", if self.swagger_ui { "enabled" } else { "disabled" });
        tracing::info!("  Service listening on: {}", self.listen_addr());
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
