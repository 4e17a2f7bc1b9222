//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::value_objects::{RateLimitPolicy, DISCORD_EPOCH, MAX_DISCRIMINATOR};
use crate::shared::snowflake::MAX_CLOCK_SKEW_LIMIT_MS;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Rate limiting configuration
    pub rate_limit: RateLimitSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Worker discriminator (0-31)
    pub worker_id: u8,

    /// Process discriminator (0-31)
    pub process_id: u8,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,

    /// How far the clock may step backwards before generation fails
    pub max_clock_skew_ms: u64,
}

/// Limit and window for one route group.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolicySettings {
    /// Requests admitted per window
    pub limit: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Disable to skip evaluation entirely (no rate-limit headers are sent)
    pub enabled: bool,

    /// Trust X-Forwarded-For / X-Real-IP for client identity.
    /// Only safe behind a proxy that overwrites these headers.
    pub trust_proxy: bool,

    /// Prefix bucket keys with the route group so groups never share state
    pub scope_by_group: bool,

    /// Policy for route groups without one of their own
    pub default: PolicySettings,

    /// Policy for authentication routes
    pub auth: Option<PolicySettings>,

    /// Policy for resource API routes (falls back to `default`)
    pub api: Option<PolicySettings>,

    /// Buckets idle for this many windows past their reset are evicted
    pub grace_windows: u32,

    /// Background sweep interval in seconds
    pub sweep_interval_secs: u64,

    /// Also sweep inline after this many evaluations
    pub sweep_every: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("snowflake.worker_id", 1)?
            .set_default("snowflake.process_id", 0)?
            .set_default("snowflake.epoch", DISCORD_EPOCH)?
            .set_default("snowflake.max_clock_skew_ms", 5)?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.trust_proxy", false)?
            .set_default("rate_limit.scope_by_group", true)?
            .set_default("rate_limit.default.limit", 60)?
            .set_default("rate_limit.default.window_secs", 60)?
            .set_default("rate_limit.auth.limit", 5)?
            .set_default("rate_limit.auth.window_secs", 60)?
            .set_default("rate_limit.grace_windows", 2)?
            .set_default("rate_limit.sweep_interval_secs", 60)?
            .set_default("rate_limit.sweep_every", 1000)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option(
                "snowflake.worker_id",
                std::env::var("SNOWFLAKE_WORKER_ID").ok(),
            )?
            .set_override_option(
                "snowflake.process_id",
                std::env::var("SNOWFLAKE_PROCESS_ID").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate().map(|_| settings))
    }

    /// Reject values the generator and limiter cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, id) in [
            ("snowflake.worker_id", self.snowflake.worker_id),
            ("snowflake.process_id", self.snowflake.process_id),
        ] {
            if id > MAX_DISCRIMINATOR {
                return Err(ConfigError::Message(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_DISCRIMINATOR, id
                )));
            }
        }

        if self.snowflake.max_clock_skew_ms > MAX_CLOCK_SKEW_LIMIT_MS {
            return Err(ConfigError::Message(format!(
                "snowflake.max_clock_skew_ms must be at most {}, got {}",
                MAX_CLOCK_SKEW_LIMIT_MS, self.snowflake.max_clock_skew_ms
            )));
        }

        let policies = [
            ("rate_limit.default", Some(&self.rate_limit.default)),
            ("rate_limit.auth", self.rate_limit.auth.as_ref()),
            ("rate_limit.api", self.rate_limit.api.as_ref()),
        ];
        for (name, policy) in policies {
            let Some(policy) = policy else { continue };
            if policy.limit == 0 || policy.window_secs == 0 {
                return Err(ConfigError::Message(format!(
                    "{} needs a non-zero limit and window",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl PolicySettings {
    pub fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.limit, Duration::from_secs(self.window_secs))
    }
}

impl Default for Settings {
    /// Same values `load` starts from, without touching files or the environment.
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".into(),
                port: 3000,
            },
            snowflake: SnowflakeSettings {
                worker_id: 1,
                process_id: 0,
                epoch: DISCORD_EPOCH,
                max_clock_skew_ms: 5,
            },
            rate_limit: RateLimitSettings {
                enabled: true,
                trust_proxy: false,
                scope_by_group: true,
                default: PolicySettings {
                    limit: 60,
                    window_secs: 60,
                },
                auth: Some(PolicySettings {
                    limit: 5,
                    window_secs: 60,
                }),
                api: None,
                grace_windows: 2,
                sweep_interval_secs: 60,
                sweep_every: 1000,
            },
            cors: CorsSettings {
                allowed_origins: vec!["http://localhost:3000".into()],
            },
            environment: "development".into(),
        }
    }
}
