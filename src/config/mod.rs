use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub placeholder_api: PlaceholderApiConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub simulation: SimulationConfig,
    pub sessions: SessionConfig,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

// Public placeholder REST API used by dashboard and reports
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholderApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Artificial latency and randomized faults
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub enable_fault_injection: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub idle_timeout_seconds: u64,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_dashboard: bool,
    pub enable_reports: bool,
}

#[derive(Debug, Error)]
#[error("{key} has an invalid value '{value}': {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

fn env_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            value: raw,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn env_string(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let seed = match env::var("SIMULATION_SEED") {
            Ok(raw) => Some(raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError {
                key: "SIMULATION_SEED",
                value: raw,
                reason: e.to_string(),
            })?),
            Err(_) => None,
        };

        let config = Config {
            app: AppConfig {
                host: env_string("HOST", &defaults.app.host),
                port: env_or("PORT", defaults.app.port)?,
                environment: env_string("ENVIRONMENT", &defaults.app.environment),
                rust_log: env_string("RUST_LOG", &defaults.app.rust_log),
                log_format: env_or("LOG_FORMAT", defaults.app.log_format)?,
            },
            placeholder_api: PlaceholderApiConfig {
                base_url: env_string("PLACEHOLDER_API_URL", &defaults.placeholder_api.base_url),
                timeout_seconds: env_or(
                    "PLACEHOLDER_API_TIMEOUT_SECONDS",
                    defaults.placeholder_api.timeout_seconds,
                )?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: env_or(
                    "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                    defaults.circuit_breaker.failure_threshold,
                )?,
                timeout_seconds: env_or(
                    "CIRCUIT_BREAKER_TIMEOUT_SECONDS",
                    defaults.circuit_breaker.timeout_seconds,
                )?,
            },
            simulation: SimulationConfig {
                latency_min_ms: env_or("SIMULATED_LATENCY_MIN_MS", defaults.simulation.latency_min_ms)?,
                latency_max_ms: env_or("SIMULATED_LATENCY_MAX_MS", defaults.simulation.latency_max_ms)?,
                enable_fault_injection: env_or(
                    "ENABLE_FAULT_INJECTION",
                    defaults.simulation.enable_fault_injection,
                )?,
                seed,
            },
            sessions: SessionConfig {
                idle_timeout_seconds: env_or(
                    "SESSION_IDLE_TIMEOUT_SECONDS",
                    defaults.sessions.idle_timeout_seconds,
                )?,
                sweep_interval_seconds: env_or(
                    "SESSION_SWEEP_INTERVAL_SECONDS",
                    defaults.sessions.sweep_interval_seconds,
                )?,
            },
            features: FeatureFlags {
                enable_dashboard: env_or("ENABLE_DASHBOARD", defaults.features.enable_dashboard)?,
                enable_reports: env_or("ENABLE_REPORTS", defaults.features.enable_reports)?,
            },
        };

        if config.simulation.latency_min_ms > config.simulation.latency_max_ms {
            return Err(ConfigError {
                key: "SIMULATED_LATENCY_MIN_MS",
                value: config.simulation.latency_min_ms.to_string(),
                reason: format!(
                    "must not exceed SIMULATED_LATENCY_MAX_MS ({})",
                    config.simulation.latency_max_ms
                ),
            });
        }

        Ok(config)
    }

    /// Configuration for tests: no latency, no faults.
    pub fn quiet() -> Self {
        let mut config = Config::default();
        config.simulation.latency_min_ms = 0;
        config.simulation.latency_max_ms = 0;
        config.simulation.enable_fault_injection = false;
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "event_booking=debug,tower_http=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            placeholder_api: PlaceholderApiConfig {
                base_url: "https://jsonplaceholder.typicode.com".to_string(),
                timeout_seconds: 10,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                timeout_seconds: 60,
            },
            simulation: SimulationConfig {
                latency_min_ms: 1000,
                latency_max_ms: 3000,
                enable_fault_injection: true,
                seed: None,
            },
            sessions: SessionConfig {
                idle_timeout_seconds: 1800,
                sweep_interval_seconds: 300,
            },
            features: FeatureFlags {
                enable_dashboard: true,
                enable_reports: true,
            },
        }
    }
}
