//! Runtime configuration loaded from environment variables (and `.env`).

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// How multi-step mutations are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Atomicity {
    /// One transaction per operation, rolled back on failure.
    #[default]
    Strict,
    /// Each step commits on its own; the first failure stops the sequence
    /// and already-committed steps are kept.
    BestEffort,
}

impl FromStr for Atomicity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Atomicity::Strict),
            "best_effort" | "best-effort" => Ok(Atomicity::BestEffort),
            _ => Err(()),
        }
    }
}

/// Business rules shared by the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRules {
    pub long_haul_threshold_minutes: i64,
    pub customer_cancel_lead_hours: i64,
    pub admin_cancel_lead_hours: i64,
    // Where crew with no earlier flight are assumed to be
    pub crew_home_base: String,
    pub atomicity: Atomicity,
}

impl Default for BookingRules {
    fn default() -> Self {
        BookingRules {
            long_haul_threshold_minutes: 360,
            customer_cancel_lead_hours: 36,
            admin_cancel_lead_hours: 72,
            crew_home_base: "TLV".to_string(),
            atomicity: Atomicity::Strict,
        }
    }
}

impl BookingRules {
    pub fn is_long_haul(&self, duration_minutes: i64) -> bool {
        duration_minutes >= self.long_haul_threshold_minutes
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub rules: BookingRules,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = BookingRules::default();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", 3)?),
        };

        let rules = BookingRules {
            long_haul_threshold_minutes: parse_var(
                "LONG_HAUL_THRESHOLD_MINUTES",
                defaults.long_haul_threshold_minutes,
            )?,
            customer_cancel_lead_hours: parse_var(
                "CUSTOMER_CANCEL_LEAD_HOURS",
                defaults.customer_cancel_lead_hours,
            )?,
            admin_cancel_lead_hours: parse_var(
                "ADMIN_CANCEL_LEAD_HOURS",
                defaults.admin_cancel_lead_hours,
            )?,
            crew_home_base: env::var("CREW_HOME_BASE")
                .map(|v| v.trim().to_uppercase())
                .unwrap_or(defaults.crew_home_base),
            atomicity: parse_var("BOOKING_ATOMICITY", defaults.atomicity)?,
        };

        Ok(AppConfig { database, rules })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
