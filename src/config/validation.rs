//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and locations
//! - Validate observability values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("gate.home_location '{0}' must be an absolute path")]
    HomeLocation(String),

    #[error("session.cookie_name must not be empty")]
    CookieName,

    #[error("templates.directory must not be empty")]
    TemplateDirectory,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.log_format '{0}' is not one of pretty, json")]
    LogFormat(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }
    if !LOG_LEVELS.contains(&obs.log_level.as_str()) {
        errors.push(ValidationError::LogLevel(obs.log_level.clone()));
    }
    if !LOG_FORMATS.contains(&obs.log_format.as_str()) {
        errors.push(ValidationError::LogFormat(obs.log_format.clone()));
    }

    if !config.gate.home_location.starts_with('/') {
        errors.push(ValidationError::HomeLocation(config.gate.home_location.clone()));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty() || cookie.contains(|c: char| c == '=' || c == ';' || c.is_whitespace()) {
        errors.push(ValidationError::CookieName);
    }

    if config.templates.directory.as_os_str().is_empty() {
        errors.push(ValidationError::TemplateDirectory);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
