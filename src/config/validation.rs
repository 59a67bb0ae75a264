//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, ports valid)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("probe timeout ({timeout_ms}ms) must be shorter than the poll interval ({interval_ms}ms)")]
    ProbeTimeoutTooLong { timeout_ms: u64, interval_ms: u64 },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("machine.token is set but machine.url is missing")]
    MachineTokenWithoutUrl,
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.discord.token.trim().is_empty() {
        errors.push(ValidationError::Empty("discord.token"));
    }
    check_url(&mut errors, "discord.api_base", &config.discord.api_base);
    check_url(&mut errors, "discord.gateway_url", &config.discord.gateway_url);

    if config.target.host.trim().is_empty() {
        errors.push(ValidationError::Empty("target.host"));
    }
    if config.target.port == 0 {
        errors.push(ValidationError::Zero("target.port"));
    }
    check_url(&mut errors, "target.api_base", &config.target.api_base);

    let monitor = &config.monitor;
    if monitor.interval_ms == 0 {
        errors.push(ValidationError::Zero("monitor.interval_ms"));
    }
    if monitor.stability_threshold == 0 {
        errors.push(ValidationError::Zero("monitor.stability_threshold"));
    }
    if monitor.probe_timeout_ms == 0 {
        errors.push(ValidationError::Zero("monitor.probe_timeout_ms"));
    } else if monitor.interval_ms > 0 && monitor.probe_timeout_ms >= monitor.interval_ms {
        errors.push(ValidationError::ProbeTimeoutTooLong {
            timeout_ms: monitor.probe_timeout_ms,
            interval_ms: monitor.interval_ms,
        });
    }

    if config.webhook.enabled {
        if config.webhook.secret.is_empty() {
            errors.push(ValidationError::Empty("webhook.secret"));
        }
        check_socket(&mut errors, "webhook.bind_address", &config.webhook.bind_address);
        if config.webhook.request_timeout_secs == 0 {
            errors.push(ValidationError::Zero("webhook.request_timeout_secs"));
        }
    }

    match (&config.machine.url, &config.machine.token) {
        (Some(url), _) => check_url(&mut errors, "machine.url", url),
        (None, Some(_)) => errors.push(ValidationError::MachineTokenWithoutUrl),
        (None, None) => {}
    }

    if config.observability.metrics_enabled {
        check_socket(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_socket(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.discord.token = "token".into();
        config.target.host = "play.example.net".into();
        config.webhook.secret = "s3cret".into();
        config
    }

    #[test]
    fn test_defaults_with_credentials_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let config = RelayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::Empty("discord.token")));
        assert!(errors.contains(&ValidationError::Empty("target.host")));
        assert!(errors.contains(&ValidationError::Empty("webhook.secret")));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_probe_timeout_must_fit_in_interval() {
        let mut config = valid();
        config.monitor.interval_ms = 1000;
        config.monitor.probe_timeout_ms = 1000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ProbeTimeoutTooLong { timeout_ms: 1000, interval_ms: 1000 }]
        );
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = valid();
        config.monitor.stability_threshold = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Zero("monitor.stability_threshold")])
        );
    }

    #[test]
    fn test_webhook_secret_not_required_when_disabled() {
        let mut config = valid();
        config.webhook.enabled = false;
        config.webhook.secret.clear();
        config.webhook.bind_address = "not an address".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_machine_token_requires_url() {
        let mut config = valid();
        config.machine.token = Some("t".into());
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MachineTokenWithoutUrl])
        );

        config.machine.url = Some("::nope".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidUrl { field: "machine.url", .. }));
    }
}
