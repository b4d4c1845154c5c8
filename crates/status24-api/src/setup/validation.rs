//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use status24_core::{Config, IdentityBackend, TokenVerification};

/// Validate critical configuration values
///
/// Runs [`Config::validate`] and adds the checks that only matter once a
/// server is about to start.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();
    if config.is_production() && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if let IdentityBackend::Clerk { api_url, api_key } = &config.identity {
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "IDENTITY_API_URL must be an http(s) URL, got '{}'",
                api_url
            ));
        }
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("IDENTITY_API_KEY cannot be empty"));
        }
    }

    if let TokenVerification::Jwks { url, cache_ttl_secs } = &config.token_verification {
        if !url.starts_with("https://") && config.is_production() {
            return Err(anyhow::anyhow!("JWT_JWKS_URL must use https in production"));
        }
        if *cache_ttl_secs <= 0 {
            return Err(anyhow::anyhow!("JWT_JWKS_CACHE_TTL_SECS must be positive"));
        }
    }

    if config.request_timeout_secs == 0 {
        return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn development_config_passes() {
        assert!(validate_config(&Config::for_development(SECRET)).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::for_development(SECRET);
        config.request_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn identity_url_must_be_http() {
        let mut config = Config::for_development(SECRET);
        config.identity = IdentityBackend::Clerk {
            api_url: "api.clerk.dev".to_string(),
            api_key: "sk_test".to_string(),
        };
        assert!(validate_config(&config).is_err());
    }
}
