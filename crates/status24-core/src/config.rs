//! Configuration module
//!
//! Server configuration is read from the environment (a `.env` file is loaded
//! first when present) and validated before anything else starts.

use std::env;

const SERVER_PORT: u16 = 8000;
const ADMIN_ORG_NAME: &str = "status24";
const IDENTITY_API_URL: &str = "https://api.clerk.dev/v1";
const JWKS_CACHE_TTL_SECS: i64 = 3600;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Which identity provider backs sign-in and organization membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityBackend {
    /// Hosted provider reached over its REST API.
    Clerk { api_url: String, api_key: String },
    /// In-process directory, for local development and tests.
    Memory,
}

/// How bearer tokens are verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenVerification {
    /// RS256/ES256 tokens checked against a JWKS endpoint.
    Jwks { url: String, cache_ttl_secs: i64 },
    /// HS256 tokens signed with a shared secret.
    SharedSecret(String),
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub admin_org_name: String,
    pub identity: IdentityBackend,
    pub token_verification: TokenVerification,
    pub store_seed_path: Option<String>,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let identity = match env::var("IDENTITY_PROVIDER")
            .unwrap_or_else(|_| "clerk".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => IdentityBackend::Memory,
            "clerk" => IdentityBackend::Clerk {
                api_url: env::var("IDENTITY_API_URL")
                    .or_else(|_| env::var("CLERK_API_URL"))
                    .unwrap_or_else(|_| IDENTITY_API_URL.to_string()),
                api_key: env::var("IDENTITY_API_KEY")
                    .or_else(|_| env::var("CLERK_API_KEY"))
                    .map_err(|_| {
                        anyhow::anyhow!("IDENTITY_API_KEY (or CLERK_API_KEY) must be set")
                    })?,
            },
            other => {
                return Err(anyhow::anyhow!(
                    "IDENTITY_PROVIDER must be 'clerk' or 'memory', got '{}'",
                    other
                ))
            }
        };

        let token_verification = match (env::var("JWT_JWKS_URL"), env::var("JWT_SECRET")) {
            (Ok(url), Err(_)) => TokenVerification::Jwks {
                url,
                cache_ttl_secs: env::var("JWT_JWKS_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(JWKS_CACHE_TTL_SECS),
            },
            (Err(_), Ok(secret)) => TokenVerification::SharedSecret(secret),
            (Ok(_), Ok(_)) => {
                return Err(anyhow::anyhow!(
                    "Set only one of JWT_JWKS_URL and JWT_SECRET"
                ))
            }
            (Err(_), Err(_)) => {
                return Err(anyhow::anyhow!(
                    "Either JWT_JWKS_URL or JWT_SECRET must be set for authentication"
                ))
            }
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            admin_org_name: env::var("ADMIN_ORG_NAME")
                .unwrap_or_else(|_| ADMIN_ORG_NAME.to_string()),
            identity,
            token_verification,
            store_seed_path: env::var("STORE_SEED_PATH").ok().filter(|s| !s.is_empty()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration for local development and tests: in-memory identity,
    /// shared-secret tokens, permissive CORS.
    pub fn for_development(jwt_secret: impl Into<String>) -> Self {
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            admin_org_name: ADMIN_ORG_NAME.to_string(),
            identity: IdentityBackend::Memory,
            token_verification: TokenVerification::SharedSecret(jwt_secret.into()),
            store_seed_path: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.admin_org_name.trim().is_empty() {
            return Err(anyhow::anyhow!("ADMIN_ORG_NAME cannot be empty"));
        }

        if let TokenVerification::SharedSecret(secret) = &self.token_verification {
            if secret.len() < MIN_JWT_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} characters long",
                    MIN_JWT_SECRET_LEN
                ));
            }
        }

        if self.is_production() && self.identity == IdentityBackend::Memory {
            return Err(anyhow::anyhow!(
                "IDENTITY_PROVIDER=memory is not allowed in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn development_config_is_valid() {
        let config = Config::for_development(SECRET);
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
        assert_eq!(config.admin_org_name, "status24");
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = Config::for_development("short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut config = Config::for_development(SECRET);
        config.environment = "production".to_string();
        config.identity = IdentityBackend::Clerk {
            api_url: IDENTITY_API_URL.to_string(),
            api_key: "sk_test".to_string(),
        };
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://status.example.com".to_string()];
        assert!(config.validate().is_ok());
    }
}
