use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use reqwest::Url;
use thiserror::Error;

const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";
const LIVE_API_BASE: &str = "https://api-m.paypal.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sandbox,
    Live,
}

impl Mode {
    pub fn api_base(self) -> &'static str {
        match self {
            Mode::Sandbox => SANDBOX_API_BASE,
            Mode::Live => LIVE_API_BASE,
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Mode::Sandbox),
            "live" => Ok(Mode::Live),
            other => Err(format!("expected `sandbox` or `live`, got `{other}`")),
        }
    }
}

/// Credentials and endpoint for the payment processor's REST API.
#[derive(Clone)]
pub struct ProcessorConfig {
    pub mode: Mode,
    pub client_id: String,
    pub client_secret: String,
    pub api_base: Url,
    pub timeout: Duration,
}

// Secrets stay out of Debug output.
impl std::fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("mode", &self.mode)
            .field("client_id", &self.client_id)
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Values stamped onto every order sent to the processor.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub brand_name: String,
    pub description: String,
    pub default_currency: String,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub processor: ProcessorConfig,
    pub checkout: CheckoutSettings,
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("processor", &self.processor)
            .field("checkout", &self.checkout)
            .field("webhook_signing", &self.webhook_secret.is_some())
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let client_id = required("PAYPAL_CLIENT_ID")?;
        let client_secret = required("PAYPAL_CLIENT_SECRET")?;
        let base_url = required("BASE_URL")?;
        Url::parse(&base_url).map_err(|err| ConfigError::Invalid {
            name: "BASE_URL",
            reason: err.to_string(),
        })?;
        let base_url = base_url.trim_end_matches('/');

        let mode = match get("PAYPAL_MODE") {
            Some(raw) => raw.parse::<Mode>().map_err(|reason| ConfigError::Invalid {
                name: "PAYPAL_MODE",
                reason,
            })?,
            None => Mode::Sandbox,
        };

        let api_base = get("PAYPAL_API_BASE").unwrap_or_else(|| mode.api_base().to_string());
        let api_base = Url::parse(&api_base).map_err(|err| ConfigError::Invalid {
            name: "PAYPAL_API_BASE",
            reason: err.to_string(),
        })?;

        let timeout = match get("PAYPAL_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PAYPAL_TIMEOUT_SECS",
                        reason: format!("expected a positive number of seconds, got `{raw}`"),
                    })
                }
            },
            None => Duration::from_secs(30),
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: err.to_string(),
            })?;

        Ok(Config {
            bind_addr,
            processor: ProcessorConfig {
                mode,
                client_id,
                client_secret,
                api_base,
                timeout,
            },
            checkout: CheckoutSettings {
                brand_name: get("BRAND_NAME").unwrap_or_else(|| "ASAS For Furniture".to_string()),
                description: get("PAYMENT_DESCRIPTION")
                    .unwrap_or_else(|| "This is the payment transaction description.".to_string()),
                default_currency: get("DEFAULT_CURRENCY").unwrap_or_else(|| "USD".to_string()),
                return_url: format!("{base_url}/execute-payment"),
                cancel_url: format!("{base_url}/"),
            },
            webhook_secret: get("PAYPAL_WEBHOOK_SECRET"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("PAYPAL_CLIENT_ID", "client"),
        ("PAYPAL_CLIENT_SECRET", "secret"),
        ("BASE_URL", "https://shop.example/"),
    ];

    #[test]
    fn defaults_to_sandbox_with_derived_callbacks() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.processor.mode, Mode::Sandbox);
        assert_eq!(config.processor.api_base.as_str(), "https://api-m.sandbox.paypal.com/");
        assert_eq!(config.processor.timeout, Duration::from_secs(30));
        assert_eq!(config.checkout.return_url, "https://shop.example/execute-payment");
        assert_eq!(config.checkout.cancel_url, "https://shop.example/");
        assert_eq!(config.checkout.default_currency, "USD");
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let err = load(&REQUIRED[1..]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PAYPAL_CLIENT_ID")));

        let err = load(&[REQUIRED[0], REQUIRED[1], ("BASE_URL", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BASE_URL")));
    }

    #[test]
    fn live_mode_and_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PAYPAL_MODE", "LIVE"),
            ("PAYPAL_TIMEOUT_SECS", "5"),
            ("DEFAULT_CURRENCY", "EUR"),
            ("PAYPAL_WEBHOOK_SECRET", "whsec"),
        ]);
        let config = load(&pairs).unwrap();

        assert_eq!(config.processor.mode, Mode::Live);
        assert_eq!(config.processor.api_base.as_str(), "https://api-m.paypal.com/");
        assert_eq!(config.processor.timeout, Duration::from_secs(5));
        assert_eq!(config.checkout.default_currency, "EUR");
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PAYPAL_MODE", "staging"));
        assert!(matches!(
            load(&pairs).unwrap_err(),
            ConfigError::Invalid { name: "PAYPAL_MODE", .. }
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PAYPAL_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&pairs).unwrap_err(),
            ConfigError::Invalid { name: "PAYPAL_TIMEOUT_SECS", .. }
        ));

        let err = load(&[REQUIRED[0], REQUIRED[1], ("BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BASE_URL", .. }));
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = load(&REQUIRED).unwrap();
        let rendered = format!("{:?}", config.processor);
        assert!(rendered.contains("client"));
        assert!(!rendered.contains("secret\""));
    }
}
