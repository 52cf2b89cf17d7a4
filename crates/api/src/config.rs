//! Application configuration loaded from environment variables.

use booking::DEFAULT_MAX_AMOUNT_CENTS;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `WEBHOOK_SECRET` — shared secret for gateway webhook signatures
/// - `MAX_PAYMENT_AMOUNT_CENTS` — largest accepted charge
/// - `GATEWAY_DELAY_MS` — artificial sandbox gateway delay (default: 0)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub webhook_secret: String,
    pub max_payment_amount_cents: i64,
    pub gateway_delay_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            webhook_secret: std::env::var("WEBHOOK_SECRET")
                .unwrap_or_else(|_| "dev-webhook-secret".to_string()),
            max_payment_amount_cents: std::env::var("MAX_PAYMENT_AMOUNT_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_AMOUNT_CENTS),
            gateway_delay_ms: std::env::var("GATEWAY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            webhook_secret: "dev-webhook-secret".to_string(),
            max_payment_amount_cents: DEFAULT_MAX_AMOUNT_CENTS,
            gateway_delay_ms: 0,
        }
    }
}
