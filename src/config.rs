use crate::errors::{EngineError, EngineResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub alpha_vantage_api_key: Option<String>,
    pub alpha_vantage_base_url: String,
    pub watch_symbol: String,
    pub quote_poll_secs: u64,
    /// Dashboard defaults, in dashboard units (percent, percent, days).
    pub default_risk_free_rate: f64,
    pub default_volatility: f64,
    pub default_days_to_expiration: f64,
    pub default_account_size: f64,
    pub default_risk_percentage: f64,
    pub dashboard_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        let quote_poll_secs = env_var_or("QUOTE_POLL_SECS", "60")
            .parse::<u64>()
            .map_err(|e| EngineError::Config(format!("QUOTE_POLL_SECS: {e}")))?;

        Ok(Self {
            server_port,
            alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            alpha_vantage_base_url: env_var_or(
                "ALPHA_VANTAGE_BASE_URL",
                "https://www.alphavantage.co/query",
            ),
            watch_symbol: env_var_or("WATCH_SYMBOL", "AAPL").to_uppercase(),
            quote_poll_secs: quote_poll_secs.max(1),
            default_risk_free_rate: env_f64("DEFAULT_RISK_FREE_RATE", "5.0")?,
            default_volatility: env_f64("DEFAULT_VOLATILITY", "25.0")?,
            default_days_to_expiration: env_f64("DEFAULT_DAYS_TO_EXPIRATION", "30")?,
            default_account_size: env_f64("DEFAULT_ACCOUNT_SIZE", "10000")?,
            default_risk_percentage: env_f64("DEFAULT_RISK_PERCENTAGE", "2.0")?,
            dashboard_dir: PathBuf::from(env_var_or("DASHBOARD_DIR", "dashboard/dist")),
        })
    }

    #[inline]
    pub fn has_live_market_data(&self) -> bool {
        self.alpha_vantage_api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3001,
            alpha_vantage_api_key: None,
            alpha_vantage_base_url: "https://www.alphavantage.co/query".into(),
            watch_symbol: "AAPL".into(),
            quote_poll_secs: 60,
            default_risk_free_rate: 5.0,
            default_volatility: 25.0,
            default_days_to_expiration: 30.0,
            default_account_size: 10_000.0,
            default_risk_percentage: 2.0,
            dashboard_dir: PathBuf::from("dashboard/dist"),
        }
    }
}

fn env_f64(key: &str, default: &str) -> EngineResult<f64> {
    env_var_or(key, default)
        .parse::<f64>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
