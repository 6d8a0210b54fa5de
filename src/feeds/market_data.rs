use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::mock::mock_quote;
use crate::models::volatility::{historical_volatility, DEFAULT_VOLATILITY};
use crate::state::{AppState, WsMessage};
use portable_atomic::Ordering;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Latest quote for one symbol, as the dashboard displays it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    /// Latest trading day, `YYYY-MM-DD`.
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Live,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedQuote {
    pub quote: Quote,
    pub source: QuoteSource,
}

/// Annualized volatility estimate, as a fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityEstimate {
    pub symbol: String,
    pub volatility: f64,
    /// Closes the estimate was computed from; 0 means the default was used.
    pub observations: usize,
}

/// Alpha Vantage REST client.
///
/// Without an API key every live call fails fast with `MarketData`, and the
/// `*_or_*` helpers fall back to mock quotes or the default volatility.
#[derive(Debug, Clone)]
pub struct MarketDataService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl MarketDataService {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: config.alpha_vantage_api_key.clone(),
            base_url: config.alpha_vantage_base_url.clone(),
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    /// GLOBAL_QUOTE for `symbol`.
    pub async fn quote(&self, symbol: &str) -> EngineResult<Quote> {
        let symbol = normalize_symbol(symbol)?;
        let body = self.query("GLOBAL_QUOTE", &symbol).await?;
        parse_global_quote(&body)
    }

    /// Daily closes for `symbol`, oldest first.
    pub async fn daily_closes(&self, symbol: &str) -> EngineResult<Vec<f64>> {
        let symbol = normalize_symbol(symbol)?;
        let body = self.query("TIME_SERIES_DAILY", &symbol).await?;
        parse_daily_closes(&body)
    }

    /// Live quote when possible, otherwise the demo table.
    pub async fn quote_or_mock(&self, symbol: &str) -> EngineResult<SourcedQuote> {
        let symbol = normalize_symbol(symbol)?;

        if self.is_live() {
            match self.quote(&symbol).await {
                Ok(quote) => {
                    return Ok(SourcedQuote {
                        quote,
                        source: QuoteSource::Live,
                    })
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "live quote failed, using mock data");
                }
            }
        }

        mock_quote(&symbol)
            .map(|quote| SourcedQuote {
                quote,
                source: QuoteSource::Mock,
            })
            .ok_or_else(|| EngineError::MarketData(format!("no quote available for {symbol}")))
    }

    /// Historical volatility from daily closes, or the 20% default when the
    /// series is unavailable or too short.
    pub async fn volatility_or_default(&self, symbol: &str) -> EngineResult<VolatilityEstimate> {
        let symbol = normalize_symbol(symbol)?;

        let closes = match self.daily_closes(&symbol).await {
            Ok(closes) => closes,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "daily closes unavailable, using default volatility");
                Vec::new()
            }
        };

        Ok(match historical_volatility(&closes) {
            Some(volatility) => VolatilityEstimate {
                symbol,
                volatility,
                observations: closes.len(),
            },
            None => VolatilityEstimate {
                symbol,
                volatility: DEFAULT_VOLATILITY,
                observations: 0,
            },
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> EngineResult<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EngineError::MarketData("no API key configured".into()))?;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("function", function), ("symbol", symbol), ("apikey", api_key)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::MarketData(format!("HTTP {status} for {function} {symbol}")));
        }

        Ok(resp.json::<Value>().await?)
    }
}

/// Uppercase and check a ticker before it reaches a URL or a lookup.
pub fn normalize_symbol(symbol: &str) -> EngineResult<String> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(symbol)
    } else {
        Err(EngineError::InvalidInput(format!("invalid symbol: {symbol:?}")))
    }
}

// GLOBAL_QUOTE response format:
// {
//   "Global Quote": {
//     "01. symbol": "AAPL",
//     "02. open": "174.0000",
//     "03. high": "176.8000",
//     "04. low": "173.2000",
//     "05. price": "175.5000",
//     "06. volume": "45678900",
//     "07. latest trading day": "2024-06-09",
//     "08. previous close": "173.2000",
//     "09. change": "2.3000",
//     "10. change percent": "1.3300%"
//   }
// }

/// Alpha Vantage reports failures and throttling as 200s with a message body.
fn check_api_message(body: &Value) -> EngineResult<()> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(msg) = body.get(key).and_then(Value::as_str) {
            return Err(EngineError::MarketData(msg.to_string()));
        }
    }
    Ok(())
}

fn field<'a>(obj: &'a Value, key: &str) -> EngineResult<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Parse(format!("missing field {key:?}")))
}

fn number(obj: &Value, key: &str) -> EngineResult<f64> {
    let raw = field(obj, key)?;
    let value: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| EngineError::Parse(format!("{key}: invalid number {raw:?}")))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::Parse(format!("{key}: non-finite {raw:?}")))
    }
}

pub fn parse_global_quote(body: &Value) -> EngineResult<Quote> {
    check_api_message(body)?;

    let q = body
        .get("Global Quote")
        .filter(|q| q.as_object().is_some_and(|m| !m.is_empty()))
        .ok_or_else(|| EngineError::MarketData("no quote data available".into()))?;

    let price = number(q, "05. price")?;
    if price <= 0.0 {
        return Err(EngineError::MarketData(format!("invalid price: {price}")));
    }

    let volume_raw = field(q, "06. volume")?;
    let volume = volume_raw
        .trim()
        .parse::<u64>()
        .map_err(|_| EngineError::Parse(format!("06. volume: invalid integer {volume_raw:?}")))?;

    Ok(Quote {
        symbol: field(q, "01. symbol")?.to_string(),
        price,
        change: number(q, "09. change")?,
        change_percent: number(q, "10. change percent")?,
        volume,
        high: number(q, "03. high")?,
        low: number(q, "04. low")?,
        open: number(q, "02. open")?,
        previous_close: number(q, "08. previous close")?,
        timestamp: field(q, "07. latest trading day")?.to_string(),
    })
}

/// Closes from a TIME_SERIES_DAILY body, ordered by date ascending.
/// Unparseable rows are skipped.
pub fn parse_daily_closes(body: &Value) -> EngineResult<Vec<f64>> {
    check_api_message(body)?;

    let series = body
        .get("Time Series (Daily)")
        .and_then(Value::as_object)
        .ok_or_else(|| EngineError::MarketData("no daily series available".into()))?;

    let by_date: BTreeMap<chrono::NaiveDate, f64> = series
        .iter()
        .filter_map(|(day, bar)| {
            let date = chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
            let close = number(bar, "4. close").ok()?;
            Some((date, close))
        })
        .collect();

    Ok(by_date.into_values().collect())
}

/// Polls the watched symbol and publishes each quote to dashboard clients.
pub async fn run_quote_feed(state: Arc<AppState>) {
    let symbol = state.config.watch_symbol.clone();
    let poll = std::time::Duration::from_secs(state.config.quote_poll_secs);
    tracing::info!(
        symbol = %symbol,
        live = state.market_data.is_live(),
        poll_secs = poll.as_secs(),
        "quote feed started"
    );

    let mut interval = tokio::time::interval(poll);
    let mut consecutive_errors: u32 = 0;

    loop {
        interval.tick().await;

        match state.market_data.quote_or_mock(&symbol).await {
            Ok(sourced) => {
                consecutive_errors = 0;
                state.counters.quotes_fetched.fetch_add(1, Ordering::Relaxed);
                if sourced.source == QuoteSource::Mock {
                    state.counters.mock_fallbacks.fetch_add(1, Ordering::Relaxed);
                }

                state.quote_tx.send_replace(Some(sourced.clone()));
                state.broadcast(WsMessage::Quote(sourced));
            }
            Err(e) => {
                consecutive_errors += 1;
                tracing::warn!(
                    symbol = %symbol,
                    error = %e,
                    consecutive = consecutive_errors,
                    "quote fetch failed"
                );
                state.broadcast(WsMessage::FeedError {
                    symbol: symbol.clone(),
                    error: e.to_string(),
                });

                // Back off on repeated failures (cap at 5 minutes)
                if consecutive_errors > 3 {
                    let backoff = std::cmp::min(consecutive_errors as u64 * poll.as_secs(), 300);
                    tokio::time::sleep(std::time::Duration::from_secs(backoff)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn global_quote() -> Value {
        json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "02. open": "174.0000",
                "03. high": "176.8000",
                "04. low": "173.2000",
                "05. price": "175.5000",
                "06. volume": "45678900",
                "07. latest trading day": "2024-06-09",
                "08. previous close": "173.2000",
                "09. change": "2.3000",
                "10. change percent": "1.3300%"
            }
        })
    }

    #[test]
    fn test_parse_global_quote() {
        let q = parse_global_quote(&global_quote()).unwrap();
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.price, 175.5);
        assert_eq!(q.change_percent, 1.33);
        assert_eq!(q.volume, 45_678_900);
        assert_eq!(q.timestamp, "2024-06-09");
    }

    #[test]
    fn test_api_messages_are_errors() {
        let throttled = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." });
        let bad = json!({ "Error Message": "Invalid API call." });
        assert!(matches!(parse_global_quote(&throttled), Err(EngineError::MarketData(_))));
        assert!(matches!(parse_daily_closes(&bad), Err(EngineError::MarketData(_))));
    }

    #[test]
    fn test_empty_quote_rejected() {
        assert!(parse_global_quote(&json!({ "Global Quote": {} })).is_err());
        let mut body = global_quote();
        body["Global Quote"]["05. price"] = json!("n/a");
        assert!(matches!(parse_global_quote(&body), Err(EngineError::Parse(_))));
    }

    #[test]
    fn test_daily_closes_sorted_oldest_first() {
        let body = json!({
            "Meta Data": { "2. Symbol": "AAPL" },
            "Time Series (Daily)": {
                "2024-06-07": { "1. open": "1", "4. close": "102.0" },
                "2024-06-05": { "1. open": "1", "4. close": "100.0" },
                "2024-06-06": { "1. open": "1", "4. close": "101.0" },
                "garbage": { "4. close": "999.0" }
            }
        });
        assert_eq!(parse_daily_closes(&body).unwrap(), vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" spy ").unwrap(), "SPY");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert!(normalize_symbol("").is_err());
        assert!(normalize_symbol("AAPL&apikey=x").is_err());
    }

    #[tokio::test]
    async fn test_no_key_falls_back_to_mock() {
        let svc = MarketDataService::new(&AppConfig::default());
        let q = svc.quote_or_mock("msft").await.unwrap();
        assert_eq!(q.source, QuoteSource::Mock);
        assert_eq!(q.quote.price, 420.15);
        assert!(svc.quote_or_mock("ZZZZ").await.is_err());
    }

    #[tokio::test]
    async fn test_no_key_volatility_is_default() {
        let svc = MarketDataService::new(&AppConfig::default());
        let v = svc.volatility_or_default("AAPL").await.unwrap();
        assert_eq!(v.volatility, DEFAULT_VOLATILITY);
        assert_eq!(v.observations, 0);
    }
}
