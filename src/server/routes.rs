use crate::analysis::{analyze, AnalysisOptions, AnalysisReport};
use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::feeds::market_data::{normalize_symbol, SourcedQuote, VolatilityEstimate};
use crate::models::black_scholes::BlackScholes;
use crate::models::implied_vol::{implied_volatility, IvSolution};
use crate::models::{round_to, Greeks, MarketParameters, OptionKind, PricingModel, DAYS_PER_YEAR};
use crate::risk::payoff::PriceRange;
use crate::state::{AppState, CountersSnapshot};
use crate::strategy::templates::{self, StrategyTemplate, TEMPLATES};
use crate::strategy::{Contract, StrategyBook};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::NaiveDate;
use portable_atomic::Ordering;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Error mapping ──

/// Engine error on its way out as JSON.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_input() => StatusCode::BAD_REQUEST,
            EngineError::MarketData(_) | EngineError::Network(_) | EngineError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Count, log and wrap a failed request.
fn rejected(state: &AppState, route: &'static str, e: EngineError) -> ApiError {
    state.counters.requests_rejected.fetch_add(1, Ordering::Relaxed);
    tracing::warn!(route, error = %e, "request rejected");
    ApiError(e)
}

// ── Request bodies (dashboard units: percent, percent, days) ──

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInput {
    pub underlying_price: f64,
    pub risk_free_rate: Option<f64>,
    pub volatility: Option<f64>,
    pub days_to_expiration: Option<f64>,
}

impl MarketInput {
    /// Missing fields take the configured dashboard defaults.
    pub fn resolve(&self, config: &AppConfig) -> EngineResult<MarketParameters> {
        MarketParameters::from_dashboard(
            self.underlying_price,
            self.risk_free_rate.unwrap_or(config.default_risk_free_rate),
            self.volatility.unwrap_or(config.default_volatility),
            self.days_to_expiration.unwrap_or(config.default_days_to_expiration),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub contracts: Vec<Contract>,
    #[serde(flatten)]
    pub market: MarketInput,
    pub range: Option<PriceRange>,
    pub account_size: Option<f64>,
    pub risk_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksRequest {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub strike: f64,
    #[serde(flatten)]
    pub market: MarketInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedVolRequest {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub market_price: f64,
    pub underlying_price: f64,
    pub strike: f64,
    pub risk_free_rate: Option<f64>,
    pub days_to_expiration: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstantiateQuery {
    pub symbol: Option<String>,
    pub expiration: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractValuation {
    pub model: &'static str,
    /// Per-share theoretical value, rounded to cents.
    pub price: f64,
    pub greeks: Greeks,
}

// ── Handlers ──

/// GET /api/templates -- built-in strategy catalog
pub async fn list_templates() -> Json<&'static [StrategyTemplate]> {
    Json(TEMPLATES)
}

/// POST /api/templates/{id} -- materialize a template for a symbol
pub async fn instantiate_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<InstantiateQuery>,
) -> ApiResult<StrategyBook> {
    materialize(&state.config, &id, &params)
        .map(Json)
        .map_err(|e| rejected(&state, "templates", e))
}

/// GET /api/quote/{symbol} -- live quote, or mock when unavailable
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<SourcedQuote> {
    state
        .market_data
        .quote_or_mock(&symbol)
        .await
        .map(Json)
        .map_err(|e| rejected(&state, "quote", e))
}

/// GET /api/volatility/{symbol} -- annualized historical volatility (fraction)
pub async fn get_volatility(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<VolatilityEstimate> {
    state
        .market_data
        .volatility_or_default(&symbol)
        .await
        .map(Json)
        .map_err(|e| rejected(&state, "volatility", e))
}

/// POST /api/analyze -- full recompute for one strategy snapshot
pub async fn post_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StrategyRequest>,
) -> ApiResult<AnalysisReport> {
    match analyze_request(&state.config, req) {
        Ok(report) => {
            state.counters.analyses_run.fetch_add(1, Ordering::Relaxed);
            Ok(Json(report))
        }
        Err(e) => Err(rejected(&state, "analyze", e)),
    }
}

/// POST /api/greeks -- price and Greeks for one contract
pub async fn post_greeks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GreeksRequest>,
) -> ApiResult<ContractValuation> {
    let result = req
        .market
        .resolve(&state.config)
        .and_then(|market| market.params_for(req.strike))
        .map(|params| {
            let model = BlackScholes;
            let valuation = model.value(req.kind, &params);
            ContractValuation {
                model: model.name(),
                price: round_to(valuation.price, 2),
                greeks: valuation.greeks,
            }
        });

    result.map(Json).map_err(|e| rejected(&state, "greeks", e))
}

/// POST /api/implied-vol -- Newton-Raphson volatility from an observed price
pub async fn post_implied_vol(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImpliedVolRequest>,
) -> ApiResult<IvSolution> {
    let rate = req.risk_free_rate.unwrap_or(state.config.default_risk_free_rate) / 100.0;
    let days = req
        .days_to_expiration
        .unwrap_or(state.config.default_days_to_expiration);

    implied_volatility(
        req.kind,
        req.market_price,
        req.underlying_price,
        req.strike,
        days / DAYS_PER_YEAR,
        rate,
    )
    .map(Json)
    .map_err(|e| rejected(&state, "implied-vol", e))
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<CountersSnapshot> {
    Json(state.counters.snapshot())
}

fn materialize(config: &AppConfig, id: &str, params: &InstantiateQuery) -> EngineResult<StrategyBook> {
    let template = templates::find(id)
        .ok_or_else(|| EngineError::InvalidInput(format!("unknown template: {id}")))?;
    let symbol = normalize_symbol(params.symbol.as_deref().unwrap_or(&config.watch_symbol))?;
    let expiration = params.expiration.unwrap_or_else(|| default_expiration(config));
    template.instantiate(&symbol, expiration)
}

fn analyze_request(config: &AppConfig, req: StrategyRequest) -> EngineResult<AnalysisReport> {
    let market = req.market.resolve(config)?;
    let name = if req.name.is_empty() { "Custom Strategy".to_string() } else { req.name };
    let book = StrategyBook::from_contracts(name, req.contracts)?.with_description(req.description);

    let defaults = AnalysisOptions::from_config(config);
    let options = AnalysisOptions {
        range: req.range,
        account_size: req.account_size.unwrap_or(defaults.account_size),
        risk_percentage: req.risk_percentage.unwrap_or(defaults.risk_percentage),
    };
    analyze(&book, &market, &options)
}

fn default_expiration(config: &AppConfig) -> NaiveDate {
    let today = chrono::Utc::now().date_naive();
    let days = config.default_days_to_expiration.max(0.0).round() as i64;
    today + chrono::Duration::days(days)
}
