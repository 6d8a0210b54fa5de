pub mod black_scholes;
pub mod implied_vol;
pub mod normal;
pub mod volatility;

use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, EngineResult};
use serde::{Deserialize, Serialize};

/// Days per year used for theta decay and dashboard day counts.
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Exercise value at `spot`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Market assumptions shared by every leg of a strategy.
/// Rate and volatility are fractions, time is in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    pub spot: f64,
    pub rate: f64,
    pub volatility: f64,
    pub time_years: f64,
}

impl MarketParameters {
    pub fn new(spot: f64, rate: f64, volatility: f64, time_years: f64) -> EngineResult<Self> {
        let market = Self { spot, rate, volatility, time_years };
        market.validate()?;
        Ok(market)
    }

    /// Build from dashboard units: percent rate, percent volatility, calendar days.
    pub fn from_dashboard(
        spot: f64,
        rate_pct: f64,
        volatility_pct: f64,
        days_to_expiration: f64,
    ) -> EngineResult<Self> {
        Self::new(
            spot,
            rate_pct / 100.0,
            volatility_pct / 100.0,
            days_to_expiration / DAYS_PER_YEAR,
        )
    }

    pub fn validate(&self) -> EngineResult<()> {
        ensure_positive("spot", self.spot)?;
        ensure_finite("rate", self.rate)?;
        ensure_positive("volatility", self.volatility)?;
        ensure_non_negative("time to expiration", self.time_years)
    }

    #[inline]
    pub fn days_to_expiration(&self) -> f64 {
        self.time_years * DAYS_PER_YEAR
    }

    /// Model inputs for one strike under these market assumptions.
    #[inline]
    pub fn params_for(&self, strike: f64) -> EngineResult<ModelParams> {
        ModelParams::new(self.spot, strike, self.time_years, self.rate, self.volatility)
    }
}

// ── Precomputed model parameters (stack, no alloc) ──

/// Validated closed-form inputs. Construction is the single place where
/// degenerate values are rejected, so every formula downstream is total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub spot: f64,
    pub strike: f64,
    pub time_years: f64,
    pub rate: f64,
    pub sigma: f64,
    // Precomputed
    pub ln_s_k: f64,
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
    pub discount: f64,
}

impl ModelParams {
    pub fn new(spot: f64, strike: f64, time_years: f64, rate: f64, sigma: f64) -> EngineResult<Self> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_non_negative("time to expiration", time_years)?;
        ensure_finite("rate", rate)?;
        ensure_positive("volatility", sigma)?;

        let sqrt_t = time_years.sqrt();
        Ok(Self {
            spot,
            strike,
            time_years,
            rate,
            sigma,
            ln_s_k: (spot / strike).ln(),
            sqrt_t,
            sigma_sqrt_t: sigma * sqrt_t,
            discount: (-rate * time_years).exp(),
        })
    }

    /// Same contract, different volatility. Used by the implied-vol iteration.
    #[inline]
    pub fn with_sigma(&self, sigma: f64) -> EngineResult<Self> {
        Self::new(self.spot, self.strike, self.time_years, self.rate, sigma)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.time_years <= 0.0
    }

    /// (d1, d2). Only meaningful before expiration.
    #[inline]
    pub fn d1_d2(&self) -> (f64, f64) {
        let d1 = (self.ln_s_k + (self.rate + 0.5 * self.sigma * self.sigma) * self.time_years)
            / self.sigma_sqrt_t;
        (d1, d1 - self.sigma_sqrt_t)
    }
}

/// First and second order sensitivities. The same shape serves a single
/// contract and a whole portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl Greeks {
    #[inline]
    pub fn scaled(&self, weight: f64) -> Self {
        Self {
            delta: self.delta * weight,
            gamma: self.gamma * weight,
            theta: self.theta * weight,
            vega: self.vega * weight,
            rho: self.rho * weight,
        }
    }

    #[inline]
    pub fn rounded(&self, decimals: i32) -> Self {
        Self {
            delta: round_to(self.delta, decimals),
            gamma: round_to(self.gamma, decimals),
            theta: round_to(self.theta, decimals),
            vega: round_to(self.vega, decimals),
            rho: round_to(self.rho, decimals),
        }
    }
}

impl std::ops::AddAssign for Greeks {
    fn add_assign(&mut self, rhs: Self) {
        self.delta += rhs.delta;
        self.gamma += rhs.gamma;
        self.theta += rhs.theta;
        self.vega += rhs.vega;
        self.rho += rhs.rho;
    }
}

/// Theoretical price plus sensitivities for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Valuation {
    pub price: f64,
    pub greeks: Greeks,
}

/// All pricing models implement this trait.
/// value() must be a pure function: deterministic output from inputs only.
/// Send + Sync required for use across tokio tasks.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Price and Greeks for one contract. Never panics: params are validated
    /// at construction.
    fn value(&self, kind: OptionKind, params: &ModelParams) -> Valuation;
}

/// Round half away from zero to `decimals` places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
