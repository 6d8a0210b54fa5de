//! Newton-Raphson inversion of the Black-Scholes price for volatility.
//!
//! The iteration divides by the per-unit vega (`black_scholes::raw_vega`),
//! not the percentage-point vega the Greeks report. Mixing the two makes the
//! step 100x too large.

use crate::errors::{ensure_non_negative, EngineResult};
use crate::models::black_scholes::{price, raw_vega};
use crate::models::{ModelParams, OptionKind};
use serde::{Deserialize, Serialize};

/// Iteration settings. Defaults reproduce the dashboard solver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IvSolverConfig {
    pub initial_guess: f64,
    /// Absolute price error accepted as converged.
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Lowest volatility ever returned or iterated from.
    pub vol_floor: f64,
    /// Per-unit vega below this is treated as zero.
    pub min_vega: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.20,
            tolerance: 1e-4,
            max_iterations: 100,
            vol_floor: 0.01,
            min_vega: 1e-8,
        }
    }
}

/// How the iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IvStatus {
    /// Model price matched the observed price within tolerance.
    Converged,
    /// Vega vanished (expired or far out of the money); no further step possible.
    VegaVanished,
    /// Iteration budget spent without meeting tolerance.
    Exhausted,
}

/// Solver output. `sigma` is always the best available estimate, even when
/// the iteration did not converge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvSolution {
    pub sigma: f64,
    pub iterations: u32,
    pub status: IvStatus,
    /// Model price at `sigma` minus the observed price.
    pub price_error: f64,
}

impl IvSolution {
    #[inline]
    pub fn converged(&self) -> bool {
        self.status == IvStatus::Converged
    }
}

/// Recover volatility from an observed option price with default settings.
pub fn implied_volatility(
    kind: OptionKind,
    market_price: f64,
    spot: f64,
    strike: f64,
    time_years: f64,
    rate: f64,
) -> EngineResult<IvSolution> {
    solve(kind, market_price, spot, strike, time_years, rate, &IvSolverConfig::default())
}

pub fn solve(
    kind: OptionKind,
    market_price: f64,
    spot: f64,
    strike: f64,
    time_years: f64,
    rate: f64,
    config: &IvSolverConfig,
) -> EngineResult<IvSolution> {
    ensure_non_negative("market price", market_price)?;
    let mut params = ModelParams::new(spot, strike, time_years, rate, config.initial_guess)?;

    let mut sigma = config.initial_guess;
    let mut price_error = price(kind, &params) - market_price;
    let mut status = IvStatus::Exhausted;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        price_error = price(kind, &params) - market_price;
        let vega = raw_vega(&params);

        if price_error.abs() < config.tolerance {
            status = IvStatus::Converged;
            break;
        }
        if vega < config.min_vega {
            status = IvStatus::VegaVanished;
            break;
        }

        iterations += 1;
        let mut next = sigma - price_error / vega;
        if next <= 0.0 {
            next = config.vol_floor;
        }
        if !next.is_finite() {
            status = IvStatus::VegaVanished;
            break;
        }

        tracing::trace!(iteration = iterations, sigma = next, error = price_error, "iv step");
        sigma = next;
        params = params.with_sigma(sigma)?;
    }

    // The last step's iterate has not been checked yet
    if status == IvStatus::Exhausted {
        price_error = price(kind, &params) - market_price;
        if price_error.abs() < config.tolerance {
            status = IvStatus::Converged;
        }
    }

    if status != IvStatus::Converged {
        tracing::warn!(
            kind = %kind,
            market_price,
            sigma,
            iterations,
            status = ?status,
            "implied volatility did not converge"
        );
    }

    Ok(IvSolution {
        sigma: sigma.max(config.vol_floor),
        iterations,
        status,
        price_error,
    })
}
