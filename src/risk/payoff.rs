use crate::errors::{ensure_non_negative, ensure_positive, EngineError, EngineResult};
use crate::strategy::Contract;
use serde::{Deserialize, Serialize};

/// Default window half-width around the center price, as a fraction.
pub const DEFAULT_WINDOW: f64 = 0.30;
/// Default sampling intervals; the curve has `steps + 1` points.
pub const DEFAULT_STEPS: usize = 100;
/// Upper bound on sampling intervals. Ranges arrive over HTTP, and the curve
/// is allocated up front.
pub const MAX_STEPS: usize = 100_000;

/// Price window and sampling resolution for a payoff curve.
///
/// Resolution is observable: two crossings inside one interval collapse into
/// a single breakeven, so changing `steps` changes reported results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl PriceRange {
    /// [0.7 * center, 1.3 * center] in 100 intervals.
    pub fn centered(center: f64) -> Self {
        Self {
            min: center * (1.0 - DEFAULT_WINDOW),
            max: center * (1.0 + DEFAULT_WINDOW),
            steps: DEFAULT_STEPS,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("range min", self.min)?;
        ensure_positive("range max", self.max)?;
        if self.min >= self.max {
            return Err(EngineError::InvalidInput(format!(
                "range min {} must be below max {}",
                self.min, self.max
            )));
        }
        if self.steps == 0 {
            return Err(EngineError::InvalidInput("range steps must be >= 1".into()));
        }
        if self.steps > MAX_STEPS {
            return Err(EngineError::InvalidInput(format!(
                "range steps must be <= {MAX_STEPS}, got {}",
                self.steps
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn step(&self) -> f64 {
        (self.max - self.min) / self.steps as f64
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Ascending sample prices, `min + i * step` for `i` in `0..=steps`.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        let step = self.step();
        (0..=self.steps).map(move |i| self.min + i as f64 * step)
    }
}

/// Strategy profit at a hypothetical expiration price, in currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub profit: f64,
}

/// Builds the expiration-only profit curve of a strategy.
///
/// Each point is the sum of every leg's intrinsic value net of premium at that
/// price. No time value and no volatility: this is "held to expiration", not
/// "marked today".
#[derive(Debug, Clone, Copy)]
pub struct PayoffCurveBuilder {
    range: PriceRange,
}

impl PayoffCurveBuilder {
    /// Default window around `center`.
    pub fn new(center: f64) -> Self {
        Self { range: PriceRange::centered(center) }
    }

    pub fn with_range(mut self, range: PriceRange) -> Self {
        self.range = range;
        self
    }

    #[inline]
    pub fn range(&self) -> &PriceRange {
        &self.range
    }

    pub fn build(&self, contracts: &[Contract]) -> EngineResult<Vec<PayoffPoint>> {
        payoff_curve(contracts, &self.range)
    }
}

/// Sample the strategy's expiration profit across `range`, ascending in price.
pub fn payoff_curve(contracts: &[Contract], range: &PriceRange) -> EngineResult<Vec<PayoffPoint>> {
    range.validate()?;
    for c in contracts {
        c.validate()?;
    }

    Ok(range
        .prices()
        .map(|price| PayoffPoint {
            price,
            profit: contracts.iter().map(|c| c.payoff_at(price)).sum(),
        })
        .collect())
}
