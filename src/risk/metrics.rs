use crate::errors::{EngineError, EngineResult};
use crate::models::{round_to, OptionKind};
use crate::risk::breakeven::Breakevens;
use crate::risk::payoff::PayoffPoint;
use crate::risk::Ratio;
use crate::strategy::Contract;
use serde::Serialize;

/// Summary risk figures of a sampled payoff curve.
///
/// `max_profit` and `max_loss` are extrema over the sampled window only. A
/// strategy with an uncapped tail reports its value at the window edge; use
/// [`TailExposure`] to learn whether the true bound is infinite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakevens: Breakevens,
    /// Percentage (0-100) of sampled prices with positive profit.
    pub probability_of_profit: f64,
    /// |max_profit / max_loss|, `Unbounded` when max_loss is zero.
    pub risk_reward_ratio: Ratio,
}

/// Derive risk metrics from a curve and its breakevens.
///
/// `probability_of_profit` is the share of grid points in profit, a sampling
/// density over the window. It is not a lognormal probability and depends on
/// the window and resolution.
pub fn risk_metrics(curve: &[PayoffPoint], breakevens: &Breakevens) -> EngineResult<RiskMetrics> {
    if curve.is_empty() {
        return Err(EngineError::EmptyCurve);
    }

    let (max_profit, max_loss) = curve.iter().fold((f64::MIN, f64::MAX), |(hi, lo), p| {
        (hi.max(p.profit), lo.min(p.profit))
    });

    let profitable = curve.iter().filter(|p| p.profit > 0.0).count();
    let probability_of_profit = 100.0 * profitable as f64 / curve.len() as f64;

    Ok(RiskMetrics {
        max_profit: round_to(max_profit, 2),
        max_loss: round_to(max_loss, 2),
        breakevens: breakevens.clone(),
        probability_of_profit: round_to(probability_of_profit, 1),
        risk_reward_ratio: Ratio::checked(max_profit, max_loss).abs().rounded(2),
    })
}

/// What happens to profit as the underlying rises without limit.
///
/// Only calls have payoff slope above the highest strike, so the sign of the
/// net signed call quantity decides. The downside is always bounded since the
/// underlying cannot fall below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TailExposure {
    Bounded,
    UnlimitedProfit,
    UnlimitedLoss,
}

impl TailExposure {
    pub fn upside(contracts: &[Contract]) -> Self {
        let net_calls: f64 = contracts
            .iter()
            .filter(|c| c.kind == OptionKind::Call)
            .map(Contract::signed_weight)
            .sum();

        if net_calls > 0.0 {
            Self::UnlimitedProfit
        } else if net_calls < 0.0 {
            Self::UnlimitedLoss
        } else {
            Self::Bounded
        }
    }
}
