use crate::errors::{ensure_finite, ensure_non_negative, ensure_positive, EngineResult};
use crate::models::round_to;
use crate::risk::metrics::{RiskMetrics, TailExposure};
use crate::risk::sizing::risk_budget;
use crate::risk::Ratio;
use serde::Serialize;
use smallvec::SmallVec;

/// Days to expiration below which theta decay is flagged.
const TIME_DECAY_DAYS: f64 = 7.0;
/// Probability of profit (percent) below which the strategy is flagged.
const LOW_PROBABILITY_PCT: f64 = 40.0;

/// Share of the risk budget consumed by the strategy's worst sampled loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// <= 50% Low, <= 80% Medium, otherwise High.
    #[inline]
    pub fn from_utilization(utilization: Ratio) -> Self {
        if !utilization.exceeds(50.0) {
            RiskLevel::Low
        } else if !utilization.exceeds(80.0) {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskWarning {
    /// Worst sampled loss is larger than the risk budget.
    ExceedsRiskTolerance,
    /// Net short calls: loss grows without limit as the underlying rises.
    UnlimitedLoss,
    /// Under a week to expiration.
    HighTimeDecay,
    LowProbabilityOfProfit,
    /// Not a warning: low utilization, even odds or better, time to work.
    BalancedProfile,
}

impl RiskWarning {
    pub fn message(self) -> &'static str {
        match self {
            RiskWarning::ExceedsRiskTolerance => "position exceeds risk tolerance",
            RiskWarning::UnlimitedLoss => "unlimited loss potential",
            RiskWarning::HighTimeDecay => "high time decay risk",
            RiskWarning::LowProbabilityOfProfit => "low probability of profit",
            RiskWarning::BalancedProfile => "well-balanced risk profile",
        }
    }
}

impl std::fmt::Display for RiskWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A breakeven and how far the underlying must move to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakevenDistance {
    pub breakeven: f64,
    pub distance: f64,
    /// Distance as a percentage of spot, 2 dp.
    pub distance_pct: f64,
}

/// Account-level view of a strategy's risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub max_risk_amount: f64,
    pub current_risk: f64,
    /// current_risk / max_risk_amount in percent; `Unbounded` with a zero budget.
    pub utilization: Ratio,
    pub level: RiskLevel,
    pub warnings: SmallVec<[RiskWarning; 4]>,
    pub breakeven_distances: Vec<BreakevenDistance>,
}

impl RiskAssessment {
    #[inline]
    pub fn has(&self, warning: RiskWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

/// Inputs to [`assess`] beyond the metrics themselves.
#[derive(Debug, Clone, Copy)]
pub struct AccountRisk {
    pub account_size: f64,
    pub risk_percentage: f64,
}

/// Assess a strategy's metrics against an account's risk budget.
/// Pure function, no side effects.
pub fn assess(
    metrics: &RiskMetrics,
    upside: TailExposure,
    account: AccountRisk,
    spot: f64,
    days_to_expiration: f64,
) -> EngineResult<RiskAssessment> {
    ensure_non_negative("account size", account.account_size)?;
    ensure_non_negative("risk percentage", account.risk_percentage)?;
    ensure_positive("spot", spot)?;
    ensure_finite("days to expiration", days_to_expiration)?;

    let max_risk_amount = risk_budget(account.account_size, account.risk_percentage);
    let current_risk = metrics.max_loss.abs();
    let utilization = if current_risk == 0.0 {
        Ratio::Finite(0.0)
    } else {
        Ratio::checked(current_risk * 100.0, max_risk_amount)
    };
    let level = RiskLevel::from_utilization(utilization);

    let pop = metrics.probability_of_profit;
    let mut warnings = SmallVec::new();

    // 1. Worst case larger than the budget
    if utilization.exceeds(100.0) {
        warnings.push(RiskWarning::ExceedsRiskTolerance);
    }

    // 2. Uncapped loss above the sampled window
    if upside == TailExposure::UnlimitedLoss {
        warnings.push(RiskWarning::UnlimitedLoss);
    }

    // 3. Theta
    if days_to_expiration < TIME_DECAY_DAYS {
        warnings.push(RiskWarning::HighTimeDecay);
    }

    // 4. Odds
    if pop < LOW_PROBABILITY_PCT {
        warnings.push(RiskWarning::LowProbabilityOfProfit);
    }

    if !utilization.exceeds(50.0) && pop >= 50.0 && days_to_expiration >= TIME_DECAY_DAYS {
        warnings.push(RiskWarning::BalancedProfile);
    }

    let breakeven_distances = metrics
        .breakevens
        .iter()
        .map(|&breakeven| {
            let distance = (breakeven - spot).abs();
            BreakevenDistance {
                breakeven,
                distance: round_to(distance, 2),
                distance_pct: round_to(distance / spot * 100.0, 2),
            }
        })
        .collect();

    Ok(RiskAssessment {
        max_risk_amount,
        current_risk,
        utilization: utilization.rounded(1),
        level,
        warnings,
        breakeven_distances,
    })
}
