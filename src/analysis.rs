use crate::config::AppConfig;
use crate::errors::EngineResult;
use crate::models::black_scholes::BlackScholes;
use crate::models::{round_to, MarketParameters, PricingModel};
use crate::risk::breakeven::find_breakevens;
use crate::risk::kelly::kelly_percentage;
use crate::risk::limits::{assess, AccountRisk, RiskAssessment};
use crate::risk::metrics::{risk_metrics, RiskMetrics, TailExposure};
use crate::risk::payoff::{PayoffCurveBuilder, PayoffPoint, PriceRange};
use crate::risk::portfolio::{aggregate_greeks, PortfolioGreeks};
use crate::risk::sizing::recommended_size;
use crate::strategy::StrategyBook;
use serde::{Deserialize, Serialize};

/// Everything a recompute needs beyond the book and market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Payoff window; `None` uses [0.7, 1.3] x spot in 100 intervals.
    pub range: Option<PriceRange>,
    pub account_size: f64,
    pub risk_percentage: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            range: None,
            account_size: 10_000.0,
            risk_percentage: 2.0,
        }
    }
}

impl AnalysisOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            range: None,
            account_size: config.default_account_size,
            risk_percentage: config.default_risk_percentage,
        }
    }
}

/// A full, fresh result bundle for one strategy snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub strategy: String,
    pub model: &'static str,
    pub market: MarketParameters,
    pub greeks: PortfolioGreeks,
    pub curve: Vec<PayoffPoint>,
    pub metrics: Option<RiskMetrics>,
    pub upside: TailExposure,
    /// Premium paid (positive) or received (negative) to open, in currency.
    pub net_debit: f64,
    pub recommended_size: u32,
    pub kelly_percentage: Option<f64>,
    pub assessment: Option<RiskAssessment>,
}

/// Recompute every view of `book` under Black-Scholes.
pub fn analyze(
    book: &StrategyBook,
    market: &MarketParameters,
    options: &AnalysisOptions,
) -> EngineResult<AnalysisReport> {
    analyze_with(&BlackScholes, book, market, options)
}

/// Recompute every view of `book` under `model`.
///
/// Greeks and the payoff curve are independent pure functions of the same
/// contract list; nothing is cached between calls, so identical inputs give
/// bit-identical reports.
pub fn analyze_with<M: PricingModel + ?Sized>(
    model: &M,
    book: &StrategyBook,
    market: &MarketParameters,
    options: &AnalysisOptions,
) -> EngineResult<AnalysisReport> {
    book.validate()?;
    let contracts = book.contracts();
    let greeks = aggregate_greeks(model, contracts, market)?;

    let mut report = AnalysisReport {
        strategy: book.name.clone(),
        model: model.name(),
        market: *market,
        greeks,
        curve: Vec::new(),
        metrics: None,
        upside: TailExposure::Bounded,
        net_debit: 0.0,
        recommended_size: 0,
        kelly_percentage: None,
        assessment: None,
    };

    if contracts.is_empty() {
        return Ok(report);
    }

    let range = options.range.unwrap_or_else(|| PriceRange::centered(market.spot));
    let curve = PayoffCurveBuilder::new(market.spot).with_range(range).build(contracts)?;
    let breakevens = find_breakevens(&curve);
    let metrics = risk_metrics(&curve, &breakevens)?;
    let upside = TailExposure::upside(contracts);

    let size = recommended_size(options.account_size, options.risk_percentage, metrics.max_loss)?;
    let kelly = kelly_percentage(metrics.probability_of_profit, metrics.risk_reward_ratio)
        .map(|k| round_to(k, 1));
    let assessment = assess(
        &metrics,
        upside,
        AccountRisk {
            account_size: options.account_size,
            risk_percentage: options.risk_percentage,
        },
        market.spot,
        market.days_to_expiration(),
    )?;

    tracing::debug!(
        strategy = %book.name,
        legs = contracts.len(),
        max_profit = metrics.max_profit,
        max_loss = metrics.max_loss,
        breakevens = metrics.breakevens.len(),
        size,
        "Strategy analyzed"
    );

    report.curve = curve;
    report.upside = upside;
    report.net_debit = round_to(book.net_debit(), 2);
    report.recommended_size = size;
    report.kelly_percentage = kelly;
    report.assessment = Some(assessment);
    report.metrics = Some(metrics);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionKind;
    use crate::risk::limits::{RiskLevel, RiskWarning};
    use crate::risk::Ratio;
    use crate::strategy::contract::fixtures::leg;
    use crate::strategy::Position;

    fn market() -> MarketParameters {
        MarketParameters::from_dashboard(100.0, 5.0, 25.0, 30.0).unwrap()
    }

    fn straddle() -> StrategyBook {
        StrategyBook::from_contracts(
            "Long Straddle",
            [
                leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1),
                leg(OptionKind::Put, Position::Long, 100.0, 5.0, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_straddle_report() {
        let r = analyze(&straddle(), &market(), &AnalysisOptions::default()).unwrap();
        let m = r.metrics.as_ref().unwrap();

        assert_eq!(r.model, "Black-Scholes");
        assert_eq!(r.curve.len(), 101);
        assert_eq!(m.max_loss, -1000.0);
        assert_eq!(m.breakevens.len(), 2);
        assert!((m.breakevens[0] - 90.0).abs() <= 0.3 && (m.breakevens[1] - 110.0).abs() <= 0.3);
        assert_eq!(r.upside, TailExposure::UnlimitedProfit);
        assert_eq!(r.net_debit, 1000.0);
        // Budget 200 against a 1000 loss: floor rule.
        assert_eq!(r.recommended_size, 1);

        let a = r.assessment.as_ref().unwrap();
        assert_eq!(a.utilization, Ratio::Finite(500.0));
        assert_eq!(a.level, RiskLevel::High);
        assert!(a.has(RiskWarning::ExceedsRiskTolerance));

        // Call and put deltas nearly cancel at the money; gamma adds.
        assert!(r.greeks.total.delta.abs() < 0.2, "delta={}", r.greeks.total.delta);
        assert!(r.greeks.total.gamma > 0.0);
        assert_eq!(r.greeks.legs.len(), 2);
    }

    #[test]
    fn test_recompute_is_bit_identical() {
        let book = straddle();
        let opts = AnalysisOptions::default();
        let a = analyze(&book, &market(), &opts).unwrap();
        let b = analyze(&book, &market(), &opts).unwrap();
        assert_eq!(a, b);
        for (p, q) in a.curve.iter().zip(&b.curve) {
            assert_eq!(p.profit.to_bits(), q.profit.to_bits());
        }
    }

    #[test]
    fn test_empty_book_is_empty_report() {
        let r = analyze(&StrategyBook::new("Empty"), &market(), &AnalysisOptions::default()).unwrap();
        assert!(r.curve.is_empty());
        assert!(r.metrics.is_none());
        assert!(r.assessment.is_none());
        assert_eq!(r.recommended_size, 0);
        assert_eq!(r.greeks.total, crate::models::Greeks::default());
    }

    #[test]
    fn test_custom_range_and_budget() {
        let book = StrategyBook::from_contracts(
            "Long Call",
            [leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1)],
        )
        .unwrap();
        let opts = AnalysisOptions {
            range: Some(PriceRange { min: 70.0, max: 130.0, steps: 100 }),
            account_size: 50_000.0,
            risk_percentage: 5.0,
        };
        let r = analyze(&book, &market(), &opts).unwrap();
        let m = r.metrics.unwrap();
        assert_eq!(m.max_loss, -500.0);
        assert_eq!(r.recommended_size, 5);
        // pop 41.6 is below the Kelly threshold.
        assert_eq!(r.kelly_percentage, None);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let opts = AnalysisOptions {
            range: Some(PriceRange { min: 10.0, max: 5.0, steps: 10 }),
            ..AnalysisOptions::default()
        };
        assert!(analyze(&straddle(), &market(), &opts).is_err());
    }
}
