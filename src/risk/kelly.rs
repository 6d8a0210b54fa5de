//! Kelly percentage from the dashboard's risk figures.
//!
//! kelly = (p - (1 - p) / b) * 100
//!
//! where:
//!   p = probability_of_profit / 100
//!   b = risk/reward ratio (max profit per unit of max loss)
//!
//! Only quoted when p > 0.5. An unbounded ratio (no sampled loss) drops the
//! second term; a zero ratio has no payoff to bet on and yields nothing.
//! Pure function.

use crate::risk::Ratio;

/// Minimum probability of profit (percent) before a Kelly figure is quoted.
const MIN_PROBABILITY_PCT: f64 = 50.0;

#[inline]
pub fn kelly_percentage(probability_of_profit: f64, risk_reward: Ratio) -> Option<f64> {
    if !probability_of_profit.is_finite() || probability_of_profit <= MIN_PROBABILITY_PCT {
        return None;
    }

    let p = probability_of_profit / 100.0;
    let loss_term = match risk_reward {
        Ratio::Unbounded => 0.0,
        Ratio::Finite(b) if b > 0.0 && b.is_finite() => (1.0 - p) / b,
        Ratio::Finite(_) => return None,
    };

    let kelly = (p - loss_term) * 100.0;
    (kelly > 0.0).then_some(kelly)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_half_no_bet() {
        assert_eq!(kelly_percentage(50.0, Ratio::Finite(3.0)), None);
        assert_eq!(kelly_percentage(35.0, Ratio::Unbounded), None);
    }

    #[test]
    fn test_even_odds() {
        // p = 0.6, b = 1: 0.6 - 0.4 = 0.2
        let k = kelly_percentage(60.0, Ratio::Finite(1.0)).unwrap();
        assert!((k - 20.0).abs() < 1e-9, "kelly={k}");
    }

    #[test]
    fn test_unbounded_ratio_drops_loss_term() {
        let k = kelly_percentage(70.0, Ratio::Unbounded).unwrap();
        assert!((k - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_ratio() {
        assert_eq!(kelly_percentage(80.0, Ratio::Finite(0.0)), None);
    }

    #[test]
    fn test_negative_edge_is_none() {
        // p = 0.55, b = 0.5: 0.55 - 0.9 < 0
        assert_eq!(kelly_percentage(55.0, Ratio::Finite(0.5)), None);
    }
}
