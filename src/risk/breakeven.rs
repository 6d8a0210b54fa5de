use crate::models::round_to;
use crate::risk::payoff::PayoffPoint;
use smallvec::SmallVec;

/// Breakeven prices, ascending. Vanilla strategies rarely have more than four.
pub type Breakevens = SmallVec<[f64; 4]>;

/// Locate zero crossings of a sampled payoff curve.
///
/// A crossing is recorded between consecutive samples when profit moves from
/// `<= 0` to `> 0` or from `> 0` to `<= 0`; the price is linearly interpolated
/// by profit magnitude and rounded to cents.
///
/// Resolution limit: at most one crossing per sampling interval is seen, so
/// two crossings that fall between the same pair of samples collapse into one
/// (or vanish). Widen `steps` on the range to resolve them.
pub fn find_breakevens(curve: &[PayoffPoint]) -> Breakevens {
    curve
        .windows(2)
        .filter_map(|w| {
            let (prev, curr) = (w[0], w[1]);
            let crosses = (prev.profit <= 0.0 && curr.profit > 0.0)
                || (prev.profit > 0.0 && curr.profit <= 0.0);
            if !crosses {
                return None;
            }
            let ratio = prev.profit.abs() / (prev.profit.abs() + curr.profit.abs());
            Some(round_to(prev.price + ratio * (curr.price - prev.price), 2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionKind;
    use crate::risk::payoff::{payoff_curve, PriceRange};
    use crate::strategy::contract::fixtures::leg;
    use crate::strategy::Position;

    fn range() -> PriceRange {
        PriceRange { min: 70.0, max: 130.0, steps: 100 }
    }

    #[test]
    fn test_long_call_single_breakeven() {
        let curve = payoff_curve(&[leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1)], &range()).unwrap();
        let be = find_breakevens(&curve);
        assert_eq!(be.len(), 1, "{be:?}");
        assert!((be[0] - 105.0).abs() <= 0.5, "{be:?}");
    }

    #[test]
    fn test_straddle_two_breakevens() {
        let legs = [
            leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1),
            leg(OptionKind::Put, Position::Long, 100.0, 5.0, 1),
        ];
        let curve = payoff_curve(&legs, &range()).unwrap();
        let be = find_breakevens(&curve);
        let tol = 0.005 * range().width();
        assert_eq!(be.len(), 2, "{be:?}");
        assert!((be[0] - 90.0).abs() <= tol, "{be:?}");
        assert!((be[1] - 110.0).abs() <= tol, "{be:?}");
        assert!(be[0] < be[1]);
    }

    #[test]
    fn test_iron_condor_breakevens() {
        // Profit zone 91..109: credit 4, wings 5 wide.
        let legs = [
            leg(OptionKind::Put, Position::Long, 90.0, 1.0, 1),
            leg(OptionKind::Put, Position::Short, 95.0, 3.0, 1),
            leg(OptionKind::Call, Position::Short, 105.0, 3.0, 1),
            leg(OptionKind::Call, Position::Long, 110.0, 1.0, 1),
        ];
        let curve = payoff_curve(&legs, &range()).unwrap();
        let be = find_breakevens(&curve);
        assert_eq!(be.len(), 2, "{be:?}");
        assert!((be[0] - 91.0).abs() <= 0.5 && (be[1] - 109.0).abs() <= 0.5, "{be:?}");
    }

    #[test]
    fn test_collapses_crossings_inside_one_interval() {
        // Profit dips below zero and back between two samples: invisible.
        let curve = [
            PayoffPoint { price: 0.0, profit: 10.0 },
            PayoffPoint { price: 1.0, profit: 10.0 },
        ];
        assert!(find_breakevens(&curve).is_empty());
    }

    #[test]
    fn test_touching_zero_counts_once() {
        let curve = [
            PayoffPoint { price: 1.0, profit: -10.0 },
            PayoffPoint { price: 2.0, profit: 0.0 },
            PayoffPoint { price: 3.0, profit: 10.0 },
        ];
        let be = find_breakevens(&curve);
        assert_eq!(be.as_slice(), &[2.0]);
    }

    #[test]
    fn test_never_profitable() {
        let curve = payoff_curve(&[leg(OptionKind::Call, Position::Long, 200.0, 5.0, 1)], &range()).unwrap();
        assert!(find_breakevens(&curve).is_empty());
    }
}
