use crate::errors::{ensure_finite, ensure_non_negative, EngineError, EngineResult};

/// Recommended number of strategy units for an account-risk budget.
///
/// budget = account_size * risk_percentage / 100
/// size   = max(floor(budget / |max_loss|), 1)
///
/// Returns 0 when `max_loss >= 0` (no downside to size against). Once there is
/// any loss exposure the result is at least one unit, even when the budget
/// does not cover a single unit's worst case. Pure function.
pub fn recommended_size(account_size: f64, risk_percentage: f64, max_loss: f64) -> EngineResult<u32> {
    ensure_non_negative("account size", account_size)?;
    ensure_non_negative("risk percentage", risk_percentage)?;
    ensure_finite("max loss", max_loss)?;
    if risk_percentage > 100.0 {
        return Err(EngineError::InvalidInput(format!(
            "risk percentage must be <= 100, got {risk_percentage}"
        )));
    }

    if max_loss >= 0.0 {
        return Ok(0);
    }

    let budget = risk_budget(account_size, risk_percentage);
    // Saturating cast: absurd budgets clamp to u32::MAX instead of wrapping.
    let raw = (budget / max_loss.abs()).floor() as u32;
    Ok(raw.max(1))
}

/// Currency the account is willing to lose on one strategy.
#[inline]
pub fn risk_budget(account_size: f64, risk_percentage: f64) -> f64 {
    account_size * risk_percentage / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underfunded_budget_still_recommends_one() {
        // budget 200 < one unit's 500 loss: floor is 0, floored up to 1.
        assert_eq!(recommended_size(10_000.0, 2.0, -500.0).unwrap(), 1);
        assert_eq!(risk_budget(10_000.0, 2.0), 200.0);
    }

    #[test]
    fn test_budget_divides_loss() {
        assert_eq!(recommended_size(50_000.0, 5.0, -500.0).unwrap(), 5);
        assert_eq!(recommended_size(50_000.0, 5.0, -600.0).unwrap(), 4);
    }

    #[test]
    fn test_no_downside_means_no_size() {
        assert_eq!(recommended_size(10_000.0, 2.0, 0.0).unwrap(), 0);
        assert_eq!(recommended_size(10_000.0, 2.0, 150.0).unwrap(), 0);
    }

    #[test]
    fn test_zero_budget_with_loss() {
        assert_eq!(recommended_size(0.0, 2.0, -100.0).unwrap(), 1);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(recommended_size(-1.0, 2.0, -100.0).is_err());
        assert!(recommended_size(10_000.0, 150.0, -100.0).is_err());
        assert!(recommended_size(10_000.0, 2.0, f64::NEG_INFINITY).is_err());
    }
}
