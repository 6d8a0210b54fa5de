use statrs::statistics::Statistics;

/// Trading days per year used to annualize daily return volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Fallback volatility (fraction) when history is too short to estimate.
pub const DEFAULT_VOLATILITY: f64 = 0.20;

/// Annualized close-to-close volatility from a chronological price series.
///
/// Uses log returns and the sample standard deviation. Returns a fraction
/// (0.25 = 25%). Needs at least two returns; non-positive or non-finite
/// prices are skipped together with the return that would span them.
pub fn historical_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0 && w[0].is_finite() && w[1].is_finite())
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let daily = returns.iter().std_dev();
    if !daily.is_finite() {
        return None;
    }

    Some(daily * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Historical volatility, or the default when there is not enough data.
#[inline]
pub fn historical_volatility_or_default(closes: &[f64]) -> f64 {
    historical_volatility(closes).unwrap_or(DEFAULT_VOLATILITY)
}
