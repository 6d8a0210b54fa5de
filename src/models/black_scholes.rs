use crate::models::normal::{norm_cdf, norm_pdf};
use crate::models::{Greeks, ModelParams, OptionKind, PricingModel, Valuation, DAYS_PER_YEAR};

/// Decimal places Greeks are reported at.
pub const GREEKS_DECIMALS: i32 = 4;

/// Black-Scholes-Merton closed form for European calls and puts.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T)),  d2 = d1 - sigma * sqrt(T)
///
/// Vega and rho are scaled to a one percentage point move, theta to one
/// calendar day. At expiration the price collapses to intrinsic value and
/// every sensitivity is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholes;

impl PricingModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    #[inline]
    fn value(&self, kind: OptionKind, params: &ModelParams) -> Valuation {
        Valuation {
            price: price(kind, params),
            greeks: greeks(kind, params),
        }
    }
}

/// Theoretical option price. Pure function.
#[inline]
pub fn price(kind: OptionKind, p: &ModelParams) -> f64 {
    if p.is_expired() {
        return kind.intrinsic(p.spot, p.strike);
    }

    let (d1, d2) = p.d1_d2();
    let k_disc = p.strike * p.discount;
    match kind {
        OptionKind::Call => p.spot * norm_cdf(d1) - k_disc * norm_cdf(d2),
        OptionKind::Put => k_disc * norm_cdf(-d2) - p.spot * norm_cdf(-d1),
    }
}

/// Greeks rounded to four decimals. Pure function.
pub fn greeks(kind: OptionKind, p: &ModelParams) -> Greeks {
    if p.is_expired() {
        return Greeks::default();
    }

    let (d1, d2) = p.d1_d2();
    let pdf_d1 = norm_pdf(d1);
    let k_disc = p.strike * p.discount;

    let (delta, rho, carry) = match kind {
        OptionKind::Call => (
            norm_cdf(d1),
            p.strike * p.time_years * p.discount * norm_cdf(d2) / 100.0,
            norm_cdf(d2),
        ),
        OptionKind::Put => (
            norm_cdf(d1) - 1.0,
            -p.strike * p.time_years * p.discount * norm_cdf(-d2) / 100.0,
            norm_cdf(-d2),
        ),
    };

    let gamma = pdf_d1 / (p.spot * p.sigma_sqrt_t);
    let theta = (-p.spot * pdf_d1 * p.sigma / (2.0 * p.sqrt_t) - p.rate * k_disc * carry)
        / DAYS_PER_YEAR;
    let vega = raw_vega(p) / 100.0;

    Greeks { delta, gamma, theta, vega, rho }.rounded(GREEKS_DECIMALS)
}

/// Vega per unit of volatility (not per percentage point), unrounded.
/// This is the derivative the implied-vol iteration divides by.
#[inline]
pub fn raw_vega(p: &ModelParams) -> f64 {
    if p.is_expired() {
        return 0.0;
    }
    let (d1, _) = p.d1_d2();
    p.spot * norm_pdf(d1) * p.sqrt_t
}
