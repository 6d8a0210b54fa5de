pub mod breakeven;
pub mod kelly;
pub mod limits;
pub mod metrics;
pub mod payoff;
pub mod portfolio;
pub mod sizing;

use crate::models::round_to;
use serde::{Deserialize, Serialize};

/// A quotient whose denominator may be zero.
///
/// `Unbounded` replaces an IEEE infinity so nothing downstream can do
/// arithmetic on it by accident; display code renders it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    Unbounded,
}

impl Ratio {
    /// `numerator / denominator`, or `Unbounded` when the denominator is zero.
    #[inline]
    pub fn checked(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::Unbounded
        } else {
            Self::Finite(numerator / denominator)
        }
    }

    #[inline]
    pub fn abs(self) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(v.abs()),
            Self::Unbounded => Self::Unbounded,
        }
    }

    #[inline]
    pub fn rounded(self, decimals: i32) -> Self {
        match self {
            Self::Finite(v) => Self::Finite(round_to(v, decimals)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    #[inline]
    pub fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded => None,
        }
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// True when the ratio exceeds `threshold`; `Unbounded` exceeds everything.
    #[inline]
    pub fn exceeds(self, threshold: f64) -> bool {
        match self {
            Self::Finite(v) => v > threshold,
            Self::Unbounded => true,
        }
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.2}"),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}
