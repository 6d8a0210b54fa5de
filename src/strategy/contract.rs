use crate::errors::{ensure_non_negative, ensure_positive, EngineError, EngineResult};
use crate::models::{OptionKind, DAYS_PER_YEAR};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shares controlled by one listed contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Long,
    Short,
}

impl Position {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// One leg of a strategy. Premium is per share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub strike: f64,
    pub premium: f64,
    pub quantity: u32,
    pub position: Position,
    pub expiration: NaiveDate,
    #[serde(default)]
    pub underlying: String,
}

impl Contract {
    pub fn validate(&self) -> EngineResult<()> {
        ensure_positive("strike", self.strike)?;
        ensure_non_negative("premium", self.premium)?;
        if self.quantity == 0 {
            return Err(EngineError::InvalidInput(format!(
                "contract {}: quantity must be >= 1",
                self.id
            )));
        }
        Ok(())
    }

    /// +quantity when long, -quantity when short. Every consumer that weights
    /// a contract (Greeks, payoff, tail exposure) goes through here.
    #[inline]
    pub fn signed_weight(&self) -> f64 {
        self.position.sign() * self.quantity as f64
    }

    #[inline]
    pub fn intrinsic_at(&self, price: f64) -> f64 {
        self.kind.intrinsic(price, self.strike)
    }

    /// Profit in currency at expiration if the underlying settles at `price`,
    /// net of the premium paid or received.
    #[inline]
    pub fn payoff_at(&self, price: f64) -> f64 {
        self.signed_weight() * (self.intrinsic_at(price) - self.premium) * CONTRACT_MULTIPLIER
    }

    /// Premium paid (positive) or received (negative) to open the leg, in currency.
    #[inline]
    pub fn net_debit(&self) -> f64 {
        self.signed_weight() * self.premium * CONTRACT_MULTIPLIER
    }

    /// Calendar days from `valuation` to expiration, floored at zero.
    pub fn days_to_expiration(&self, valuation: NaiveDate) -> f64 {
        (self.expiration - valuation).num_days().max(0) as f64
    }

    #[inline]
    pub fn years_to_expiration(&self, valuation: NaiveDate) -> f64 {
        self.days_to_expiration(valuation) / DAYS_PER_YEAR
    }
}
