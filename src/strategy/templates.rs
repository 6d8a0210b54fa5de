use crate::errors::EngineResult;
use crate::models::OptionKind;
use crate::strategy::book::StrategyBook;
use crate::strategy::contract::{Contract, Position};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateLeg {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub strike: f64,
    pub premium: f64,
    pub quantity: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StrategyTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub legs: &'static [TemplateLeg],
}

impl StrategyTemplate {
    /// Materialize the template as a book on `underlying`, every leg expiring
    /// on `expiration`. Legs get fresh ids.
    pub fn instantiate(&self, underlying: &str, expiration: NaiveDate) -> EngineResult<StrategyBook> {
        let contracts = self.legs.iter().map(|leg| Contract {
            id: String::new(),
            kind: leg.kind,
            strike: leg.strike,
            premium: leg.premium,
            quantity: leg.quantity,
            position: leg.position,
            expiration,
            underlying: underlying.to_uppercase(),
        });
        Ok(StrategyBook::from_contracts(self.name, contracts)?.with_description(self.description))
    }
}

const fn leg(kind: OptionKind, position: Position, strike: f64, premium: f64) -> TemplateLeg {
    TemplateLeg { kind, strike, premium, quantity: 1, position }
}

use OptionKind::{Call, Put};
use Position::{Long, Short};

pub static TEMPLATES: &[StrategyTemplate] = &[
    StrategyTemplate {
        id: "long-call",
        name: "Long Call",
        description: "Bullish strategy with unlimited upside potential",
        category: "Basic",
        legs: &[leg(Call, Long, 100.0, 5.0)],
    },
    StrategyTemplate {
        id: "long-put",
        name: "Long Put",
        description: "Bearish strategy with high profit potential",
        category: "Basic",
        legs: &[leg(Put, Long, 100.0, 5.0)],
    },
    StrategyTemplate {
        id: "covered-call",
        name: "Covered Call",
        description: "Income strategy for stock owners",
        category: "Income",
        legs: &[leg(Call, Short, 105.0, 3.0)],
    },
    StrategyTemplate {
        id: "protective-put",
        name: "Protective Put",
        description: "Insurance for stock positions",
        category: "Hedging",
        legs: &[leg(Put, Long, 95.0, 4.0)],
    },
    StrategyTemplate {
        id: "bull-call-spread",
        name: "Bull Call Spread",
        description: "Limited risk, limited reward bullish strategy",
        category: "Spreads",
        legs: &[leg(Call, Long, 100.0, 5.0), leg(Call, Short, 110.0, 2.0)],
    },
    StrategyTemplate {
        id: "bear-put-spread",
        name: "Bear Put Spread",
        description: "Limited risk, limited reward bearish strategy",
        category: "Spreads",
        legs: &[leg(Put, Long, 100.0, 5.0), leg(Put, Short, 90.0, 2.0)],
    },
    StrategyTemplate {
        id: "long-straddle",
        name: "Long Straddle",
        description: "Profit from high volatility in either direction",
        category: "Volatility",
        legs: &[leg(Call, Long, 100.0, 5.0), leg(Put, Long, 100.0, 5.0)],
    },
    StrategyTemplate {
        id: "long-strangle",
        name: "Long Strangle",
        description: "Lower cost volatility play with wider breakevens",
        category: "Volatility",
        legs: &[leg(Call, Long, 105.0, 3.0), leg(Put, Long, 95.0, 3.0)],
    },
    StrategyTemplate {
        id: "iron-condor",
        name: "Iron Condor",
        description: "Profit from low volatility with defined risk",
        category: "Advanced",
        legs: &[
            leg(Put, Long, 90.0, 1.0),
            leg(Put, Short, 95.0, 3.0),
            leg(Call, Short, 105.0, 3.0),
            leg(Call, Long, 110.0, 1.0),
        ],
    },
];

pub fn find(id: &str) -> Option<&'static StrategyTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_well_formed() {
        let expiry = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        for t in TEMPLATES {
            let book = t.instantiate("aapl", expiry).unwrap();
            assert_eq!(book.len(), t.legs.len(), "{}", t.id);
            assert!(book.contracts().iter().all(|c| c.underlying == "AAPL"));
            assert!(book.validate().is_ok(), "{}", t.id);
        }
    }

    #[test]
    fn test_find() {
        let condor = find("iron-condor").unwrap();
        assert_eq!(condor.legs.len(), 4);
        assert!(find("butterfly").is_none());
    }

    #[test]
    fn test_instances_get_distinct_ids() {
        let expiry = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let a = find("long-straddle").unwrap().instantiate("SPY", expiry).unwrap();
        let b = find("long-straddle").unwrap().instantiate("SPY", expiry).unwrap();
        assert_ne!(a.contracts()[0].id, b.contracts()[0].id);
        assert_ne!(a.contracts()[0].id, a.contracts()[1].id);
    }
}
