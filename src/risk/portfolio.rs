use crate::errors::EngineResult;
use crate::models::black_scholes::GREEKS_DECIMALS;
use crate::models::{Greeks, MarketParameters, PricingModel};
use crate::strategy::Contract;
use serde::Serialize;

/// Greeks of one leg, already multiplied by its signed weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegGreeks {
    pub contract_id: String,
    /// Per-share theoretical value of one unit.
    pub theoretical_price: f64,
    pub greeks: Greeks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioGreeks {
    pub legs: Vec<LegGreeks>,
    pub total: Greeks,
}

/// Sum signed, quantity-weighted per-contract Greeks.
///
/// Legs are priced independently under the shared market parameters; no
/// cross-leg terms. Any invalid leg fails the whole aggregation.
pub fn aggregate_greeks<M: PricingModel + ?Sized>(
    model: &M,
    contracts: &[Contract],
    market: &MarketParameters,
) -> EngineResult<PortfolioGreeks> {
    market.validate()?;

    let mut legs = Vec::with_capacity(contracts.len());
    let mut total = Greeks::default();

    for contract in contracts {
        contract.validate()?;
        let params = market.params_for(contract.strike)?;
        let valuation = model.value(contract.kind, &params);
        let weighted = valuation.greeks.scaled(contract.signed_weight());

        total += weighted;
        legs.push(LegGreeks {
            contract_id: contract.id.clone(),
            theoretical_price: valuation.price,
            greeks: weighted,
        });
    }

    Ok(PortfolioGreeks {
        legs,
        total: total.rounded(GREEKS_DECIMALS),
    })
}
