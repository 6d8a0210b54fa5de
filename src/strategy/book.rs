use crate::errors::{EngineError, EngineResult};
use crate::strategy::contract::Contract;
use serde::{Deserialize, Serialize};

/// An immutable snapshot of a strategy's legs.
///
/// Mutations return a new book; the previous snapshot stays valid, so an
/// analysis computed from it never observes a half-applied edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyBook {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    contracts: Vec<Contract>,
}

impl StrategyBook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            contracts: Vec::new(),
        }
    }

    /// Build from a list of legs, validating each and assigning missing ids.
    pub fn from_contracts(
        name: impl Into<String>,
        contracts: impl IntoIterator<Item = Contract>,
    ) -> EngineResult<Self> {
        contracts
            .into_iter()
            .try_fold(Self::new(name), |book, c| book.with_contract(c))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[inline]
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    /// Validate every leg. Books built through the methods below are always
    /// valid; this guards books that arrive deserialized.
    pub fn validate(&self) -> EngineResult<()> {
        for (i, c) in self.contracts.iter().enumerate() {
            c.validate()?;
            if self.contracts[..i].iter().any(|other| other.id == c.id) {
                return Err(EngineError::InvalidInput(format!("duplicate contract id {}", c.id)));
            }
        }
        Ok(())
    }

    /// New book with `contract` appended. An empty id is replaced with a fresh one.
    pub fn with_contract(&self, mut contract: Contract) -> EngineResult<Self> {
        contract.validate()?;
        if contract.id.is_empty() {
            contract.id = uuid::Uuid::new_v4().to_string();
        } else if self.get(&contract.id).is_some() {
            return Err(EngineError::InvalidInput(format!(
                "duplicate contract id {}",
                contract.id
            )));
        }

        let mut next = self.clone();
        next.contracts.push(contract);
        Ok(next)
    }

    /// New book without the leg `id`.
    pub fn without_contract(&self, id: &str) -> EngineResult<Self> {
        if self.get(id).is_none() {
            return Err(EngineError::InvalidInput(format!("no contract with id {id}")));
        }
        let mut next = self.clone();
        next.contracts.retain(|c| c.id != id);
        Ok(next)
    }

    /// New book with leg `id` replaced in place. The replacement keeps `id`.
    pub fn with_replaced(&self, id: &str, mut contract: Contract) -> EngineResult<Self> {
        contract.validate()?;
        let idx = self
            .contracts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EngineError::InvalidInput(format!("no contract with id {id}")))?;

        contract.id = id.to_string();
        let mut next = self.clone();
        next.contracts[idx] = contract;
        Ok(next)
    }

    /// Net premium paid (positive) or received (negative) to open every leg.
    pub fn net_debit(&self) -> f64 {
        self.contracts.iter().map(Contract::net_debit).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionKind;
    use crate::strategy::contract::fixtures::leg;
    use crate::strategy::contract::Position;

    #[test]
    fn test_add_assigns_id_and_keeps_snapshot() {
        let empty = StrategyBook::new("custom");
        let mut c = leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1);
        c.id.clear();

        let one = empty.with_contract(c).unwrap();
        assert!(empty.is_empty(), "original snapshot must not change");
        assert_eq!(one.len(), 1);
        assert!(!one.contracts()[0].id.is_empty());
    }

    #[test]
    fn test_rejects_invalid_and_duplicate() {
        let book = StrategyBook::new("b")
            .with_contract(leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1))
            .unwrap();
        assert!(book.with_contract(leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1)).is_err());
        assert!(book.with_contract(leg(OptionKind::Put, Position::Long, -5.0, 5.0, 1)).is_err());
    }

    #[test]
    fn test_remove_and_replace() {
        let call = leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1);
        let put = leg(OptionKind::Put, Position::Long, 100.0, 5.0, 1);
        let book = StrategyBook::from_contracts("straddle", [call.clone(), put.clone()]).unwrap();

        let removed = book.without_contract(&call.id).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.contracts()[0].id, put.id);
        assert!(book.without_contract("missing").is_err());

        let wider = leg(OptionKind::Put, Position::Short, 90.0, 2.0, 3);
        let replaced = book.with_replaced(&put.id, wider).unwrap();
        assert_eq!(replaced.len(), 2);
        let updated = replaced.get(&put.id).unwrap();
        assert_eq!(updated.strike, 90.0);
        assert_eq!(updated.position, Position::Short);
        assert_eq!(book.get(&put.id).unwrap().strike, 100.0);
    }

    #[test]
    fn test_net_debit() {
        let book = StrategyBook::from_contracts(
            "bull call",
            [
                leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1),
                leg(OptionKind::Call, Position::Short, 110.0, 2.0, 1),
            ],
        )
        .unwrap();
        assert_eq!(book.net_debit(), 300.0);
    }

    #[test]
    fn test_validate_deserialized_duplicates() {
        let c = leg(OptionKind::Call, Position::Long, 100.0, 5.0, 1);
        let json = serde_json::json!({ "name": "dup", "contracts": [c, c] });
        let book: StrategyBook = serde_json::from_value(json).unwrap();
        assert!(book.validate().is_err());
    }
}
