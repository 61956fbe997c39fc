//! Toy in-memory portfolio simulator.
//!
//! Operations are free functions over `&mut Holdings` so the caller (the
//! interactive session) owns the state for its whole lifetime.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::market_data::MarketDataGateway;
use crate::{CoreError, Symbol, ValidationError};

/// Symbol → shares held. Every stored quantity is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holdings(BTreeMap<Symbol, u64>);

impl Holdings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, symbol: &Symbol) -> Option<u64> {
        self.0.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Symbol, u64> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Holdings {
    type Item = (&'a Symbol, &'a u64);
    type IntoIter = btree_map::Iter<'a, Symbol, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Adds shares, returning the new position size.
pub fn buy(holdings: &mut Holdings, symbol: &Symbol, quantity: u64) -> Result<u64, CoreError> {
    if quantity == 0 {
        return Err(ValidationError::ZeroQuantity.into());
    }

    let held = holdings.0.get(symbol).copied().unwrap_or(0);
    let updated = held
        .checked_add(quantity)
        .ok_or(ValidationError::QuantityOverflow)?;
    holdings.0.insert(symbol.clone(), updated);

    tracing::info!(symbol = %symbol, quantity, held = updated, "bought shares");
    Ok(updated)
}

/// Removes shares, returning what is left. A failed sell leaves holdings untouched.
pub fn sell(holdings: &mut Holdings, symbol: &Symbol, quantity: u64) -> Result<u64, CoreError> {
    if quantity == 0 {
        return Err(ValidationError::ZeroQuantity.into());
    }

    let Some(&held) = holdings.0.get(symbol) else {
        return Err(CoreError::UnknownHolding {
            symbol: symbol.as_str().to_owned(),
        });
    };

    if quantity > held {
        return Err(CoreError::InsufficientShares {
            symbol: symbol.as_str().to_owned(),
            held,
            requested: quantity,
        });
    }

    let remaining = held - quantity;
    if remaining == 0 {
        holdings.0.remove(symbol);
    } else {
        holdings.0.insert(symbol.clone(), remaining);
    }

    tracing::info!(symbol = %symbol, quantity, held = remaining, "sold shares");
    Ok(remaining)
}

pub fn clear(holdings: &mut Holdings) {
    if !holdings.is_empty() {
        tracing::info!(positions = holdings.len(), "portfolio cleared");
    }
    holdings.0.clear();
}

/// One priced position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationLine {
    pub symbol: Symbol,
    pub quantity: u64,
    pub price: f64,
    pub market_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub lines: Vec<ValuationLine>,
    pub total: f64,
}

/// Prices every position at its latest close. Any failed lookup fails the
/// whole valuation.
pub async fn value(
    holdings: &Holdings,
    gateway: &dyn MarketDataGateway,
) -> Result<Valuation, CoreError> {
    let mut valuation = Valuation::default();
    for (symbol, &quantity) in holdings {
        let price = gateway.current_price(symbol).await?;
        let market_value = quantity as f64 * price;
        valuation.total += market_value;
        valuation.lines.push(ValuationLine {
            symbol: symbol.clone(),
            quantity,
            price,
            market_value,
        });
    }
    Ok(valuation)
}
