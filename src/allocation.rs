use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{CollateralId, ContractId};

/// how a link request expresses the pledged portion
///
/// An amount is the collateral-initiated direction; a percentage of the real
/// value is the contract-initiated direction, which additionally requires the
/// collateral's weighted value to cover the full granted amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRequest {
    Amount(Money),
    Percent(Rate),
}

impl LinkRequest {
    /// resolve the request into (utilized amount, utilization percent)
    /// against the collateral's real value; percent is 0 when the real value
    /// is 0 so the conversion never divides by zero
    pub fn resolve(&self, real_value: Money) -> (Money, Rate) {
        match *self {
            LinkRequest::Amount(amount) => {
                let percent = if real_value.is_zero() {
                    Rate::ZERO
                } else {
                    Rate::from_decimal(amount.as_decimal() / real_value.as_decimal())
                };
                (amount, percent)
            }
            LinkRequest::Percent(percent) => {
                let amount = real_value.percentage(percent.as_percentage());
                (amount, percent)
            }
        }
    }
}

/// one allocation of collateral value to a loan contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub collateral_id: CollateralId,
    pub contract_id: ContractId,
    pub utilization_percent: Rate,
    pub utilized_amount: Money,
    pub linked_at: DateTime<Utc>,
}

/// the many-to-many allocation ledger between collateral and loan contracts
///
/// Pure container: capacity checks live on the registry, which can see both
/// sides of every entry. The ledger only guarantees pair uniqueness.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AllocationLedger {
    entries: Vec<LedgerEntry>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn entry_for(&self, collateral: CollateralId, contract: ContractId) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.collateral_id == collateral && e.contract_id == contract)
    }

    pub fn is_linked(&self, collateral: CollateralId, contract: ContractId) -> bool {
        self.entry_for(collateral, contract).is_some()
    }

    pub fn for_collateral(&self, collateral: CollateralId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.collateral_id == collateral)
    }

    pub fn for_contract(&self, contract: ContractId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.contract_id == contract)
    }

    /// insert an entry; the caller must have verified pair uniqueness
    pub(crate) fn insert(&mut self, entry: LedgerEntry) {
        debug_assert!(!self.is_linked(entry.collateral_id, entry.contract_id));
        self.entries.push(entry);
    }

    /// remove the entry for a pair, returning it if present
    pub(crate) fn remove(
        &mut self,
        collateral: CollateralId,
        contract: ContractId,
    ) -> Option<LedgerEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.collateral_id == collateral && e.contract_id == contract)?;
        Some(self.entries.remove(idx))
    }

    /// whether the collateral has any entry with a positive utilized amount
    /// against a contract the predicate deems active
    pub fn has_active_allocation(
        &self,
        collateral: CollateralId,
        contract_is_active: impl Fn(ContractId) -> bool,
    ) -> bool {
        self.for_collateral(collateral)
            .any(|e| e.utilized_amount > Money::ZERO && contract_is_active(e.contract_id))
    }

    /// total utilized amount on a collateral over active contracts only
    pub fn utilized_amount(
        &self,
        collateral: CollateralId,
        contract_is_active: impl Fn(ContractId) -> bool,
    ) -> Money {
        self.for_collateral(collateral)
            .filter(|e| contract_is_active(e.contract_id))
            .fold(Money::ZERO, |acc, e| acc + e.utilized_amount)
    }

    /// total pledged to a contract across all of its entries, active or not
    pub fn pledged_to_contract(&self, contract: ContractId) -> Money {
        self.for_contract(contract)
            .fold(Money::ZERO, |acc, e| acc + e.utilized_amount)
    }

    /// number of distinct active contracts a collateral backs
    pub fn active_contract_count(
        &self,
        collateral: CollateralId,
        contract_is_active: impl Fn(ContractId) -> bool,
    ) -> usize {
        self.for_collateral(collateral)
            .filter(|e| contract_is_active(e.contract_id))
            .count()
    }
}

/// remaining cover on a collateral; floored at zero even when historical
/// over-allocation pushed utilization past the real value
pub fn remaining_amount(real_value: Money, utilized: Money) -> Money {
    (real_value - utilized).max(Money::ZERO)
}

/// utilization as a share of the real value; 0 when the real value is 0
pub fn utilization_percent(real_value: Money, utilized: Money) -> Rate {
    if real_value.is_zero() {
        Rate::ZERO
    } else {
        Rate::from_decimal(utilized.as_decimal() / real_value.as_decimal())
    }
}
