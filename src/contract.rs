use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::ContractId;

/// loan contract status values used by convention; the field itself stays
/// free text because the core-banking feed owns the vocabulary
pub const LOAN_STATUS_ACTIVE: &str = "active";
pub const LOAN_STATUS_CANCELLED: &str = "cancelled";
pub const LOAN_STATUS_SETTLED: &str = "settled";

/// a loan contract as supplied by the core-banking system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanContract {
    pub id: ContractId,
    /// unique external loan number
    pub loan_number: String,
    pub amount_granted: Money,
    pub effective_date: NaiveDate,
    pub maturity_date: Option<NaiveDate>,
    /// free-text status, conventionally active/cancelled/settled
    pub status: String,
    /// borrower matricule; a soft reference to a client, never a hard link
    pub client_matricule: String,
    pub client_name: Option<String>,
    pub manager_code: Option<String>,
    pub branch_code: Option<String>,
    /// stamped whenever the record was last upserted from the external feed
    pub synced_at: Option<DateTime<Utc>>,
}

impl LoanContract {
    /// only active contracts consume collateral capacity
    pub fn is_active(&self) -> bool {
        self.status == LOAN_STATUS_ACTIVE
    }
}

/// upsert payload from the core-banking feed, keyed on the loan number
///
/// The feed itself is stubbed; this is the surface it will deliver through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSyncRecord {
    pub loan_number: String,
    pub amount_granted: Money,
    pub effective_date: NaiveDate,
    pub maturity_date: Option<NaiveDate>,
    pub status: String,
    pub client_matricule: String,
    pub client_name: Option<String>,
    pub manager_code: Option<String>,
    pub branch_code: Option<String>,
}

impl ContractSyncRecord {
    /// materialize a fresh contract from the feed record
    pub fn into_contract(self, synced_at: DateTime<Utc>) -> LoanContract {
        LoanContract {
            id: Uuid::new_v4(),
            loan_number: self.loan_number,
            amount_granted: self.amount_granted,
            effective_date: self.effective_date,
            maturity_date: self.maturity_date,
            status: self.status,
            client_matricule: self.client_matricule,
            client_name: self.client_name,
            manager_code: self.manager_code,
            branch_code: self.branch_code,
            synced_at: Some(synced_at),
        }
    }

    /// overwrite an existing contract in place, preserving its identity
    pub fn apply_to(self, contract: &mut LoanContract, synced_at: DateTime<Utc>) {
        contract.amount_granted = self.amount_granted;
        contract.effective_date = self.effective_date;
        contract.maturity_date = self.maturity_date;
        contract.status = self.status;
        contract.client_matricule = self.client_matricule;
        contract.client_name = self.client_name;
        contract.manager_code = self.manager_code;
        contract.branch_code = self.branch_code;
        contract.synced_at = Some(synced_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str) -> ContractSyncRecord {
        ContractSyncRecord {
            loan_number: "PRET-0001".to_string(),
            amount_granted: Money::from_major(5_000_000),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            maturity_date: None,
            status: status.to_string(),
            client_matricule: "CL-001".to_string(),
            client_name: None,
            manager_code: None,
            branch_code: None,
        }
    }

    #[test]
    fn test_only_active_counts() {
        let now = Utc::now();
        assert!(record(LOAN_STATUS_ACTIVE).into_contract(now).is_active());
        assert!(!record(LOAN_STATUS_SETTLED).into_contract(now).is_active());
        assert!(!record("anything else").into_contract(now).is_active());
    }

    #[test]
    fn test_apply_preserves_identity_and_stamps_sync() {
        let now = Utc::now();
        let mut contract = record(LOAN_STATUS_ACTIVE).into_contract(now);
        let id = contract.id;

        let later = now + chrono::Duration::hours(6);
        let mut update = record(LOAN_STATUS_SETTLED);
        update.amount_granted = Money::from_major(4_000_000);
        update.apply_to(&mut contract, later);

        assert_eq!(contract.id, id);
        assert_eq!(contract.status, LOAN_STATUS_SETTLED);
        assert_eq!(contract.amount_granted, Money::from_major(4_000_000));
        assert_eq!(contract.synced_at, Some(later));
    }
}
