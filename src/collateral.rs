use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{ClientId, CollateralId, CollateralStatus, GuarantorId, TypeId, UserId};

/// free-form or file-backed evidence attached to a collateral item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationItem {
    pub id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    /// stored path returned by the file storage collaborator, if any
    pub file_path: Option<String>,
    pub added_on: DateTime<Utc>,
}

impl DocumentationItem {
    pub fn new(title: impl Into<String>, added_on: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            notes: None,
            file_path: None,
            added_on,
        }
    }
}

/// an asset pledged against one or more loan contracts
///
/// `real_value` is frozen at write time: it is recomputed and persisted every
/// time the declared value or the collateral type changes, never derived
/// lazily on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collateral {
    pub id: CollateralId,
    /// generated unique reference, e.g. GAR-2025-000042
    pub reference: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub type_id: TypeId,
    pub guarantor_id: GuarantorId,
    pub client_id: Option<ClientId>,
    pub declared_value: Money,
    pub real_value: Money,
    pub status: CollateralStatus,
    pub created_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub modified_by: Option<UserId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub documentation: Vec<DocumentationItem>,
}

impl Collateral {
    /// true once the expiration date has passed
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.map(|d| d < today).unwrap_or(false)
    }

    /// the two statuses from which new allocation is legally permitted
    pub fn status_allows_allocation(&self) -> bool {
        matches!(
            self.status,
            CollateralStatus::Normal | CollateralStatus::InLieuOfPayment
        )
    }

    pub(crate) fn stamp_modification(&mut self, user: UserId, at: DateTime<Utc>) {
        self.modified_by = Some(user);
        self.modified_at = Some(at);
    }
}

/// creation payload for a collateral item
#[derive(Debug, Clone)]
pub struct NewCollateral {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub type_id: TypeId,
    pub guarantor_id: GuarantorId,
    pub client_id: Option<ClientId>,
    pub declared_value: Money,
    pub expires_on: Option<NaiveDate>,
}

/// update payload; absent fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct CollateralPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub type_id: Option<TypeId>,
    pub client_id: Option<Option<ClientId>>,
    pub declared_value: Option<Money>,
    pub expires_on: Option<Option<NaiveDate>>,
    /// when set, replaces the documentation list wholesale (nested
    /// create/replace/delete in one update)
    pub documentation: Option<Vec<DocumentationItem>>,
}

impl CollateralPatch {
    /// true when the patch touches the inputs of the real-value computation
    pub fn affects_valuation(&self) -> bool {
        self.declared_value.is_some() || self.type_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collateral(status: CollateralStatus, expires_on: Option<NaiveDate>) -> Collateral {
        Collateral {
            id: Uuid::new_v4(),
            reference: "GAR-2025-000001".to_string(),
            name: "Titre foncier 1204".to_string(),
            description: None,
            location: None,
            type_id: Uuid::new_v4(),
            guarantor_id: Uuid::new_v4(),
            client_id: None,
            declared_value: Money::from_major(10_000_000),
            real_value: Money::from_major(7_000_000),
            status,
            created_on: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            expires_on,
            modified_by: None,
            modified_at: None,
            documentation: Vec::new(),
        }
    }

    #[test]
    fn test_expiry() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let expired = collateral(
            CollateralStatus::Normal,
            Some(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()),
        );
        assert!(expired.is_expired(today));

        let current = collateral(CollateralStatus::Normal, Some(today));
        assert!(!current.is_expired(today));

        let open_ended = collateral(CollateralStatus::Normal, None);
        assert!(!open_ended.is_expired(today));
    }

    #[test]
    fn test_allocation_statuses() {
        assert!(collateral(CollateralStatus::Normal, None).status_allows_allocation());
        assert!(collateral(CollateralStatus::InLieuOfPayment, None).status_allows_allocation());
        assert!(!collateral(CollateralStatus::Contentious, None).status_allows_allocation());
        assert!(!collateral(CollateralStatus::Released, None).status_allows_allocation());
    }

    #[test]
    fn test_patch_valuation_triggers() {
        assert!(!CollateralPatch::default().affects_valuation());
        let value_change = CollateralPatch {
            declared_value: Some(Money::from_major(1)),
            ..Default::default()
        };
        assert!(value_change.affects_valuation());
        let type_change = CollateralPatch {
            type_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(type_change.affects_valuation());
    }
}
