use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a collateral item
pub type CollateralId = Uuid;

/// unique identifier for a collateral type
pub type TypeId = Uuid;

/// unique identifier for a guarantor
pub type GuarantorId = Uuid;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for a loan contract
pub type ContractId = Uuid;

/// unique identifier for an acting user
pub type UserId = Uuid;

/// legal status of a collateral item
///
/// Serialized names follow the persisted vocabulary of the registry so
/// snapshots stay readable against historical data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollateralStatus {
    /// healthy collateral backing a performing loan
    #[serde(rename = "normal")]
    Normal,
    /// litigation opened against the pledge
    #[serde(rename = "contentieux")]
    Contentious,
    /// forced realization of the asset in progress
    #[serde(rename = "realisation")]
    Realization,
    /// ownership transferred to a third party
    #[serde(rename = "mutation_tiers")]
    TransferredToThirdParty,
    /// ownership transferred to the institution's own name
    #[serde(rename = "mutation_cofina")]
    TransferredToInstitution,
    /// asset sold after transfer to the institution
    #[serde(rename = "vendu")]
    Sold,
    /// lien released, collateral handed back
    #[serde(rename = "main_leve")]
    Released,
    /// asset handed over in lieu of repayment (dation en paiement)
    #[serde(rename = "dation")]
    InLieuOfPayment,
}

impl CollateralStatus {
    /// persisted wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            CollateralStatus::Normal => "normal",
            CollateralStatus::Contentious => "contentieux",
            CollateralStatus::Realization => "realisation",
            CollateralStatus::TransferredToThirdParty => "mutation_tiers",
            CollateralStatus::TransferredToInstitution => "mutation_cofina",
            CollateralStatus::Sold => "vendu",
            CollateralStatus::Released => "main_leve",
            CollateralStatus::InLieuOfPayment => "dation",
        }
    }

    /// statuses that close out the collateral for good; a guarantor whose
    /// items are all settled may be registered again under the same identity
    pub fn is_settled(&self) -> bool {
        matches!(self, CollateralStatus::Sold | CollateralStatus::Released)
    }

    /// every status in workflow order, for per-status reporting
    pub const ALL: [CollateralStatus; 8] = [
        CollateralStatus::Normal,
        CollateralStatus::Contentious,
        CollateralStatus::Realization,
        CollateralStatus::TransferredToThirdParty,
        CollateralStatus::TransferredToInstitution,
        CollateralStatus::Sold,
        CollateralStatus::Released,
        CollateralStatus::InLieuOfPayment,
    ];
}

impl fmt::Display for CollateralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for status in CollateralStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: CollateralStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_settled_statuses() {
        assert!(CollateralStatus::Sold.is_settled());
        assert!(CollateralStatus::Released.is_settled());
        assert!(!CollateralStatus::TransferredToThirdParty.is_settled());
        assert!(!CollateralStatus::Normal.is_settled());
    }
}
