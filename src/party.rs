use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ClientId, GuarantorId};

/// identity document metadata for a guarantor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDocument {
    /// document kind, e.g. "CNI", "passeport"
    pub kind: String,
    pub number: String,
    /// stored path of the scanned document, if uploaded
    pub file_path: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

/// the natural person legally backing a collateral item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guarantor {
    pub id: GuarantorId,
    pub civility: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<String>,
    pub work_address: Option<String>,
    pub phone: Option<String>,
    pub identity_document: Option<IdentityDocument>,
}

impl Guarantor {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            civility: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            birth_date,
            birth_place: None,
            nationality: None,
            occupation: None,
            address: None,
            work_address: None,
            phone: None,
            identity_document: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// the fields the duplicate-identity rule keys on
    pub fn identity_key(&self) -> (&str, &str, NaiveDate) {
        (&self.last_name, &self.first_name, self.birth_date)
    }

    /// true when another guarantor shares the identity key
    pub fn same_identity(&self, other: &Guarantor) -> bool {
        self.id != other.id && self.identity_key() == other.identity_key()
    }
}

/// a borrowing client; the matricule is the soft join key loan contracts
/// carry (no referential integrity is enforced on it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// unique client matricule as known by the core-banking system
    pub matricule: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: Option<String>,
}

impl Client {
    pub fn new(
        matricule: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            matricule: matricule.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            phone: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_matching() {
        let birth = NaiveDate::from_ymd_opt(1980, 3, 14).unwrap();
        let a = Guarantor::new("Diallo", "Amadou", birth);
        let mut b = Guarantor::new("Diallo", "Amadou", birth);
        assert!(a.same_identity(&b));

        b.first_name = "Mamadou".to_string();
        assert!(!a.same_identity(&b));

        // a guarantor never collides with itself
        assert!(!a.same_identity(&a));
    }
}
