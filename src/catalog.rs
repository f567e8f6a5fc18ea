use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Rate;
use crate::types::TypeId;

/// a category of collateral defining its discount and weighting rules
///
/// Discount and weighting are stored independently. Several catalog entries
/// deliberately break the `weighting = 100 - discount` relationship (e.g.
/// GAR-CAS carries 0% on both sides), so neither field may be derived from
/// the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralType {
    pub id: TypeId,
    /// unique short code, e.g. "GAR-HYP"
    pub code: String,
    pub label: String,
    /// business category, e.g. "Matérielle (réelle)"
    pub category: String,
    pub description: String,
    pub discount: Rate,
    pub weighting: Rate,
    pub active: bool,
}

impl CollateralType {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        discount: Rate,
        weighting: Rate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            label: label.into(),
            category: category.into(),
            description: description.into(),
            discount,
            weighting,
            active: true,
        }
    }
}

/// the institution's standard collateral grid
pub fn standard_catalog() -> Vec<CollateralType> {
    let pct = Rate::from_percentage;
    vec![
        CollateralType::new(
            "CAU-HYP",
            "Caution Hypothécaire",
            "Matérielle (réelle)",
            "Hypothèque consentie par un tiers sur un bien immobilier lui appartenant",
            pct(30),
            pct(70),
        ),
        CollateralType::new(
            "PAF-HYP",
            "Promesse d'Affectation Hypothécaire",
            "Matérielle (réelle)",
            "Engagement à hypothéquer le titre foncier sur maison, terrain ou immeuble",
            pct(30),
            pct(70),
        ),
        CollateralType::new(
            "GAR-HYP",
            "Hypothèque immobilière",
            "Matérielle (réelle)",
            "Titre foncier sur maison, terrain ou immeuble enregistré",
            pct(20),
            pct(80),
        ),
        CollateralType::new(
            "GAR-CAS",
            "Caution solidaire (personnelle)",
            "Personnelle",
            "Caution d'un tiers, souvent membre de la famille ou du groupe",
            pct(0),
            pct(0),
        ),
        CollateralType::new(
            "GAR-DEP",
            "Dépôt de garantie en numéraire",
            "Financière",
            "Somme bloquée sur un compte interne",
            pct(0),
            pct(100),
        ),
        CollateralType::new(
            "GAR-VEH",
            "Gage de matériel roulant",
            "Matérielle (réelle)",
            "Véhicule personnel, taxi, moto",
            pct(50),
            pct(50),
        ),
        CollateralType::new(
            "GAR-MOB",
            "Gage de matériel mobiliers",
            "Matérielle (réelle)",
            "Mobiliers",
            pct(50),
            pct(50),
        ),
        CollateralType::new(
            "GAR-MPF",
            "Nantissement de matériels professionnels",
            "Matérielle (réelle)",
            "Matériels professionnels",
            pct(0),
            pct(0),
        ),
        CollateralType::new(
            "GAR-DAT",
            "Nantissement (Transfert fiduciaire) DAT",
            "Financière",
            "Dépôt à terme donné en garantie",
            pct(0),
            pct(100),
        ),
        CollateralType::new(
            "GAR-ASS",
            "Assurance-crédit",
            "Garantie dérivée",
            "Couverture assurantielle en cas de perte de capacité",
            // variable case by case; left at zero until reviewed
            pct(0),
            pct(0),
        ),
        CollateralType::new(
            "GAR-FIN",
            "Autre Garantie Financière",
            "Financière",
            "Garantie émise par une autre banque ou institution",
            pct(10),
            pct(90),
        ),
        CollateralType::new(
            "GAR-DIV",
            "Autres garanties diverses",
            "Divers",
            "À usage spécifique, documenté et validé au cas par cas",
            pct(0),
            pct(0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_catalog_codes_unique() {
        let catalog = standard_catalog();
        let mut codes: Vec<_> = catalog.iter().map(|t| t.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), catalog.len());
    }

    #[test]
    fn test_discount_and_weighting_are_independent() {
        let catalog = standard_catalog();
        let cas = catalog.iter().find(|t| t.code == "GAR-CAS").unwrap();
        // both at zero; not complementary, and must stay that way
        assert_eq!(cas.discount.as_percentage(), dec!(0));
        assert_eq!(cas.weighting.as_percentage(), dec!(0));

        let hyp = catalog.iter().find(|t| t.code == "GAR-HYP").unwrap();
        assert_eq!(hyp.weighting, Rate::from_percentage(80));
    }
}
