use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::auth::{Action, ActingUser};
use crate::errors::Result;
use crate::registry::Registry;
use crate::types::CollateralStatus;
use crate::workflow::can_transition;

/// read-side snapshot of the registry for reporting; computing it mutates
/// nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// all collateral on the books
    pub total_collateral: usize,
    /// expiration date strictly before the reporting day
    pub expired: usize,
    /// no active ledger entry with a positive utilized amount
    pub unencumbered: usize,
    /// active loans whose granted amount exceeds the sum pledged to them,
    /// including loans with no ledger entry at all
    pub uncovered_loans: usize,
    /// collateral backing more than one active loan
    pub shared_collateral: usize,
    /// count per legal status
    pub per_status: BTreeMap<CollateralStatus, usize>,
    /// items in realization whose workflow allows a release
    pub eligible_for_release: usize,
}

/// aggregate the registry as of the given day
pub fn summarize(registry: &Registry, actor: &ActingUser, today: NaiveDate) -> Result<DashboardStats> {
    actor.authorize(Action::ViewDashboard)?;

    let contract_is_active = |id| {
        registry
            .get_contract(id)
            .map(|c| c.is_active())
            .unwrap_or(false)
    };

    let mut per_status: BTreeMap<CollateralStatus, usize> = BTreeMap::new();
    for status in CollateralStatus::ALL {
        per_status.insert(status, 0);
    }

    let mut total_collateral = 0;
    let mut unencumbered = 0;
    let mut shared_collateral = 0;
    let mut eligible_for_release = 0;

    for item in registry.collaterals() {
        total_collateral += 1;
        *per_status.entry(item.status).or_insert(0) += 1;

        if !registry.ledger().has_active_allocation(item.id, contract_is_active) {
            unencumbered += 1;
        }
        if registry.ledger().active_contract_count(item.id, contract_is_active) > 1 {
            shared_collateral += 1;
        }
        if item.status == CollateralStatus::Realization {
            // evaluated through the state machine, not a stored flag
            let family = registry.workflow_family(item.id)?;
            if can_transition(family, item.status, CollateralStatus::Released) {
                eligible_for_release += 1;
            }
        }
    }

    let uncovered_loans = registry
        .contracts()
        .filter(|c| c.is_active())
        .filter(|c| c.amount_granted > registry.ledger().pledged_to_contract(c.id))
        .count();

    Ok(DashboardStats {
        total_collateral,
        expired: registry.expired_count(today),
        unencumbered,
        uncovered_loans,
        shared_collateral,
        per_status,
        eligible_for_release,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::LinkRequest;
    use crate::auth::{ActingUser, Role};
    use crate::collateral::NewCollateral;
    use crate::contract::{LOAN_STATUS_ACTIVE, LoanContract};
    use crate::decimal::Money;
    use crate::errors::RegistryError;
    use crate::party::{Client, Guarantor};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use uuid::Uuid;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        ))
    }

    fn contract(loan_number: &str, granted: i64) -> LoanContract {
        LoanContract {
            id: Uuid::new_v4(),
            loan_number: loan_number.to_string(),
            amount_granted: Money::from_major(granted),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            maturity_date: None,
            status: LOAN_STATUS_ACTIVE.to_string(),
            client_matricule: "CL-0001".to_string(),
            client_name: None,
            manager_code: None,
            branch_code: None,
            synced_at: None,
        }
    }

    fn mixed_registry() -> Registry {
        let mut registry = Registry::with_standard_catalog();
        let editor = ActingUser::new(Uuid::new_v4(), "editor", [Role::Editor]);
        let legal = ActingUser::new(Uuid::new_v4(), "legal", [Role::Legal]);
        let time = test_time();

        let client = registry
            .add_client(&editor, Client::new("CL-0001", "Ndiaye", "Fatou"))
            .unwrap();
        let guarantor = registry
            .register_guarantor(
                &editor,
                Guarantor::new("Diallo", "Amadou", NaiveDate::from_ymd_opt(1980, 3, 14).unwrap()),
                &time,
            )
            .unwrap();

        let cau_hyp = registry.type_by_code("CAU-HYP").unwrap().id;
        let gar_dep = registry.type_by_code("GAR-DEP").unwrap().id;
        let gar_veh = registry.type_by_code("GAR-VEH").unwrap().id;
        let new = |type_id, declared: i64, expires_on: Option<NaiveDate>| NewCollateral {
            name: "bien affecté".to_string(),
            description: None,
            location: None,
            type_id,
            guarantor_id: guarantor,
            client_id: Some(client),
            declared_value: Money::from_major(declared),
            expires_on,
        };

        // shared: one collateral backing two active loans
        let shared = new(cau_hyp, 10_000_000, None);
        let shared = registry.register_collateral(&editor, shared, &time).unwrap();
        let covered = registry.add_contract(&editor, contract("PRET-001", 3_000_000)).unwrap();
        let partly = registry.add_contract(&editor, contract("PRET-002", 4_000_000)).unwrap();
        registry
            .link_contract(&editor, shared, covered, LinkRequest::Amount(Money::from_major(3_000_000)), &time)
            .unwrap();
        registry
            .link_contract(&editor, shared, partly, LinkRequest::Amount(Money::from_major(1_000_000)), &time)
            .unwrap();

        // expired and unencumbered
        let expired = new(gar_dep, 2_000_000, NaiveDate::from_ymd_opt(2025, 1, 1));
        registry.register_collateral(&editor, expired, &time).unwrap();

        // in realization, release still possible
        let seized = new(gar_veh, 5_000_000, None);
        let seized = registry.register_collateral(&editor, seized, &time).unwrap();
        for target in [CollateralStatus::Contentious, CollateralStatus::Realization] {
            registry
                .change_status(&legal, seized, target, None, vec![], &time)
                .unwrap();
        }

        // active loan with no ledger entry at all
        registry.add_contract(&editor, contract("PRET-003", 5_000_000)).unwrap();

        registry
    }

    #[test]
    fn test_summarize_mixed_portfolio() {
        let registry = mixed_registry();
        let viewer = ActingUser::new(Uuid::new_v4(), "viewer", [Role::Viewer]);
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let stats = summarize(&registry, &viewer, today).unwrap();

        assert_eq!(stats.total_collateral, 3);
        assert_eq!(stats.expired, 1);
        // the deposit and the seized vehicle carry no allocation
        assert_eq!(stats.unencumbered, 2);
        // PRET-002 (pledged 1M of 4M) and the unlinked PRET-003
        assert_eq!(stats.uncovered_loans, 2);
        assert_eq!(stats.shared_collateral, 1);
        assert_eq!(stats.eligible_for_release, 1);
        assert_eq!(stats.per_status[&CollateralStatus::Normal], 2);
        assert_eq!(stats.per_status[&CollateralStatus::Realization], 1);
        assert_eq!(stats.per_status[&CollateralStatus::Sold], 0);
    }

    #[test]
    fn test_summarize_requires_a_role() {
        let registry = mixed_registry();
        let nobody = ActingUser::new(Uuid::new_v4(), "nobody", []);
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let err = summarize(&registry, &nobody, today).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
    }

    #[test]
    fn test_empty_registry_summary() {
        let registry = Registry::new();
        let viewer = ActingUser::new(Uuid::new_v4(), "viewer", [Role::Viewer]);
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let stats = summarize(&registry, &viewer, today).unwrap();
        assert_eq!(stats.total_collateral, 0);
        assert_eq!(stats.uncovered_loans, 0);
        assert!(stats.per_status.values().all(|&n| n == 0));
    }
}
