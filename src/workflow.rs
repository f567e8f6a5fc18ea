use serde::{Deserialize, Serialize};

use crate::types::CollateralStatus;

use CollateralStatus::*;

/// workflow bucket selected by the collateral type's code
///
/// The legal department runs different lifecycles for pledge-style collateral
/// (nantissement, gage) and mortgage-style collateral; every other type
/// follows the mortgage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowFamily {
    Pledge,
    Mortgage,
    General,
}

impl WorkflowFamily {
    /// classify a collateral type code into its workflow family
    pub fn classify(type_code: &str) -> Self {
        let code = type_code.to_lowercase();
        if code.contains("nantissement") || code.contains("gage") {
            WorkflowFamily::Pledge
        } else if code.contains("hypothec") || code.contains("hypothécaire") {
            WorkflowFamily::Mortgage
        } else {
            WorkflowFamily::General
        }
    }

    /// permitted targets from a given status; absent entry means no way out
    pub fn transitions(&self, from: CollateralStatus) -> &'static [CollateralStatus] {
        match self {
            WorkflowFamily::Pledge => match from {
                Normal => &[Contentious],
                Contentious => &[Realization],
                Realization => &[TransferredToThirdParty, TransferredToInstitution, Released],
                TransferredToInstitution => &[Sold],
                // terminal, and dation does not exist for pledges
                TransferredToThirdParty | Sold | Released | InLieuOfPayment => &[],
            },
            WorkflowFamily::Mortgage | WorkflowFamily::General => match from {
                Normal => &[Contentious, InLieuOfPayment],
                Contentious => &[Realization],
                Realization => &[TransferredToThirdParty, TransferredToInstitution, Released],
                TransferredToInstitution => &[Sold],
                InLieuOfPayment => &[Contentious],
                TransferredToThirdParty | Sold | Released => &[],
            },
        }
    }
}

/// test whether the family's table allows `from -> to`
pub fn can_transition(family: WorkflowFamily, from: CollateralStatus, to: CollateralStatus) -> bool {
    family.transitions(from).contains(&to)
}

/// transitions reserved to the legal department (or the technical override)
///
/// Every sensitive target is gated; only reaching dation from normal is open.
pub fn requires_legal_role(target: CollateralStatus) -> bool {
    !matches!(target, InLieuOfPayment | Normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_classification() {
        assert_eq!(WorkflowFamily::classify("nantissement"), WorkflowFamily::Pledge);
        assert_eq!(WorkflowFamily::classify("gage"), WorkflowFamily::Pledge);
        assert_eq!(WorkflowFamily::classify("GAR-HYPOTHECAIRE"), WorkflowFamily::Mortgage);
        assert_eq!(WorkflowFamily::classify("hypothécaire"), WorkflowFamily::Mortgage);
        // short mortgage codes fall through to the general table, which is
        // identical to the mortgage one
        assert_eq!(WorkflowFamily::classify("GAR-HYP"), WorkflowFamily::General);
        assert_eq!(WorkflowFamily::classify("GAR-DEP"), WorkflowFamily::General);
    }

    #[test]
    fn test_pledge_has_no_dation() {
        assert!(!can_transition(WorkflowFamily::Pledge, Normal, InLieuOfPayment));
        assert!(can_transition(WorkflowFamily::Pledge, Normal, Contentious));
        assert!(WorkflowFamily::Pledge.transitions(InLieuOfPayment).is_empty());
    }

    #[test]
    fn test_mortgage_dation_paths() {
        assert!(can_transition(WorkflowFamily::Mortgage, Normal, InLieuOfPayment));
        assert!(can_transition(WorkflowFamily::Mortgage, InLieuOfPayment, Contentious));
        assert!(!can_transition(WorkflowFamily::Mortgage, Normal, Realization));
    }

    #[test]
    fn test_terminal_states() {
        for family in [WorkflowFamily::Pledge, WorkflowFamily::Mortgage, WorkflowFamily::General] {
            for terminal in [TransferredToThirdParty, Sold, Released] {
                assert!(family.transitions(terminal).is_empty(), "{terminal} must be terminal");
            }
            assert!(can_transition(family, TransferredToInstitution, Sold));
        }
    }

    #[test]
    fn test_every_pair_outside_table_is_rejected() {
        for family in [WorkflowFamily::Pledge, WorkflowFamily::Mortgage, WorkflowFamily::General] {
            for from in CollateralStatus::ALL {
                let allowed = family.transitions(from);
                for to in CollateralStatus::ALL {
                    assert_eq!(can_transition(family, from, to), allowed.contains(&to));
                }
            }
        }
    }

    #[test]
    fn test_no_path_back_to_normal() {
        // once a collateral leaves normal there is no workflow route back
        for family in [WorkflowFamily::Pledge, WorkflowFamily::Mortgage, WorkflowFamily::General] {
            for from in CollateralStatus::ALL {
                assert!(!can_transition(family, from, Normal));
            }
        }
    }

    #[test]
    fn test_legal_gate_covers_all_but_dation() {
        assert!(requires_legal_role(Contentious));
        assert!(requires_legal_role(Realization));
        assert!(requires_legal_role(TransferredToThirdParty));
        assert!(requires_legal_role(TransferredToInstitution));
        assert!(requires_legal_role(Released));
        assert!(requires_legal_role(Sold));
        assert!(!requires_legal_role(InLieuOfPayment));
    }
}
