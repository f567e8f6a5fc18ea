use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CollateralId, CollateralStatus, UserId};

/// immutable record of one successful status transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub collateral_id: CollateralId,
    pub previous: CollateralStatus,
    pub next: CollateralStatus,
    pub acting_user: UserId,
    pub comment: Option<String>,
    /// stored paths of the justification documents backing the transition
    pub justification_documents: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// append-only audit trail; entries are never rewritten or removed
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HistoryLog {
    records: Vec<StatusRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: StatusRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    /// chronological trail for a single collateral
    pub fn for_collateral(&self, id: CollateralId) -> impl Iterator<Item = &StatusRecord> {
        self.records.iter().filter(move |r| r.collateral_id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_trail_is_per_collateral() {
        let mut log = HistoryLog::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let user = Uuid::new_v4();

        for (id, prev, next) in [
            (a, CollateralStatus::Normal, CollateralStatus::Contentious),
            (b, CollateralStatus::Normal, CollateralStatus::InLieuOfPayment),
            (a, CollateralStatus::Contentious, CollateralStatus::Realization),
        ] {
            log.append(StatusRecord {
                collateral_id: id,
                previous: prev,
                next,
                acting_user: user,
                comment: None,
                justification_documents: Vec::new(),
                timestamp: Utc::now(),
            });
        }

        let trail: Vec<_> = log.for_collateral(a).collect();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].next, CollateralStatus::Contentious);
        assert_eq!(trail[1].next, CollateralStatus::Realization);
        assert_eq!(log.len(), 3);
    }
}
