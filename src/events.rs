use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{CollateralId, CollateralStatus, ContractId, GuarantorId, UserId};

/// all events emitted by registry operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // collateral lifecycle
    CollateralRegistered {
        collateral_id: CollateralId,
        reference: String,
        declared_value: Money,
        real_value: Money,
        type_code: String,
        timestamp: DateTime<Utc>,
    },
    CollateralRevalued {
        collateral_id: CollateralId,
        old_real_value: Money,
        new_real_value: Money,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        collateral_id: CollateralId,
        old_status: CollateralStatus,
        new_status: CollateralStatus,
        acting_user: UserId,
        timestamp: DateTime<Utc>,
    },

    // allocation
    ContractLinked {
        collateral_id: CollateralId,
        contract_id: ContractId,
        utilized_amount: Money,
        utilization_percent: Rate,
        remaining_after: Money,
        timestamp: DateTime<Utc>,
    },
    ContractUnlinked {
        collateral_id: CollateralId,
        contract_id: ContractId,
        released_amount: Money,
        timestamp: DateTime<Utc>,
    },

    // parties
    GuarantorRegistered {
        guarantor_id: GuarantorId,
        timestamp: DateTime<Utc>,
    },

    // core-banking feed
    ContractSynchronized {
        contract_id: ContractId,
        loan_number: String,
        created: bool,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
