pub mod allocation;
pub mod auth;
pub mod catalog;
pub mod collateral;
pub mod contract;
pub mod dashboard;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod history;
pub mod party;
pub mod reference;
pub mod registry;
pub mod storage;
pub mod types;
pub mod valuation;
pub mod workflow;

// re-export key types
pub use allocation::{AllocationLedger, LedgerEntry, LinkRequest};
pub use auth::{ActingUser, Action, Role};
pub use catalog::{standard_catalog, CollateralType};
pub use collateral::{Collateral, CollateralPatch, DocumentationItem, NewCollateral};
pub use contract::{ContractSyncRecord, LoanContract};
pub use dashboard::{summarize, DashboardStats};
pub use decimal::{Money, Rate};
pub use errors::{RegistryError, Result};
pub use events::{Event, EventStore};
pub use history::{HistoryLog, StatusRecord};
pub use party::{Client, Guarantor, IdentityDocument};
pub use reference::{EntityKind, ReferenceSequencer};
pub use registry::Registry;
pub use storage::{DocumentStore, MemoryStore};
pub use types::{
    ClientId, CollateralId, CollateralStatus, ContractId, GuarantorId, TypeId, UserId,
};
pub use valuation::compute_real_value;
pub use workflow::{can_transition, requires_legal_role, WorkflowFamily};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
