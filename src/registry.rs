use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::allocation::{AllocationLedger, LedgerEntry, LinkRequest};
use crate::auth::{Action, ActingUser};
use crate::catalog::{standard_catalog, CollateralType};
use crate::collateral::{Collateral, CollateralPatch, NewCollateral};
use crate::contract::{ContractSyncRecord, LoanContract};
use crate::decimal::{Money, Rate};
use crate::errors::{RegistryError, Result};
use crate::events::{Event, EventStore};
use crate::history::{HistoryLog, StatusRecord};
use crate::party::{Client, Guarantor};
use crate::reference::{EntityKind, ReferenceSequencer};
use crate::types::{
    ClientId, CollateralId, CollateralStatus, ContractId, GuarantorId, TypeId,
};
use crate::valuation::compute_real_value;
use crate::workflow::{can_transition, requires_legal_role, WorkflowFamily};

/// the single coordination point for all collateral state
///
/// Every mutating operation validates completely before touching any map, so
/// a returned error always leaves the registry exactly as it was. That is
/// the in-process equivalent of the database transaction each multi-step
/// mutation runs in when a durable store backs the registry.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    types: BTreeMap<TypeId, CollateralType>,
    guarantors: BTreeMap<GuarantorId, Guarantor>,
    clients: BTreeMap<ClientId, Client>,
    contracts: BTreeMap<ContractId, LoanContract>,
    collaterals: BTreeMap<CollateralId, Collateral>,
    ledger: AllocationLedger,
    history: HistoryLog,
    sequencer: ReferenceSequencer,
    #[serde(skip)]
    events: EventStore,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// fresh registry pre-loaded with the institution's standard type grid
    pub fn with_standard_catalog() -> Self {
        let mut registry = Self::new();
        for t in standard_catalog() {
            registry.types.insert(t.id, t);
        }
        registry
    }

    // ---- catalog ----------------------------------------------------------

    /// both rates of the referential are percentages in [0, 100]
    fn check_type_rates(collateral_type: &CollateralType) -> Result<()> {
        for (field, rate) in [
            ("discount", collateral_type.discount),
            ("weighting", collateral_type.weighting),
        ] {
            if rate < Rate::ZERO || rate > Rate::ONE {
                return Err(RegistryError::Validation {
                    field,
                    message: "must be between 0 and 100 percent".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn add_type(&mut self, actor: &ActingUser, collateral_type: CollateralType) -> Result<TypeId> {
        actor.authorize(Action::ManageCatalog)?;
        Self::check_type_rates(&collateral_type)?;
        if self.type_by_code(&collateral_type.code).is_some() {
            return Err(RegistryError::Conflict {
                message: format!("collateral type code already in use: {}", collateral_type.code),
            });
        }
        let id = collateral_type.id;
        debug!(code = %collateral_type.code, "collateral type added");
        self.types.insert(id, collateral_type);
        Ok(id)
    }

    /// administrative correction of a type; referenced collateral keeps its
    /// frozen real value until its own next valuation-affecting update
    pub fn update_type(
        &mut self,
        actor: &ActingUser,
        id: TypeId,
        update: impl FnOnce(&mut CollateralType),
    ) -> Result<()> {
        actor.authorize(Action::ManageCatalog)?;
        let code_before = self.get_type(id)?.code.clone();
        // apply on a copy so a failed check cannot leave a half-updated row
        let mut candidate = self.get_type(id)?.clone();
        update(&mut candidate);
        Self::check_type_rates(&candidate)?;
        if candidate.code != code_before
            && self.types.values().any(|t| t.id != id && t.code == candidate.code)
        {
            return Err(RegistryError::Conflict {
                message: format!("collateral type code already in use: {}", candidate.code),
            });
        }
        self.types.insert(id, candidate);
        Ok(())
    }

    pub fn remove_type(&mut self, actor: &ActingUser, id: TypeId) -> Result<()> {
        actor.authorize(Action::ManageCatalog)?;
        self.get_type(id)?;
        let dependents = self.collaterals.values().filter(|c| c.type_id == id).count();
        if dependents > 0 {
            return Err(RegistryError::DependencyExists {
                entity: "collateral type",
                dependents,
            });
        }
        self.types.remove(&id);
        Ok(())
    }

    pub fn get_type(&self, id: TypeId) -> Result<&CollateralType> {
        self.types.get(&id).ok_or_else(|| RegistryError::NotFound {
            entity: "collateral type",
            id: id.to_string(),
        })
    }

    pub fn type_by_code(&self, code: &str) -> Option<&CollateralType> {
        self.types.values().find(|t| t.code == code)
    }

    pub fn collateral_types(&self) -> impl Iterator<Item = &CollateralType> {
        self.types.values()
    }

    // ---- parties ----------------------------------------------------------

    pub fn add_client(&mut self, actor: &ActingUser, client: Client) -> Result<ClientId> {
        actor.authorize(Action::ManageGuarantor)?;
        if self.clients.values().any(|c| c.matricule == client.matricule) {
            return Err(RegistryError::Conflict {
                message: format!("client matricule already in use: {}", client.matricule),
            });
        }
        let id = client.id;
        self.clients.insert(id, client);
        Ok(id)
    }

    pub fn get_client(&self, id: ClientId) -> Result<&Client> {
        self.clients.get(&id).ok_or_else(|| RegistryError::NotFound {
            entity: "client",
            id: id.to_string(),
        })
    }

    pub fn register_guarantor(&mut self, actor: &ActingUser, guarantor: Guarantor, time: &SafeTimeProvider) -> Result<GuarantorId> {
        actor.authorize(Action::ManageGuarantor)?;
        self.check_guarantor_identity(&guarantor)?;
        let id = guarantor.id;
        info!(guarantor = %guarantor.full_name(), "guarantor registered");
        self.guarantors.insert(id, guarantor);
        self.events.emit(Event::GuarantorRegistered {
            guarantor_id: id,
            timestamp: time.now(),
        });
        Ok(id)
    }

    /// update a guarantor; the duplicate-identity rule is re-checked only
    /// when one of the identity fields actually changes
    pub fn update_guarantor(
        &mut self,
        actor: &ActingUser,
        id: GuarantorId,
        update: impl FnOnce(&mut Guarantor),
    ) -> Result<()> {
        actor.authorize(Action::ManageGuarantor)?;
        let mut candidate = self.get_guarantor(id)?.clone();
        let key_before = (
            candidate.last_name.clone(),
            candidate.first_name.clone(),
            candidate.birth_date,
        );
        update(&mut candidate);
        let identity_changed = (
            candidate.last_name.clone(),
            candidate.first_name.clone(),
            candidate.birth_date,
        ) != key_before;
        if identity_changed {
            self.check_guarantor_identity(&candidate)?;
        }
        self.guarantors.insert(id, candidate);
        Ok(())
    }

    pub fn remove_guarantor(&mut self, actor: &ActingUser, id: GuarantorId) -> Result<()> {
        actor.authorize(Action::ManageGuarantor)?;
        self.get_guarantor(id)?;
        let dependents = self
            .collaterals
            .values()
            .filter(|c| c.guarantor_id == id)
            .count();
        if dependents > 0 {
            return Err(RegistryError::DependencyExists {
                entity: "guarantor",
                dependents,
            });
        }
        self.guarantors.remove(&id);
        Ok(())
    }

    pub fn get_guarantor(&self, id: GuarantorId) -> Result<&Guarantor> {
        self.guarantors.get(&id).ok_or_else(|| RegistryError::NotFound {
            entity: "guarantor",
            id: id.to_string(),
        })
    }

    /// no two guarantors may share (last name, first name, birth date) while
    /// either still backs a collateral that is not settled
    fn check_guarantor_identity(&self, candidate: &Guarantor) -> Result<()> {
        let blocked = self.guarantors.values().any(|existing| {
            existing.same_identity(candidate)
                && self
                    .collaterals
                    .values()
                    .any(|c| c.guarantor_id == existing.id && !c.status.is_settled())
        });
        if blocked {
            return Err(RegistryError::Conflict {
                message: format!(
                    "guarantor identity already in use with live collateral: {}",
                    candidate.full_name()
                ),
            });
        }
        Ok(())
    }

    // ---- loan contracts ---------------------------------------------------

    pub fn add_contract(&mut self, actor: &ActingUser, contract: LoanContract) -> Result<ContractId> {
        actor.authorize(Action::ManageContracts)?;
        if self.contract_by_number(&contract.loan_number).is_some() {
            return Err(RegistryError::Conflict {
                message: format!("loan number already in use: {}", contract.loan_number),
            });
        }
        let id = contract.id;
        self.contracts.insert(id, contract);
        Ok(id)
    }

    /// upsert from the core-banking feed, keyed on the external loan number;
    /// stamps the synchronization timestamp either way
    pub fn sync_contract(
        &mut self,
        actor: &ActingUser,
        record: ContractSyncRecord,
        time: &SafeTimeProvider,
    ) -> Result<ContractId> {
        actor.authorize(Action::SyncContracts)?;
        if record.loan_number.is_empty() {
            return Err(RegistryError::Validation {
                field: "loan_number",
                message: "must not be empty".to_string(),
            });
        }
        let now = time.now();
        let existing = self
            .contracts
            .values()
            .find(|c| c.loan_number == record.loan_number)
            .map(|c| c.id);

        let (id, created) = match existing {
            Some(id) => {
                let contract = self.contracts.get_mut(&id).ok_or(RegistryError::NotFound {
                    entity: "loan contract",
                    id: id.to_string(),
                })?;
                record.clone().apply_to(contract, now);
                (id, false)
            }
            None => {
                let contract = record.clone().into_contract(now);
                let id = contract.id;
                self.contracts.insert(id, contract);
                (id, true)
            }
        };
        debug!(loan_number = %record.loan_number, created, "contract synchronized");
        self.events.emit(Event::ContractSynchronized {
            contract_id: id,
            loan_number: record.loan_number,
            created,
            timestamp: now,
        });
        Ok(id)
    }

    pub fn get_contract(&self, id: ContractId) -> Result<&LoanContract> {
        self.contracts.get(&id).ok_or_else(|| RegistryError::NotFound {
            entity: "loan contract",
            id: id.to_string(),
        })
    }

    pub fn contract_by_number(&self, loan_number: &str) -> Option<&LoanContract> {
        self.contracts.values().find(|c| c.loan_number == loan_number)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &LoanContract> {
        self.contracts.values()
    }

    // ---- collateral -------------------------------------------------------

    pub fn register_collateral(
        &mut self,
        actor: &ActingUser,
        new: NewCollateral,
        time: &SafeTimeProvider,
    ) -> Result<CollateralId> {
        actor.authorize(Action::ManageCollateral)?;
        if new.name.trim().is_empty() {
            return Err(RegistryError::Validation {
                field: "name",
                message: "must not be empty".to_string(),
            });
        }
        if new.declared_value.is_negative() {
            return Err(RegistryError::Validation {
                field: "declared_value",
                message: "must not be negative".to_string(),
            });
        }
        let collateral_type = self.get_type(new.type_id)?;
        if !collateral_type.active {
            return Err(RegistryError::Validation {
                field: "type_id",
                message: format!("collateral type is inactive: {}", collateral_type.code),
            });
        }
        let weighting = collateral_type.weighting;
        let type_code = collateral_type.code.clone();
        self.get_guarantor(new.guarantor_id)?;
        if let Some(client_id) = new.client_id {
            self.get_client(client_id)?;
        }

        let now = time.now();
        let reference = self
            .sequencer
            .generate(EntityKind::Collateral, now.date_naive().year());
        let real_value = compute_real_value(new.declared_value, weighting);

        let collateral = Collateral {
            id: Uuid::new_v4(),
            reference: reference.clone(),
            name: new.name,
            description: new.description,
            location: new.location,
            type_id: new.type_id,
            guarantor_id: new.guarantor_id,
            client_id: new.client_id,
            declared_value: new.declared_value,
            real_value,
            status: CollateralStatus::Normal,
            created_on: now.date_naive(),
            expires_on: new.expires_on,
            modified_by: None,
            modified_at: None,
            documentation: Vec::new(),
        };
        let id = collateral.id;
        info!(%reference, %real_value, "collateral registered");
        self.collaterals.insert(id, collateral);
        self.events.emit(Event::CollateralRegistered {
            collateral_id: id,
            reference,
            declared_value: new.declared_value,
            real_value,
            type_code,
            timestamp: now,
        });
        Ok(id)
    }

    pub fn update_collateral(
        &mut self,
        actor: &ActingUser,
        id: CollateralId,
        patch: CollateralPatch,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        actor.authorize(Action::ManageCollateral)?;
        let mut candidate = self.get_collateral(id)?.clone();

        if let Some(type_id) = patch.type_id {
            self.get_type(type_id)?;
        }
        if let Some(Some(client_id)) = patch.client_id {
            self.get_client(client_id)?;
        }
        if let Some(value) = patch.declared_value {
            if value.is_negative() {
                return Err(RegistryError::Validation {
                    field: "declared_value",
                    message: "must not be negative".to_string(),
                });
            }
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(RegistryError::Validation {
                    field: "name",
                    message: "must not be empty".to_string(),
                });
            }
        }

        let revalue = patch.affects_valuation();
        if let Some(name) = patch.name {
            candidate.name = name;
        }
        if let Some(description) = patch.description {
            candidate.description = description;
        }
        if let Some(location) = patch.location {
            candidate.location = location;
        }
        if let Some(type_id) = patch.type_id {
            candidate.type_id = type_id;
        }
        if let Some(client_id) = patch.client_id {
            candidate.client_id = client_id;
        }
        if let Some(value) = patch.declared_value {
            candidate.declared_value = value;
        }
        if let Some(expires_on) = patch.expires_on {
            candidate.expires_on = expires_on;
        }
        if let Some(documentation) = patch.documentation {
            candidate.documentation = documentation;
        }

        let now = time.now();
        let old_real_value = candidate.real_value;
        if revalue {
            let weighting = self.get_type(candidate.type_id)?.weighting;
            candidate.real_value = compute_real_value(candidate.declared_value, weighting);
        }
        candidate.stamp_modification(actor.id, now);

        let new_real_value = candidate.real_value;
        self.collaterals.insert(id, candidate);
        if revalue && new_real_value != old_real_value {
            debug!(collateral = %id, %old_real_value, %new_real_value, "collateral revalued");
            self.events.emit(Event::CollateralRevalued {
                collateral_id: id,
                old_real_value,
                new_real_value,
                timestamp: now,
            });
        }
        Ok(())
    }

    pub fn remove_collateral(&mut self, actor: &ActingUser, id: CollateralId) -> Result<()> {
        actor.authorize(Action::ManageCollateral)?;
        self.get_collateral(id)?;
        let dependents = self
            .ledger
            .active_contract_count(id, |c| self.contract_is_active(c));
        if dependents > 0 {
            return Err(RegistryError::DependencyExists {
                entity: "collateral",
                dependents,
            });
        }
        self.collaterals.remove(&id);
        Ok(())
    }

    pub fn get_collateral(&self, id: CollateralId) -> Result<&Collateral> {
        self.collaterals.get(&id).ok_or_else(|| RegistryError::NotFound {
            entity: "collateral",
            id: id.to_string(),
        })
    }

    pub fn collaterals(&self) -> impl Iterator<Item = &Collateral> {
        self.collaterals.values()
    }

    // ---- allocation -------------------------------------------------------

    fn contract_is_active(&self, id: ContractId) -> bool {
        self.contracts.get(&id).map(|c| c.is_active()).unwrap_or(false)
    }

    /// sum of utilized amounts over ledger entries backed by active contracts
    pub fn utilized_amount(&self, collateral: CollateralId) -> Result<Money> {
        self.get_collateral(collateral)?;
        Ok(self
            .ledger
            .utilized_amount(collateral, |c| self.contract_is_active(c)))
    }

    /// remaining cover; never negative
    pub fn remaining_amount(&self, collateral: CollateralId) -> Result<Money> {
        let real_value = self.get_collateral(collateral)?.real_value;
        let utilized = self.utilized_amount(collateral)?;
        Ok(crate::allocation::remaining_amount(real_value, utilized))
    }

    /// utilization share of the real value; 0 when the real value is 0
    pub fn utilization_percent(&self, collateral: CollateralId) -> Result<Rate> {
        let real_value = self.get_collateral(collateral)?.real_value;
        let utilized = self.utilized_amount(collateral)?;
        Ok(crate::allocation::utilization_percent(real_value, utilized))
    }

    /// available for a new loan: remaining cover exists and the status still
    /// permits allocation
    pub fn is_available_for_loan(&self, collateral: CollateralId) -> Result<bool> {
        let item = self.get_collateral(collateral)?;
        Ok(self.remaining_amount(collateral)? > Money::ZERO && item.status_allows_allocation())
    }

    /// link a collateral to a loan contract
    ///
    /// Preconditions are checked in a fixed order and the first failure wins;
    /// nothing is written unless all of them pass.
    pub fn link_contract(
        &mut self,
        actor: &ActingUser,
        collateral_id: CollateralId,
        contract_id: ContractId,
        request: LinkRequest,
        time: &SafeTimeProvider,
    ) -> Result<LedgerEntry> {
        actor.authorize(Action::LinkContract)?;
        let collateral = self.get_collateral(collateral_id)?;
        let contract = self.get_contract(contract_id)?;

        // 1. the collateral must carry a client
        let client_id = collateral.client_id.ok_or_else(|| RegistryError::Validation {
            field: "client",
            message: "collateral has no associated client".to_string(),
        })?;
        let client = self.get_client(client_id)?;

        // 2. the loan must belong to that client
        if contract.client_matricule != client.matricule {
            return Err(RegistryError::Validation {
                field: "contract",
                message: format!(
                    "loan contract {} does not belong to client {}",
                    contract.loan_number, client.matricule
                ),
            });
        }

        // 3. the collateral must be available for a new loan
        if !self.is_available_for_loan(collateral_id)? {
            return Err(RegistryError::Validation {
                field: "collateral",
                message: format!(
                    "collateral {} is not available for a new loan",
                    collateral.reference
                ),
            });
        }

        // 4. at most one ledger entry per pair
        if self.ledger.is_linked(collateral_id, contract_id) {
            return Err(RegistryError::Conflict {
                message: format!(
                    "collateral {} is already linked to loan contract {}",
                    collateral.reference, contract.loan_number
                ),
            });
        }

        let real_value = collateral.real_value;
        if let LinkRequest::Percent(percent) = request {
            if percent <= Rate::ZERO || percent > Rate::ONE {
                return Err(RegistryError::Validation {
                    field: "percent",
                    message: "must be above 0 and at most 100".to_string(),
                });
            }
        }
        let (utilized_amount, utilization_percent) = request.resolve(real_value);
        if utilized_amount <= Money::ZERO {
            return Err(RegistryError::Validation {
                field: "amount",
                message: "pledged amount must be positive".to_string(),
            });
        }

        // 5. the pledged amount must fit in the remaining cover
        let remaining = self.remaining_amount(collateral_id)?;
        if utilized_amount > remaining {
            return Err(RegistryError::CapacityExceeded {
                available: remaining,
                requested: utilized_amount,
            });
        }

        // 6. contract-initiated links require the weighted value to cover
        //    the full granted amount, not merely the pledged portion
        if matches!(request, LinkRequest::Percent(_)) && contract.amount_granted > real_value {
            return Err(RegistryError::CapacityExceeded {
                available: real_value,
                requested: contract.amount_granted,
            });
        }

        let now = time.now();
        let entry = LedgerEntry {
            collateral_id,
            contract_id,
            utilization_percent,
            utilized_amount,
            linked_at: now,
        };
        self.ledger.insert(entry.clone());
        info!(
            collateral = %collateral_id,
            contract = %contract_id,
            amount = %utilized_amount,
            "contract linked"
        );
        self.events.emit(Event::ContractLinked {
            collateral_id,
            contract_id,
            utilized_amount,
            utilization_percent,
            remaining_after: self.remaining_amount(collateral_id)?,
            timestamp: now,
        });
        Ok(entry)
    }

    pub fn unlink_contract(
        &mut self,
        actor: &ActingUser,
        collateral_id: CollateralId,
        contract_id: ContractId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        actor.authorize(Action::LinkContract)?;
        self.get_collateral(collateral_id)?;
        self.get_contract(contract_id)?;
        let entry = self
            .ledger
            .remove(collateral_id, contract_id)
            .ok_or_else(|| RegistryError::NotFound {
                entity: "ledger entry",
                id: format!("{collateral_id}/{contract_id}"),
            })?;
        info!(collateral = %collateral_id, contract = %contract_id, "contract unlinked");
        self.events.emit(Event::ContractUnlinked {
            collateral_id,
            contract_id,
            released_amount: entry.utilized_amount,
            timestamp: time.now(),
        });
        Ok(())
    }

    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    // ---- status workflow --------------------------------------------------

    /// workflow family applicable to a collateral, from its type code
    pub fn workflow_family(&self, collateral: CollateralId) -> Result<WorkflowFamily> {
        let item = self.get_collateral(collateral)?;
        let code = self.get_type(item.type_id)?.code.as_str();
        Ok(WorkflowFamily::classify(code))
    }

    /// test a transition without performing it
    pub fn can_change_status(
        &self,
        collateral: CollateralId,
        target: CollateralStatus,
    ) -> Result<bool> {
        let from = self.get_collateral(collateral)?.status;
        Ok(can_transition(self.workflow_family(collateral)?, from, target))
    }

    /// execute a status transition: persist the new status, stamp the
    /// modifying user, and append the audit record as one atomic unit
    pub fn change_status(
        &mut self,
        actor: &ActingUser,
        collateral_id: CollateralId,
        target: CollateralStatus,
        comment: Option<String>,
        justification_documents: Vec<String>,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let from = self.get_collateral(collateral_id)?.status;
        if !self.can_change_status(collateral_id, target)? {
            return Err(RegistryError::InvalidTransition { from, to: target });
        }
        if requires_legal_role(target) {
            actor.authorize(Action::ChangeStatus)?;
        }

        let now = time.now();
        let collateral = self
            .collaterals
            .get_mut(&collateral_id)
            .ok_or(RegistryError::NotFound {
                entity: "collateral",
                id: collateral_id.to_string(),
            })?;
        collateral.status = target;
        collateral.stamp_modification(actor.id, now);
        self.history.append(StatusRecord {
            collateral_id,
            previous: from,
            next: target,
            acting_user: actor.id,
            comment,
            justification_documents,
            timestamp: now,
        });
        info!(collateral = %collateral_id, %from, to = %target, "status changed");
        self.events.emit(Event::StatusChanged {
            collateral_id,
            old_status: from,
            new_status: target,
            acting_user: actor.id,
            timestamp: now,
        });
        Ok(())
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    // ---- events & persistence ---------------------------------------------

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// serialize the whole registry; the pending event buffer is not part of
    /// durable state
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// resume reference numbering after references loaded from elsewhere
    pub fn seed_reference(&mut self, kind: EntityKind, reference: &str) {
        self.sequencer.seed_from(kind, reference);
    }

    /// expiry check helper used by reporting
    pub fn expired_count(&self, today: NaiveDate) -> usize {
        self.collaterals.values().filter(|c| c.is_expired(today)).count()
    }
}
