use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// entity kinds carrying human-readable yearly references
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// collateral references, e.g. GAR-2025-000042
    Collateral,
    /// staff matricules, e.g. M-2025-0001
    StaffProfile,
}

impl EntityKind {
    fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Collateral => "GAR",
            EntityKind::StaffProfile => "M",
        }
    }

    fn width(&self) -> usize {
        match self {
            EntityKind::Collateral => 6,
            EntityKind::StaffProfile => 4,
        }
    }
}

/// monotonic reference allocator, scoped per entity kind and year
///
/// The sequencer is the serialization point for reference numbering: callers
/// draw the next value from an in-process counter instead of re-scanning
/// persisted references on every creation, so two creations in the same
/// registry can never mint the same suffix. Counters are seeded from the
/// highest existing reference when a registry is loaded.
///
/// Counters nest kind then year so the whole structure survives a JSON
/// snapshot; both key levels serialize as plain strings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferenceSequencer {
    counters: BTreeMap<EntityKind, BTreeMap<i32, u32>>,
}

impl ReferenceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// allocate the next reference for the kind and year
    pub fn generate(&mut self, kind: EntityKind, year: i32) -> String {
        let counter = self
            .counters
            .entry(kind)
            .or_default()
            .entry(year)
            .or_insert(0);
        *counter += 1;
        format!(
            "{}-{}-{:0width$}",
            kind.prefix(),
            year,
            counter,
            width = kind.width()
        )
    }

    /// raise the counter so the next allocation follows an existing reference
    ///
    /// Used when hydrating a registry from persisted state: feed every stored
    /// reference through here and numbering resumes after the highest one.
    pub fn seed_from(&mut self, kind: EntityKind, reference: &str) {
        if let Some(seq) = Self::parse_suffix(kind, reference) {
            let year = Self::parse_year(reference).unwrap_or(0);
            let counter = self
                .counters
                .entry(kind)
                .or_default()
                .entry(year)
                .or_insert(0);
            if seq > *counter {
                *counter = seq;
            }
        }
    }

    fn parse_year(reference: &str) -> Option<i32> {
        reference.split('-').nth(1)?.parse().ok()
    }

    fn parse_suffix(kind: EntityKind, reference: &str) -> Option<u32> {
        let mut parts = reference.split('-');
        if parts.next()? != kind.prefix() {
            return None;
        }
        parts.next()?; // year
        parts.next()?.parse().ok()
    }
}
