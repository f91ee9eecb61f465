//! The instance space: every instance plus the interference rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tangle_core::{CoreResult, InstanceId, Store};

use crate::instance::Instance;

/// The full collection of instances under one variable alphabet
///
/// Construction invariant, enforced by builders and assumed (not
/// reverified) by the executor: if two instances interfere, at least
/// one of them holds the other in its dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Variable-name universe
    pub alphabet: String,
    /// Instances keyed by id (keys unique, sorted)
    pub insts: BTreeMap<InstanceId, Instance>,
}

impl Space {
    /// Create an empty space over an alphabet
    #[must_use]
    pub fn new(alphabet: &str) -> Self {
        Self {
            alphabet: alphabet.to_string(),
            insts: BTreeMap::new(),
        }
    }

    /// Insert an instance, keyed by its id
    pub fn insert(&mut self, inst: Instance) {
        self.insts.insert(inst.id, inst);
    }

    /// Get an instance by id
    #[must_use]
    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.insts.get(&id)
    }

    /// All ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.insts.keys().copied()
    }

    /// Number of instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Check if the space is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Initial store with every alphabet variable bound to its
    /// 1-based position
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if the alphabet contains an invalid
    /// variable name.
    pub fn initial_store(&self) -> CoreResult<Store> {
        Store::seeded(&self.alphabet)
    }

    /// Interfering pairs with no dependency edge in either direction
    ///
    /// Diagnostic for the construction invariant; empty for any space a
    /// conforming builder produced.
    #[must_use]
    pub fn unlinked_interfering_pairs(&self) -> Vec<(InstanceId, InstanceId)> {
        let mut unlinked = Vec::new();
        for (&a, inst_a) in &self.insts {
            for (&b, inst_b) in self.insts.range(a..).skip(1) {
                if inst_a.interferes_with(inst_b)
                    && !inst_a.deps.contains(&b)
                    && !inst_b.deps.contains(&a)
                {
                    unlinked.push((a, b));
                }
            }
        }
        unlinked
    }
}
