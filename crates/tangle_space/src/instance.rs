//! Instances: atomic groups of commands with dependency edges.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tangle_core::{CoreResult, InstanceId, OrderKey, Store, Value, Var};

use crate::command::Command;

/// One variable write performed during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Variable written
    pub var: Var,
    /// Value written
    pub value: Value,
}

/// An atomic group of commands with a logical position and dependency edges
///
/// Everything but `deps` is immutable after construction; `deps` is
/// mutated only inside an executor's private working graph, where cycle
/// resolution removes edges (never adds them). Duplicate entries are
/// tolerated and count as separate edge occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Unique identifier, also the order-key tie-breaker
    pub id: InstanceId,
    /// Logical order number (not unique across instances)
    pub seq: u64,
    /// Ids this instance must execute after
    pub deps: Vec<InstanceId>,
    /// Commands, executed in sequence order
    pub cmds: Vec<Command>,
}

impl Instance {
    /// Create an instance with no dependencies
    #[must_use]
    pub fn new(id: InstanceId, seq: u64, cmds: Vec<Command>) -> Self {
        Self {
            id,
            seq,
            deps: Vec::new(),
            cmds,
        }
    }

    /// Set the dependency list
    #[must_use]
    pub fn with_deps(mut self, deps: Vec<InstanceId>) -> Self {
        self.deps = deps;
        self
    }

    /// The `(seq, id)` order key, reconstructed from the current fields
    ///
    /// Never cached: dependency removal does not change it, and a fresh
    /// key is what every tie-break must compare.
    #[must_use]
    pub fn order_key(&self) -> OrderKey {
        OrderKey::new(self.seq, self.id)
    }

    /// Union of the commands' touched-variable sets
    ///
    /// Used for diagnostics and graph labels only; the ordering
    /// algorithm never reads it.
    #[must_use]
    pub fn touched_vars(&self) -> BTreeSet<Var> {
        let mut out = BTreeSet::new();
        for cmd in &self.cmds {
            out.extend(cmd.touched_vars().iter().copied());
        }
        out
    }

    /// Sorted variables touched by both this instance and `other`
    #[must_use]
    pub fn shared_vars(&self, other: &Instance) -> BTreeSet<Var> {
        self.touched_vars()
            .intersection(&other.touched_vars())
            .copied()
            .collect()
    }

    /// True iff any command of this instance interferes with any
    /// command of `other`
    #[must_use]
    pub fn interferes_with(&self, other: &Instance) -> bool {
        self.cmds
            .iter()
            .any(|a| other.cmds.iter().any(|b| a.interferes_with(b)))
    }

    /// Run every command in sequence order against the store
    ///
    /// Returns the write log in the order the commands mutated the
    /// store. This is the unit of atomic work; the executor never
    /// splits it.
    ///
    /// # Errors
    ///
    /// Propagates `UndefinedVariable` from command evaluation.
    pub fn execute_all(&self, store: &mut Store) -> CoreResult<Vec<Effect>> {
        let mut effects = Vec::with_capacity(self.cmds.len());
        for cmd in &self.cmds {
            let value = cmd.evaluate(store)?;
            effects.push(Effect {
                var: cmd.assignee(),
                value,
            });
        }
        Ok(effects)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{},", self.id, self.seq)?;
        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cmd)?;
        }
        write!(f, ",[")?;
        for (i, dep) in self.deps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dep)?;
        }
        write!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(c: char) -> Var {
        Var::new(c).unwrap()
    }

    fn inst(id: u64, seq: u64, statements: &[&str]) -> Instance {
        let cmds = statements
            .iter()
            .map(|s| Command::parse(s).unwrap())
            .collect();
        Instance::new(InstanceId::new(id), seq, cmds)
    }

    #[test]
    fn test_order_key() {
        let i = inst(3, 7, &["x=1"]);
        assert_eq!(i.order_key(), OrderKey::new(7, InstanceId::new(3)));
    }

    #[test]
    fn test_touched_vars_union() {
        let i = inst(0, 0, &["x=y+2", "y=4"]);
        let expected: BTreeSet<Var> = [var('x'), var('y')].into_iter().collect();
        assert_eq!(i.touched_vars(), expected);
    }

    #[test]
    fn test_interference() {
        let a = inst(0, 0, &["x=y+2", "y=4"]);
        assert!(a.interferes_with(&inst(1, 0, &["x=2", "y=4"])));
        assert!(!a.interferes_with(&inst(2, 0, &["z=2", "w=4"])));
    }

    #[test]
    fn test_shared_vars() {
        let a = inst(0, 0, &["x=y+2"]);
        let b = inst(1, 2, &["x=z+2"]);
        let expected: BTreeSet<Var> = [var('x')].into_iter().collect();
        assert_eq!(a.shared_vars(&b), expected);
    }

    #[test]
    fn test_execute_all_logs_writes_in_order() {
        let mut store = Store::new();
        store.set(var('x'), 1);
        store.set(var('y'), 3);

        let i = inst(0, 0, &["x=y+2", "y=4"]);
        let effects = i.execute_all(&mut store).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect {
                    var: var('x'),
                    value: 5
                },
                Effect {
                    var: var('y'),
                    value: 4
                },
            ]
        );
        assert_eq!(store.get(var('x')), Some(5));
        assert_eq!(store.get(var('y')), Some(4));
    }

    #[test]
    fn test_execute_all_propagates_undefined() {
        let mut store = Store::new();
        let i = inst(0, 0, &["x=y+2"]);
        assert!(i.execute_all(&mut store).is_err());
    }

    #[test]
    fn test_display() {
        let i = inst(0, 5, &["x=y+2", "y=4"]);
        assert_eq!(format!("{}", i), "{0,5,x=y+2,y=4,[]}");

        let i = inst(1, 2, &["x=y+2"]).with_deps(vec![InstanceId::new(3), InstanceId::new(4)]);
        assert_eq!(format!("{}", i), "{1,2,x=y+2,[3, 4]}");
    }

    #[test]
    fn test_serde_roundtrip() {
        let i = inst(1, 2, &["x=y+2", "y=4"]).with_deps(vec![InstanceId::new(3)]);
        let json = serde_json::to_string(&i).unwrap();
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, i);
    }
}
