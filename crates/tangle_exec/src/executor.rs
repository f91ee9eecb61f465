//! Local-min execution of an instance space.
//!
//! A run repeatedly picks an arbitrary unexecuted instance and walks
//! the dependency graph from it, always following the dependency with
//! the smallest `(seq, id)` order key. Instances without dependencies
//! execute immediately; a revisited id on the walking path marks a
//! cycle, which is resolved by severing the minimal outgoing edge of
//! the minimal-order instance on the cyclic segment. That one rule
//! keeps the final store independent of every start choice: severing
//! any other edge would let different walks converge on different
//! orders of interfering instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use tangle_core::{CoreResult, InstanceId, OrderKey, Store};
use tangle_space::{Effect, Instance, Space};

use crate::chooser::StartChooser;

/// A dependency edge removed during cycle resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveredEdge {
    /// Instance whose dependency list lost the edge
    pub from: InstanceId,
    /// The dependency that was dropped
    pub to: InstanceId,
}

/// Everything one run produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRecord {
    /// Total execution order, every instance exactly once
    pub order: Vec<InstanceId>,
    /// Flattened write log across all executed instances
    pub effects: Vec<Effect>,
    /// Cycle-break removals in the order they were performed
    pub severed: Vec<SeveredEdge>,
}

/// Executes every instance of a space exactly once against a store
///
/// Holds a private deep copy of the space taken at construction;
/// instances leave the copy as they execute and only the copy's
/// dependency lists are ever mutated, so repeated runs over the same
/// space never observe each other's edge removals.
pub struct Executor {
    working: BTreeMap<InstanceId, Instance>,
    record: ExecRecord,
}

impl Executor {
    /// Create an executor over a private copy of the space
    #[must_use]
    pub fn new(space: &Space) -> Self {
        Self {
            working: space.insts.clone(),
            record: ExecRecord::default(),
        }
    }

    /// Run to completion, consuming the executor
    ///
    /// The chooser supplies the starting instance of each walk - the
    /// only nondeterminism in a run. The final store is identical for
    /// every chooser given the same space and initial store; the
    /// emitted order may differ.
    ///
    /// # Errors
    ///
    /// Propagates `UndefinedVariable` out of instance execution. The
    /// run raises no other errors: a dependency id absent from the
    /// working graph counts as already satisfied.
    pub fn run(
        mut self,
        store: &mut Store,
        chooser: &mut dyn StartChooser,
    ) -> CoreResult<ExecRecord> {
        while !self.working.is_empty() {
            let candidates: Vec<InstanceId> = self.working.keys().copied().collect();
            let picked = chooser.pick(&candidates);
            // a chooser may hand back an id that already executed
            let start = if self.working.contains_key(&picked) {
                picked
            } else {
                candidates[0]
            };
            trace!(%start, remaining = candidates.len(), "starting walk");
            self.walk(start, store)?;
        }
        info!(
            executed = self.record.order.len(),
            severed = self.record.severed.len(),
            "run complete"
        );
        Ok(self.record)
    }

    /// Walk along minimal dependencies from `start` until the path
    /// drains
    ///
    /// Every id on the path is present in the working graph: executed
    /// instances are popped as they are removed, and cycle resolution
    /// only truncates the path.
    fn walk(&mut self, start: InstanceId, store: &mut Store) -> CoreResult<()> {
        let mut path = vec![start];
        while let Some(&current) = path.last() {
            let Some(dep) = self.min_dep(current) else {
                // sink: no still-present dependency
                self.execute(current, store)?;
                path.pop();
                continue;
            };

            match path.iter().position(|&id| id == dep) {
                // topological descent
                None => path.push(dep),
                Some(entry) => {
                    // Cycle, bounded by dep's first occurrence and the
                    // path tail. Sever the minimal outgoing edge of the
                    // minimal-order instance on the segment, then
                    // resume from that instance.
                    let min = path[entry..]
                        .iter()
                        .enumerate()
                        .filter_map(|(i, id)| {
                            self.working
                                .get(id)
                                .map(|inst| (inst.order_key(), entry + i))
                        })
                        .min();
                    if let Some((_, keep)) = min {
                        self.sever_min_edge(path[keep]);
                        path.truncate(keep + 1);
                    }
                }
            }
        }
        Ok(())
    }

    /// The still-present dependency of `id` with the smallest order key
    ///
    /// Dependency ids absent from the working graph (already executed,
    /// or never part of the space) are skipped as satisfied. Recomputed
    /// fresh on every call; cycle resolution must never reuse a stale
    /// minimum.
    fn min_dep(&self, id: InstanceId) -> Option<InstanceId> {
        let inst = self.working.get(&id)?;
        inst.deps
            .iter()
            .copied()
            .filter_map(|dep| {
                self.working
                    .get(&dep)
                    .map(|target| (target.order_key(), dep))
            })
            .min()
            .map(|(_, dep): (OrderKey, InstanceId)| dep)
    }

    /// Remove the first occurrence of the minimal outgoing edge of `id`
    fn sever_min_edge(&mut self, id: InstanceId) {
        let Some(target) = self.min_dep(id) else {
            return;
        };
        if let Some(inst) = self.working.get_mut(&id) {
            if let Some(pos) = inst.deps.iter().position(|&dep| dep == target) {
                inst.deps.remove(pos);
            }
        }
        debug!(from = %id, to = %target, "severed minimal edge in cycle");
        self.record.severed.push(SeveredEdge { from: id, to: target });
    }

    /// Execute a sink: apply its commands, log it, drop it from the
    /// working graph
    fn execute(&mut self, id: InstanceId, store: &mut Store) -> CoreResult<()> {
        if let Some(inst) = self.working.remove(&id) {
            trace!(%id, "executing");
            let effects = inst.execute_all(store)?;
            self.record.effects.extend(effects);
            self.record.order.push(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::{LowestFirst, Scripted};
    use proptest::prelude::*;
    use tangle_core::Var;
    use tangle_space::Command;

    fn id(raw: u64) -> InstanceId {
        InstanceId::new(raw)
    }

    fn var(c: char) -> Var {
        Var::new(c).unwrap()
    }

    fn inst(raw: u64, seq: u64, statements: &[&str], deps: &[u64]) -> Instance {
        let cmds = statements
            .iter()
            .map(|s| Command::parse(s).unwrap())
            .collect();
        Instance::new(id(raw), seq, cmds)
            .with_deps(deps.iter().copied().map(InstanceId::new).collect())
    }

    /// The two-instance interference scenario: both touch `x`, one
    /// direction recorded.
    fn two_instance_space() -> Space {
        let mut space = Space::new("xyz");
        space.insert(inst(0, 0, &["x=y+2", "y=4"], &[]));
        space.insert(inst(1, 2, &["x=z+2"], &[0]));
        space
    }

    /// A 3-cycle 0→1→2→0 with order keys (0,0) < (1,1) < (2,2).
    fn three_cycle_space() -> Space {
        let mut space = Space::new("x");
        space.insert(inst(0, 0, &["x=x+1"], &[1]));
        space.insert(inst(1, 1, &["x=x*2"], &[2]));
        space.insert(inst(2, 2, &["x=x-3"], &[0]));
        space
    }

    fn run_from(space: &Space, store: &mut Store, starts: &[u64]) -> ExecRecord {
        let mut chooser = Scripted::new(starts.iter().copied().map(InstanceId::new));
        Executor::new(space).run(store, &mut chooser).unwrap()
    }

    #[test]
    fn test_two_instances_same_final_state_from_either_start() {
        let space = two_instance_space();
        let initial = {
            let mut store = Store::new();
            store.set(var('x'), 1);
            store.set(var('y'), 3);
            store.set(var('z'), 5);
            store
        };

        let mut first = initial.clone();
        let record = run_from(&space, &mut first, &[0]);
        assert_eq!(record.order, vec![id(0), id(1)]);
        assert_eq!(first.get(var('y')), Some(4));
        assert_eq!(first.get(var('x')), Some(7));

        let mut second = initial.clone();
        run_from(&space, &mut second, &[1]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_three_cycle_severs_minimal_instances_minimal_edge() {
        let space = three_cycle_space();
        for start in 0..3u64 {
            let mut store = Store::new();
            store.set(var('x'), 1);
            let record = run_from(&space, &mut store, &[start]);

            // only 0→1 is ever severed, from any start
            assert_eq!(
                record.severed,
                vec![SeveredEdge {
                    from: id(0),
                    to: id(1)
                }],
                "start {}",
                start
            );
            assert_eq!(record.order, vec![id(0), id(2), id(1)]);
            assert_eq!(store.get(var('x')), Some(-2));
        }
    }

    #[test]
    fn test_runs_do_not_observe_each_others_removals() {
        let space = three_cycle_space();
        let mut store = Store::new();
        store.set(var('x'), 1);
        run_from(&space, &mut store, &[0]);

        // the canonical space still carries the full cycle
        assert_eq!(space.get(id(0)).unwrap().deps, vec![id(1)]);

        let mut again = Store::new();
        again.set(var('x'), 1);
        let record = run_from(&space, &mut again, &[2]);
        assert_eq!(record.severed.len(), 1);
    }

    #[test]
    fn test_completeness() {
        let space = three_cycle_space();
        let mut store = Store::new();
        store.set(var('x'), 1);
        let record = run_from(&space, &mut store, &[1]);

        let mut seen: Vec<InstanceId> = record.order.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), space.len());
    }

    #[test]
    fn test_unsevered_edges_are_respected() {
        // chain 3 → 2 → 0 plus an independent 1; no cycles
        let mut space = Space::new("xy");
        space.insert(inst(0, 0, &["x=x+1"], &[]));
        space.insert(inst(1, 1, &["y=y+1"], &[]));
        space.insert(inst(2, 2, &["x=x*2"], &[0]));
        space.insert(inst(3, 3, &["x=x-1"], &[2]));

        for start in 0..4u64 {
            let mut store = Store::new();
            store.set(var('x'), 1);
            store.set(var('y'), 1);
            let record = run_from(&space, &mut store, &[start]);

            assert!(record.severed.is_empty());
            let index = |target: u64| {
                record
                    .order
                    .iter()
                    .position(|&i| i == id(target))
                    .unwrap()
            };
            assert!(index(0) < index(2));
            assert!(index(2) < index(3));
            assert_eq!(store.get(var('x')), Some(3));
        }
    }

    #[test]
    fn test_missing_dependency_counts_as_satisfied() {
        let mut space = Space::new("x");
        space.insert(inst(0, 0, &["x=x+1"], &[42]));

        let mut store = Store::new();
        store.set(var('x'), 0);
        let record = run_from(&space, &mut store, &[0]);
        assert_eq!(record.order, vec![id(0)]);
        assert!(record.severed.is_empty());
    }

    #[test]
    fn test_duplicate_edge_severed_one_occurrence_at_a_time() {
        let mut space = Space::new("x");
        space.insert(inst(0, 0, &["x=x+1"], &[1, 1]));
        space.insert(inst(1, 1, &["x=x*2"], &[0]));

        let mut store = Store::new();
        store.set(var('x'), 1);
        let record = run_from(&space, &mut store, &[0]);

        assert_eq!(
            record.severed,
            vec![
                SeveredEdge {
                    from: id(0),
                    to: id(1)
                },
                SeveredEdge {
                    from: id(0),
                    to: id(1)
                },
            ]
        );
        assert_eq!(record.order, vec![id(0), id(1)]);
    }

    #[test]
    fn test_undefined_variable_propagates() {
        let mut space = Space::new("x");
        space.insert(inst(0, 0, &["x=q+1"], &[]));

        let mut store = Store::new();
        store.set(var('x'), 1);
        let mut chooser = LowestFirst;
        let err = Executor::new(&space)
            .run(&mut store, &mut chooser)
            .unwrap_err();
        assert_eq!(err, tangle_core::CoreError::UndefinedVariable { var: var('q') });
    }

    #[test]
    fn test_effects_flattened_in_execution_order() {
        let space = two_instance_space();
        let mut store = Store::new();
        store.set(var('x'), 1);
        store.set(var('y'), 3);
        store.set(var('z'), 5);

        let record = run_from(&space, &mut store, &[0]);
        let written: Vec<(char, i64)> = record
            .effects
            .iter()
            .map(|e| (e.var.as_char(), e.value))
            .collect();
        assert_eq!(written, vec![('x', 5), ('y', 4), ('x', 7)]);
    }

    /// A denser fixture: two overlapping cycles plus a free rider.
    fn tangled_space() -> Space {
        let mut space = Space::new("xy");
        space.insert(inst(0, 2, &["x=x+1"], &[1]));
        space.insert(inst(1, 1, &["x=x*2"], &[2, 0]));
        space.insert(inst(2, 0, &["x=x-3"], &[0, 1]));
        space.insert(inst(3, 3, &["y=y+1"], &[]));
        space.insert(inst(4, 0, &["x=x*3"], &[2, 1, 0]));
        space
    }

    proptest::proptest! {
        #[test]
        fn prop_final_state_independent_of_starts(
            starts in proptest::collection::vec(0..5u64, 0..12)
        ) {
            let space = tangled_space();

            let mut baseline = Store::new();
            baseline.set(var('x'), 1);
            baseline.set(var('y'), 1);
            let mut scripted = baseline.clone();

            let mut chooser = LowestFirst;
            Executor::new(&space).run(&mut baseline, &mut chooser).unwrap();

            let record = run_from(&space, &mut scripted, &starts);
            prop_assert_eq!(&scripted, &baseline);
            prop_assert_eq!(record.order.len(), space.len());
        }
    }
}
