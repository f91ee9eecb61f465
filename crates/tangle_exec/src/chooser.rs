//! Start-choice injection for the executor.
//!
//! Choosing which unexecuted instance begins a walk is the only
//! nondeterminism in a run. The executor takes it as an injected
//! source rather than drawing ambient randomness, so tests can pin
//! every walk down and the determinism guarantee itself is testable.

use std::collections::VecDeque;

use tangle_core::InstanceId;

/// Source of the arbitrary starting choice for each walk
pub trait StartChooser {
    /// Pick one id from `candidates`, the ascending slice of
    /// not-yet-executed ids (never empty)
    fn pick(&mut self, candidates: &[InstanceId]) -> InstanceId;
}

/// Always starts from the lowest unexecuted id
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestFirst;

impl StartChooser for LowestFirst {
    fn pick(&mut self, candidates: &[InstanceId]) -> InstanceId {
        candidates[0]
    }
}

/// Replays an explicit list of start ids
///
/// Entries that have already executed by the time they come up are
/// skipped; once the list runs dry, the lowest unexecuted id is used.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    queue: VecDeque<InstanceId>,
}

impl Scripted {
    /// Create a chooser replaying the given ids in order
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            queue: ids.into_iter().collect(),
        }
    }
}

impl StartChooser for Scripted {
    fn pick(&mut self, candidates: &[InstanceId]) -> InstanceId {
        while let Some(id) = self.queue.pop_front() {
            if candidates.contains(&id) {
                return id;
            }
        }
        candidates[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<InstanceId> {
        raw.iter().copied().map(InstanceId::new).collect()
    }

    #[test]
    fn test_lowest_first() {
        let mut chooser = LowestFirst;
        assert_eq!(chooser.pick(&ids(&[2, 5, 9])), InstanceId::new(2));
    }

    #[test]
    fn test_scripted_in_order() {
        let mut chooser = Scripted::new(ids(&[5, 2]));
        assert_eq!(chooser.pick(&ids(&[2, 5, 9])), InstanceId::new(5));
        assert_eq!(chooser.pick(&ids(&[2, 9])), InstanceId::new(2));
    }

    #[test]
    fn test_scripted_skips_executed() {
        let mut chooser = Scripted::new(ids(&[5, 9]));
        assert_eq!(chooser.pick(&ids(&[2, 9])), InstanceId::new(9));
    }

    #[test]
    fn test_scripted_falls_back_to_lowest() {
        let mut chooser = Scripted::new(ids(&[]));
        assert_eq!(chooser.pick(&ids(&[3, 7])), InstanceId::new(3));
    }
}
