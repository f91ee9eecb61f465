//! Random instance-space generation.
//!
//! Test-input construction: random arithmetic commands, random
//! sequence numbers, and dependency edges derived from interference in
//! two passes. The first pass adds edges between interfering pairs
//! with a bias toward depending on earlier ids; the second pass
//! repairs the construction invariant, ensuring every interfering pair
//! carries at least one edge. The repair pass can append an edge
//! toward a larger id and can duplicate an existing edge; the executor
//! tolerates both.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use tangle_core::{CoreError, InstanceId};
use tangle_space::{Command, Instance, Space};

const DIGITS: &[char] = &['1', '2', '3', '4', '5'];
const OPERATORS: &[char] = &['+', '-', '*'];

/// Bias window of the first dependency pass
const OVERLAP: i64 = 10;

/// Generation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    /// Alphabet has no variables to draw from
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
    /// Alphabet carries something other than a lowercase letter
    #[error("invalid variable name {name:?} in alphabet")]
    InvalidVariable {
        /// The offending character
        name: char,
    },
    /// A generated statement failed to parse
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Configuration for random space generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Number of instances to generate
    pub instances: usize,
    /// Upper bound on commands per instance
    pub max_cmds: usize,
    /// Upper bound on operands per command, assignee included
    pub max_operands: usize,
    /// Variable-name universe to draw from
    pub alphabet: String,
}

impl GenConfig {
    /// Create a config with the demo defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: 10,
            max_cmds: 1,
            max_operands: 3,
            alphabet: "xyzwab".to_string(),
        }
    }

    /// Set the instance count
    #[must_use]
    pub fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Set the per-instance command bound
    #[must_use]
    pub fn with_max_cmds(mut self, max_cmds: usize) -> Self {
        self.max_cmds = max_cmds;
        self
    }

    /// Set the per-command operand bound
    #[must_use]
    pub fn with_max_operands(mut self, max_operands: usize) -> Self {
        self.max_operands = max_operands;
        self
    }

    /// Set the alphabet
    #[must_use]
    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = alphabet.to_string();
        self
    }

    fn validate(&self) -> Result<(), GenError> {
        if self.alphabet.is_empty() {
            return Err(GenError::EmptyAlphabet);
        }
        if let Some(name) = self.alphabet.chars().find(|c| !c.is_ascii_lowercase()) {
            return Err(GenError::InvalidVariable { name });
        }
        Ok(())
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate one random command, such as `x=y*2`
///
/// Draws the assignee from the alphabet and 1 to `max_operands - 1`
/// further operands from the alphabet and single digits, joined by
/// random operators.
///
/// # Errors
///
/// Returns `GenError` if the config alphabet is invalid.
pub fn gen_command(rng: &mut impl Rng, cfg: &GenConfig) -> Result<Command, GenError> {
    cfg.validate()?;
    let letters: Vec<char> = cfg.alphabet.chars().collect();
    let mut pool: Vec<char> = letters.clone();
    pool.extend_from_slice(DIGITS);

    let operands = rng.gen_range(2..=cfg.max_operands.max(2));
    let mut statement = String::new();
    statement.push(letters[rng.gen_range(0..letters.len())]);
    statement.push('=');
    for i in 0..operands - 1 {
        if i > 0 {
            statement.push(OPERATORS[rng.gen_range(0..OPERATORS.len())]);
        }
        statement.push(pool[rng.gen_range(0..pool.len())]);
    }

    Ok(Command::parse(&statement)?)
}

/// Generate a random space of `cfg.instances` instances
///
/// Ids run from 0, sequence numbers are drawn from `0..=instances`,
/// and dependency edges are derived from interference in the two
/// passes described at the module level.
///
/// # Errors
///
/// Returns `GenError` if the config alphabet is invalid.
pub fn gen_space(rng: &mut impl Rng, cfg: &GenConfig) -> Result<Space, GenError> {
    cfg.validate()?;
    let mut space = Space::new(&cfg.alphabet);

    for i in 0..cfg.instances {
        let id = InstanceId::new(i as u64);
        let seq = rng.gen_range(0..=cfg.instances as u64);
        let cmds = (0..rng.gen_range(1..=cfg.max_cmds.max(1)))
            .map(|_| gen_command(rng, cfg))
            .collect::<Result<Vec<_>, _>>()?;
        space.insert(Instance::new(id, seq, cmds));
    }

    let ids: Vec<InstanceId> = space.ids().collect();
    let mut interfering = BTreeSet::new();
    for &a in &ids {
        for &b in &ids {
            if a < b {
                if let (Some(ia), Some(ib)) = (space.get(a), space.get(b)) {
                    if ia.interferes_with(ib) {
                        interfering.insert((a, b));
                    }
                }
            }
        }
    }
    let interferes = |a: InstanceId, b: InstanceId| {
        let pair = if a < b { (a, b) } else { (b, a) };
        interfering.contains(&pair)
    };

    // biased random edges between interfering pairs
    for &iid in &ids {
        for &did in &ids {
            if iid == did || !interferes(iid, did) {
                continue;
            }
            let gap = did.as_u64() as i64 - iid.as_u64() as i64;
            if rng.gen_range(0..=OVERLAP) > gap + OVERLAP / 2 {
                if let Some(inst) = space.insts.get_mut(&iid) {
                    inst.deps.push(did);
                }
            }
        }
    }

    // repair: every interfering pair holds at least one edge
    for &iid in &ids {
        for &did in &ids {
            if iid == did || !interferes(iid, did) {
                continue;
            }
            let partner_has = space.get(did).is_some_and(|d| d.deps.contains(&iid));
            if !partner_has {
                if let Some(inst) = space.insts.get_mut(&iid) {
                    inst.deps.push(did);
                }
            }
        }
    }

    Ok(space)
}
