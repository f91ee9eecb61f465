//! TANGLE Deterministic Simulation
//!
//! Seeded random generation of instance spaces and the repeated-run
//! harness behind the determinism guarantee. Everything here is
//! reproducible from a seed; no ambient randomness.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generate;
pub mod harness;
pub mod seed;

pub use generate::{GenConfig, GenError, gen_command, gen_space};
pub use harness::{Harness, HarnessConfig, HarnessOutput, RandomChooser};
pub use seed::Seed;
