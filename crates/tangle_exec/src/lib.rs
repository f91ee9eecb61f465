//! TANGLE Executor
//!
//! Single-threaded execution of an instance space against a shared
//! store. Dependency edges may contain cycles; the walk severs them
//! with a tie-break that does not depend on where the walk started, so
//! the final store is identical across runs whatever start choices are
//! made.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chooser;
pub mod executor;
pub mod report;

pub use chooser::{LowestFirst, Scripted, StartChooser};
pub use executor::{ExecRecord, Executor, SeveredEdge};
pub use report::{RunOutcome, RunReport};
