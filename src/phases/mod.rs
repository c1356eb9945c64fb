//! Phase drivers for the guided workflow.
//!
//! One driver per AI-seeded phase:
//! - [`FramingPhase`]: reframe the problem from multiple perspectives
//! - [`AssumptionsPhase`]: uncover hidden assumptions
//! - [`DecompositionPhase`]: break nodes into more fundamental children
//! - [`ValidationPhase`]: gather evidence for and against a claim
//! - [`ReconstructionPhase`]: build solutions from fundamental truths
//!
//! Each driver does two things: `begin` opens a streaming generation with
//! the phase's prompts, and `apply_completion` folds the completed text into
//! the aggregate under the phase's merge rules. `apply_completion` is a pure
//! function of store and text, so the merge semantics are testable without a
//! network. Records are merged exactly once, at stream completion, never per
//! progress tick.

mod assumptions;
mod decomposition;
mod framing;
mod reconstruction;
mod validation;

pub use assumptions::*;
pub use decomposition::*;
pub use framing::*;
pub use reconstruction::*;
pub use validation::*;
