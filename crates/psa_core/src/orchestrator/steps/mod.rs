//! Pipeline step implementations.
//!
//! Each step handles one phase of the run state machine.

mod copy;
mod prepare;
mod stitch;

pub use copy::CopyRsStep;
pub use prepare::PrepareStep;
pub use stitch::StitchStep;
