//! Dependency context assembly.

pub mod assembler;

pub use assembler::{AssembledContext, AssemblyOptions, ContextAssembler};
