//! Call graph index and traversal.

pub mod explorer;
pub mod index;

pub use explorer::{CallGraphExplorer, Reachability};
pub use index::GraphIndex;
