//! Trace model and the navigation engine built on it.

pub mod active;
pub mod error;
pub mod iterations;
pub mod jumps;
pub mod linker;
pub mod range;
pub mod record;
pub mod trace;
pub mod view;

mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use error::TraceError;
pub use iterations::IterationHint;
pub use jumps::{AnchorKind, JumpAnchor, Navigation};
pub use range::{Position, Range, SourceLink};
pub use record::{NodeType, TraceRecord};
pub use trace::{FunctionTreeNode, NodeIndex, Trace, TraceNode, MAIN_INDEX};
pub use view::View;
