//! Boardwalk Domain Layer
//!
//! Entities, identifiers and the storage gateway contract for the
//! board → column → task hierarchy. No business rules live here; the
//! lifecycle rules are enforced by `boardwalk-engine`.
//!
//! ## Key Concepts
//!
//! - **Board**: top-level container with a methodology and a set of columns
//! - **Column**: ordered sub-container of a board, holding tasks
//! - **Task**: leaf work item owned by exactly one column
//! - **Ordinal**: 1-based dense position of a column among its siblings
//!
//! ## Architecture
//!
//! - Only dependency is `uuid` for identifier generation
//! - Storage implementations live in other crates behind [`traits::HierarchyStore`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod board;
pub mod column;
pub mod ids;
pub mod task;
pub mod traits;
pub mod view;

// Re-exports for convenience
pub use board::{Board, BoardPatch, Methodology};
pub use column::{Column, ColumnPatch};
pub use ids::{BoardId, ColumnId, TaskId};
pub use task::{Task, TaskPatch};
pub use traits::{GatewayError, HierarchyStore};
pub use view::{BoardView, ColumnView, SubtreeRemoval};
