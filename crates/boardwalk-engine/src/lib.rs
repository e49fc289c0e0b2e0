//! Boardwalk Engine
//!
//! The hierarchy consistency engine. It enforces the lifecycle rules of
//! the board → column → task hierarchy on top of any
//! [`HierarchyStore`](boardwalk_domain::HierarchyStore):
//!
//! - board titles unique per owner and column names unique per board
//! - column ordinals dense (`1..=column_count`) after every operation
//! - deleting a board or column removes everything below it
//! - calendar events dispatched on a detached task after task creation
//!
//! Every operation runs its store work as one unit on the blocking pool,
//! so a cancelled caller never leaves a mutation half-applied.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod board;
mod cascade;
mod column;
mod engine;
pub mod error;
pub mod events;
pub mod input;
mod task;
mod validate;
pub mod view;

pub use engine::BoardEngine;
pub use error::{EngineError, EngineResult};
pub use events::{
    CalendarEvent, EventPublisher, EventSettings, PublishError, TracingPublisher,
    WebhookPublisher,
};
pub use input::{CreateBoardInput, CreateColumnInput, CreateTaskInput, MoveTaskInput};
pub use view::build_board_view;
