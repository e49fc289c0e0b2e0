//! Board module - the top of the hierarchy

use crate::BoardId;
use std::fmt;

/// Board template kind
///
/// The methodology decides which columns a board starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Methodology {
    /// Three preset columns: To Do, In Progress, Done
    Kanban,
    /// A single preset column
    Simple,
}

const KANBAN_PRESET: &[&str] = &["To Do", "In Progress", "Done"];
const SIMPLE_PRESET: &[&str] = &["Tasks"];

impl Methodology {
    /// Parse the wire form (`kanban` or `simple`)
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk_domain::Methodology;
    ///
    /// assert_eq!(Methodology::parse("kanban"), Some(Methodology::Kanban));
    /// assert_eq!(Methodology::parse("scrum"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kanban" => Some(Methodology::Kanban),
            "simple" => Some(Methodology::Simple),
            _ => None,
        }
    }

    /// Wire form of the methodology
    pub fn as_str(&self) -> &'static str {
        match self {
            Methodology::Kanban => "kanban",
            Methodology::Simple => "simple",
        }
    }

    /// Names of the preset columns, in ordinal order
    pub fn preset_columns(&self) -> &'static [&'static str] {
        match self {
            Methodology::Kanban => KANBAN_PRESET,
            Methodology::Simple => SIMPLE_PRESET,
        }
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board
///
/// `column_count` is denormalized and maintained by the engine. It always
/// equals the number of columns whose `board_id` is this board.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Unique identifier
    pub id: BoardId,

    /// Title, unique per owner (case-insensitive)
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Caller-chosen category label
    pub category: String,

    /// Template the board was created from
    pub methodology: Methodology,

    /// Progress percentage, 0..=100, set by the caller
    pub progress: u8,

    /// Favorite flag
    pub favorite: bool,

    /// Number of columns on this board
    pub column_count: u32,

    /// Creation time (Unix seconds)
    pub created_at: u64,

    /// Last update time (Unix seconds)
    pub updated_at: u64,

    /// Owning identity
    pub owner_id: String,
}

/// Partial update for a board; only `Some` fields are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New progress
    pub progress: Option<u8>,
    /// New favorite flag
    pub favorite: Option<bool>,
}

impl BoardPatch {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.progress.is_none()
            && self.favorite.is_none()
    }
}
